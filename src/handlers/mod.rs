//! Concrete command kinds and their interpreters
//!
//! - `logging`: `log` with pluggable sinks
//! - `config`: `getConfig` answered from a record
//! - `db`: storage calls bridged through `wait`
//! - `instrument`: logging around any handler
//! - `collect`: a logger that returns what was logged

pub mod collect;
pub mod config;
pub mod db;
pub mod instrument;
pub mod logging;

pub use collect::collect_logs;
pub use config::{config_interpreter, config_value, get_config};
pub use db::{db, db_interpreter, load, DbRequest, MemoryStore, RetryingStore, Store};
pub use instrument::{instrument, instrumented_db_interpreter};
pub use logging::{log, log_line, logging_interpreter, LogSink, MemorySink, TracingSink};
