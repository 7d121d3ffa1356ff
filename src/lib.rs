//! Effectkit - effect interpretation runtime
//!
//! Computations describe their side effects as commands. Interpreters answer
//! the commands they recognize and pass the rest outward; the synchronous
//! driver or the async bridge runs whatever is left.

pub mod cli;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod programs;
pub mod runtime;

// Re-export main types
pub use errors::{EffectError, Result};
pub use runtime::{
    compose, make_interpreter, run, run_async, Comp, Command, Computation, ComputationExt,
    Interpreter, Stack, Val,
};
