//! Core runtime types
//!
//! Organized into submodules:
//! - `values`: Runtime value types (Val) and JSON conversion
//! - `command`: Commands, kinds, payloads and escape tokens
//! - `step`: The Step returned by every `advance`

pub mod command;
pub mod step;
pub mod values;

pub use command::{kinds, CaptureBody, Command, EscapeToken, Kind, Payload, Pending};
pub use step::Step;
pub use values::{json_to_val, val_to_json, Val};
