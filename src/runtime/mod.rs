//! # Effect Runtime - Suspendable Computations and Interpreters
//!
//! Business logic describes its side effects as data (commands) instead of
//! performing them. Interpreters consume those commands and supply resumption
//! values; drivers run the result to completion.
//!
//! ## Core Principles
//!
//! 1. **Explicit state machines**: every computation exposes `advance(input) -> Step`
//! 2. **Pass-through by default**: an interpreter only touches its own kind
//! 3. **Innermost first**: the layer closest to the computation sees a command first
//! 4. **One inversion point**: only the async bridge awaits futures
//! 5. **Identity tokens**: escapes match their capture site by identity, never by value
//!
//! ## Data Flow
//!
//! ```text
//! computation -> [layer n] -> .. -> [layer 1] -> driver | async bridge
//!        ^ resumption value from the innermost layer that recognizes the kind
//! ```

pub mod bridge;
pub mod compose;
pub mod computation;
pub mod driver;
pub mod escape;
pub mod interpreter;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use bridge::{deferred, run_async, spawn, wait, wait_pending, Resolver};
pub use compose::{compose, Stack};
pub use computation::{fail, fold, lazy, perform, pure, Comp, Computation, ComputationExt};
pub use driver::{run, run_with};
pub use escape::{call_cc, call_cc_command, call_cc_interpreter, CaptureScope, Escape};
pub use interpreter::{
    make_interpreter, make_stateful_interpreter, Handler, HandlerInterpreter, Interpreter,
    StatefulInterpreter,
};
pub use types::{
    json_to_val, kinds, val_to_json, Command, EscapeToken, Kind, Payload, Pending, Step, Val,
};
