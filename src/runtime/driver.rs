//! Synchronous drivers
//!
//! The driver handles no effects. It asserts that the interpreter stack has
//! resolved every command and extracts the final value.

use super::computation::Comp;
use super::types::{Command, Kind, Step, Val};
use crate::errors::{EffectError, Result};
use tracing::warn;

/// Drive a fully interpreted computation to its result
///
/// Fails with `UnhandledCommand` (or `EscapeLeak` for escape commands) if the
/// computation still yields anything.
pub fn run(mut comp: Comp) -> Result<Val> {
    match comp.advance(Val::Null)? {
        Step::Completed(value) => Ok(value),
        Step::Suspended(command) => Err(unhandled(&command)),
    }
}

/// Drive a computation, answering every command with `respond`
///
/// Commands are answered strictly in the order they are yielded.
pub fn run_with<F>(mut comp: Comp, mut respond: F) -> Result<Val>
where
    F: FnMut(Command) -> Result<Val>,
{
    let mut input = Val::Null;
    loop {
        match comp.advance(input)? {
            Step::Completed(value) => return Ok(value),
            Step::Suspended(command) => input = respond(command)?,
        }
    }
}

/// Classify a command that no interpreter claimed
pub(crate) fn unhandled(command: &Command) -> EffectError {
    match &command.kind {
        Kind::Escape(token) => {
            let state = if token.is_open() { "scope open" } else { "scope closed" };
            warn!(token = %token, state, "escape reached the driver");
            EffectError::EscapeLeak {
                token: token.to_string(),
                state,
            }
        }
        Kind::Tag(name) => {
            warn!(kind = %name, "unhandled command reached the driver");
            EffectError::UnhandledCommand {
                kind: name.to_string(),
            }
        }
    }
}
