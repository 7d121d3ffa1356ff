//! Continuation capture (escape)
//!
//! `call_cc(body)` mints a token unique to the call and runs `body(escape)`.
//! If the body completes, that is the outcome. If it yields the escape command
//! carrying this exact token, the escape's value becomes the outcome and the
//! rest of the body is dropped. Every other command, including escapes minted
//! by enclosing scopes, passes through.

use super::computation::{perform, Comp, Computation};
use super::interpreter::{make_interpreter, HandlerInterpreter, Interpreter};
use super::types::{kinds, CaptureBody, Command, EscapeToken, Kind, Payload, Step, Val};
use crate::errors::{EffectError, Result};
use std::mem;
use tracing::debug;

/// Handle for leaving one capture scope early
#[derive(Debug, Clone)]
pub struct Escape {
    token: EscapeToken,
}

impl Escape {
    /// Computation that exits the capture scope with `value`
    ///
    /// It is never resumed: nothing sequenced after it runs.
    pub fn exit(&self, value: impl Into<Val>) -> Comp {
        perform(Command::new(
            Kind::Escape(self.token.clone()),
            Payload::Val(value.into()),
        ))
    }

    pub fn token(&self) -> &EscapeToken {
        &self.token
    }
}

enum ScopePhase {
    Pending(CaptureBody),
    Running(Comp),
    Closed,
}

/// The computation returned by `call_cc`
pub struct CaptureScope {
    token: EscapeToken,
    phase: ScopePhase,
}

pub fn call_cc<F>(body: F) -> Comp
where
    F: FnOnce(Escape) -> Comp + Send + 'static,
{
    Box::new(CaptureScope::new(Box::new(body)))
}

impl CaptureScope {
    pub fn new(body: CaptureBody) -> Self {
        CaptureScope {
            token: EscapeToken::mint(),
            phase: ScopePhase::Pending(body),
        }
    }

    fn close(&mut self) {
        self.phase = ScopePhase::Closed;
        self.token.close();
    }
}

impl Computation for CaptureScope {
    fn advance(&mut self, mut input: Val) -> Result<Step> {
        let mut body = match mem::replace(&mut self.phase, ScopePhase::Closed) {
            ScopePhase::Pending(make) => {
                input = Val::Null;
                make(Escape {
                    token: self.token.clone(),
                })
            }
            ScopePhase::Running(body) => body,
            ScopePhase::Closed => return Err(EffectError::AlreadyCompleted),
        };

        let step = match body.advance(input) {
            Ok(step) => step,
            Err(error) => {
                self.close();
                return Err(error);
            }
        };

        match step {
            Step::Completed(value) => {
                self.close();
                Ok(Step::Completed(value))
            }
            Step::Suspended(Command {
                kind: Kind::Escape(token),
                payload,
            }) if token == self.token => {
                debug!(token = %token, "escaping capture scope");
                // Drops the remainder of the body
                self.close();
                let kind = Kind::Escape(token);
                Ok(Step::Completed(payload.into_val(&kind)?))
            }
            Step::Suspended(command) => {
                if command.kind.is_escape() {
                    debug!(kind = %command.kind, scope = %self.token, "escape passing through scope");
                }
                self.phase = ScopePhase::Running(body);
                Ok(Step::Suspended(command))
            }
        }
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        self.token.close();
    }
}

/* ===================== call-cc Command ===================== */

/// Request a capture scope from an enclosing `call_cc_interpreter`
pub fn call_cc_command<F>(body: F) -> Comp
where
    F: FnOnce(Escape) -> Comp + Send + 'static,
{
    perform(Command::new(kinds::CALL_CC, Payload::Body(Box::new(body))))
}

/// Interpreter for `call-cc` commands: runs each body in its own capture scope
///
/// Handler commands propagate outward, so each body is wrapped in a fresh
/// interpreter inside its own scope. Nested `call-cc` commands are then served
/// within the enclosing scope, and escapes to that scope still reach it.
pub fn call_cc_interpreter() -> HandlerInterpreter {
    make_interpreter(kinds::CALL_CC, |payload: Payload| {
        match payload.into_body(&Kind::from(kinds::CALL_CC)) {
            Ok(body) => call_cc(move |exit| call_cc_interpreter().interpret(body(exit))),
            Err(error) => super::computation::fail(error),
        }
    })
}
