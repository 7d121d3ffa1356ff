//! Interpreters: consume commands of one kind, pass everything else outward
//!
//! An interpreter turns a computation into another computation that no longer
//! yields the commands it recognizes. Unrecognized commands are re-suspended
//! unchanged, and whatever the caller resumes them with is forwarded straight
//! back to the inner computation.

use super::computation::{Comp, Computation};
use super::types::{Kind, Payload, Step, Val};
use crate::errors::{EffectError, Result};
use std::sync::Arc;
use tracing::trace;

/// Wraps a computation, consuming the commands it recognizes
pub trait Interpreter: Send + Sync {
    fn interpret(&self, inner: Comp) -> Comp;
}

impl<F> Interpreter for F
where
    F: Fn(Comp) -> Comp + Send + Sync,
{
    fn interpret(&self, inner: Comp) -> Comp {
        self(inner)
    }
}

/// A command handler: builds the computation that produces the resumption value
pub type Handler = Arc<dyn Fn(Payload) -> Comp + Send + Sync>;

/* ===================== Handler Interpreter ===================== */

/// Single-kind interpreter built by `make_interpreter`
#[derive(Clone)]
pub struct HandlerInterpreter {
    kind: Kind,
    handler: Handler,
}

/// Build an interpreter for one command kind
///
/// The handler's own computation is driven to completion before the inner
/// computation resumes. Commands the handler yields (of any kind, including
/// this one) propagate outward through this interpreter.
pub fn make_interpreter<H>(kind: impl Into<Kind>, handler: H) -> HandlerInterpreter
where
    H: Fn(Payload) -> Comp + Send + Sync + 'static,
{
    HandlerInterpreter {
        kind: kind.into(),
        handler: Arc::new(handler),
    }
}

impl HandlerInterpreter {
    pub fn from_handler(kind: impl Into<Kind>, handler: Handler) -> Self {
        HandlerInterpreter {
            kind: kind.into(),
            handler,
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}

impl Interpreter for HandlerInterpreter {
    fn interpret(&self, inner: Comp) -> Comp {
        Box::new(Interpreted {
            kind: self.kind.clone(),
            handler: self.handler.clone(),
            inner,
            active: None,
            finished: false,
        })
    }
}

struct Interpreted {
    kind: Kind,
    handler: Handler,
    inner: Comp,
    /// Handler computation in progress; while set, input belongs to it
    active: Option<Comp>,
    finished: bool,
}

impl Computation for Interpreted {
    fn advance(&mut self, mut input: Val) -> Result<Step> {
        if self.finished {
            return Err(EffectError::AlreadyCompleted);
        }

        loop {
            if let Some(active) = self.active.as_mut() {
                match active.advance(input)? {
                    Step::Suspended(command) => {
                        trace!(kind = %command.kind, handling = %self.kind, "handler suspended");
                        return Ok(Step::Suspended(command));
                    }
                    Step::Completed(value) => {
                        self.active = None;
                        input = value;
                    }
                }
            }

            match self.inner.advance(input)? {
                Step::Completed(value) => {
                    self.finished = true;
                    return Ok(Step::Completed(value));
                }
                Step::Suspended(command) if command.kind == self.kind => {
                    trace!(kind = %self.kind, "dispatching command to handler");
                    self.active = Some((self.handler)(command.payload));
                    input = Val::Null;
                }
                Step::Suspended(command) => {
                    trace!(kind = %command.kind, handling = %self.kind, "passing command through");
                    return Ok(Step::Suspended(command));
                }
            }
        }
    }
}

/* ===================== Stateful Interpreter ===================== */

type OnCommand<S> = dyn Fn(&mut S, Payload) -> Result<Val> + Send + Sync;
type OnFinish<S> = dyn Fn(S, Val) -> Val + Send + Sync;

/// Interpreter that threads per-run state through its handler
///
/// Each run starts from a clone of the initial state. The handler answers
/// synchronously; when the inner computation completes, `on_finish` derives
/// the final value from the result and the accumulated state.
pub struct StatefulInterpreter<S> {
    kind: Kind,
    initial: S,
    on_command: Arc<OnCommand<S>>,
    on_finish: Arc<OnFinish<S>>,
}

pub fn make_stateful_interpreter<S, C, F>(
    kind: impl Into<Kind>,
    initial: S,
    on_command: C,
    on_finish: F,
) -> StatefulInterpreter<S>
where
    S: Clone + Send + Sync + 'static,
    C: Fn(&mut S, Payload) -> Result<Val> + Send + Sync + 'static,
    F: Fn(S, Val) -> Val + Send + Sync + 'static,
{
    StatefulInterpreter {
        kind: kind.into(),
        initial,
        on_command: Arc::new(on_command),
        on_finish: Arc::new(on_finish),
    }
}

impl<S> Interpreter for StatefulInterpreter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn interpret(&self, inner: Comp) -> Comp {
        Box::new(StatefulRun {
            kind: self.kind.clone(),
            state: Some(self.initial.clone()),
            on_command: self.on_command.clone(),
            on_finish: self.on_finish.clone(),
            inner,
        })
    }
}

struct StatefulRun<S> {
    kind: Kind,
    state: Option<S>,
    on_command: Arc<OnCommand<S>>,
    on_finish: Arc<OnFinish<S>>,
    inner: Comp,
}

impl<S: Send + Sync> Computation for StatefulRun<S> {
    fn advance(&mut self, mut input: Val) -> Result<Step> {
        loop {
            let state = self.state.as_mut().ok_or(EffectError::AlreadyCompleted)?;
            match self.inner.advance(input)? {
                Step::Completed(value) => {
                    let state = self.state.take().ok_or(EffectError::AlreadyCompleted)?;
                    return Ok(Step::Completed((self.on_finish)(state, value)));
                }
                Step::Suspended(command) if command.kind == self.kind => {
                    trace!(kind = %self.kind, "updating interpreter state");
                    input = (self.on_command)(state, command.payload)?;
                }
                Step::Suspended(command) => return Ok(Step::Suspended(command)),
            }
        }
    }
}
