//! Suspendable computations
//!
//! A computation is an explicit state machine: each `advance` runs it until it
//! either yields a command and pauses, or finishes with a value. Business logic
//! is assembled from the combinators here instead of native suspension.
//!
//! ## Protocol
//! - The first `advance` ignores its input (there is no prior suspension).
//! - Each later `advance` receives the resumption value for the last command.
//! - Advancing after `Completed` is an error (`AlreadyCompleted`).

use super::types::{Command, Step, Val};
use crate::errors::{EffectError, Result};
use std::mem;

/// A stateful, steppable process
pub trait Computation: Send {
    fn advance(&mut self, input: Val) -> Result<Step>;
}

/// Boxed computation, the currency passed between interpreters
pub type Comp = Box<dyn Computation>;

impl<C: Computation + ?Sized> Computation for Box<C> {
    fn advance(&mut self, input: Val) -> Result<Step> {
        (**self).advance(input)
    }
}

/* ===================== Leaves ===================== */

/// Completes immediately with a value
pub struct Pure {
    value: Option<Val>,
}

pub fn pure(value: impl Into<Val>) -> Comp {
    Box::new(Pure {
        value: Some(value.into()),
    })
}

impl Computation for Pure {
    fn advance(&mut self, _input: Val) -> Result<Step> {
        self.value
            .take()
            .map(Step::Completed)
            .ok_or(EffectError::AlreadyCompleted)
    }
}

/// Aborts the run with an error on first advance
pub struct Fail {
    error: Option<EffectError>,
}

pub fn fail(error: EffectError) -> Comp {
    Box::new(Fail { error: Some(error) })
}

impl Computation for Fail {
    fn advance(&mut self, _input: Val) -> Result<Step> {
        Err(self.error.take().unwrap_or(EffectError::AlreadyCompleted))
    }
}

#[derive(Debug)]
enum PerformPhase {
    Ready(Command),
    Waiting,
    Done,
}

/// Suspends once with a command and completes with its resumption value
pub struct Perform {
    phase: PerformPhase,
}

pub fn perform(command: Command) -> Comp {
    Box::new(Perform {
        phase: PerformPhase::Ready(command),
    })
}

impl Computation for Perform {
    fn advance(&mut self, input: Val) -> Result<Step> {
        match mem::replace(&mut self.phase, PerformPhase::Done) {
            PerformPhase::Ready(command) => {
                self.phase = PerformPhase::Waiting;
                Ok(Step::Suspended(command))
            }
            PerformPhase::Waiting => Ok(Step::Completed(input)),
            PerformPhase::Done => Err(EffectError::AlreadyCompleted),
        }
    }
}

/// Builds its computation on first advance
pub struct Lazy<F> {
    make: Option<F>,
    running: Option<Comp>,
}

pub fn lazy<F>(make: F) -> Comp
where
    F: FnOnce() -> Comp + Send + 'static,
{
    Box::new(Lazy {
        make: Some(make),
        running: None,
    })
}

impl<F> Computation for Lazy<F>
where
    F: FnOnce() -> Comp + Send,
{
    fn advance(&mut self, input: Val) -> Result<Step> {
        if let Some(make) = self.make.take() {
            self.running = Some(make());
        }
        match self.running.as_mut() {
            Some(running) => running.advance(input),
            None => Err(EffectError::AlreadyCompleted),
        }
    }
}

/* ===================== Sequencing ===================== */

enum BindPhase<F> {
    First(Comp, F),
    Second(Comp),
    Done,
}

/// Runs one computation, then the computation built from its result
pub struct Bind<F> {
    phase: BindPhase<F>,
}

impl<F> Computation for Bind<F>
where
    F: FnOnce(Val) -> Comp + Send,
{
    fn advance(&mut self, mut input: Val) -> Result<Step> {
        loop {
            match mem::replace(&mut self.phase, BindPhase::Done) {
                BindPhase::First(mut first, next) => match first.advance(input)? {
                    Step::Suspended(command) => {
                        self.phase = BindPhase::First(first, next);
                        return Ok(Step::Suspended(command));
                    }
                    Step::Completed(value) => {
                        // The second computation has not started, so its first input is ignored
                        self.phase = BindPhase::Second(next(value));
                        input = Val::Null;
                    }
                },
                BindPhase::Second(mut second) => {
                    let step = second.advance(input)?;
                    if !step.is_completed() {
                        self.phase = BindPhase::Second(second);
                    }
                    return Ok(step);
                }
                BindPhase::Done => return Err(EffectError::AlreadyCompleted),
            }
        }
    }
}

/// Transforms the final value of a computation
pub struct Map<F> {
    inner: Comp,
    f: Option<F>,
}

impl<F> Computation for Map<F>
where
    F: FnOnce(Val) -> Val + Send,
{
    fn advance(&mut self, input: Val) -> Result<Step> {
        match self.inner.advance(input)? {
            Step::Completed(value) => {
                let f = self.f.take().ok_or(EffectError::AlreadyCompleted)?;
                Ok(Step::Completed(f(value)))
            }
            suspended => Ok(suspended),
        }
    }
}

/// Combinator methods for boxed computations
pub trait ComputationExt {
    fn and_then<F>(self, next: F) -> Comp
    where
        F: FnOnce(Val) -> Comp + Send + 'static;

    fn map<F>(self, f: F) -> Comp
    where
        F: FnOnce(Val) -> Val + Send + 'static;

    /// Run `next` after this computation, discarding this one's result
    fn then(self, next: Comp) -> Comp;
}

impl ComputationExt for Comp {
    fn and_then<F>(self, next: F) -> Comp
    where
        F: FnOnce(Val) -> Comp + Send + 'static,
    {
        Box::new(Bind {
            phase: BindPhase::First(self, next),
        })
    }

    fn map<F>(self, f: F) -> Comp
    where
        F: FnOnce(Val) -> Val + Send + 'static,
    {
        Box::new(Map {
            inner: self,
            f: Some(f),
        })
    }

    fn then(self, next: Comp) -> Comp {
        self.and_then(move |_| next)
    }
}

/* ===================== Fold ===================== */

/// Reduces a list with an effectful step function
pub struct Fold<F> {
    items: std::vec::IntoIter<Val>,
    acc: Option<Val>,
    current: Option<Comp>,
    f: F,
}

pub fn fold<F>(items: Vec<Val>, init: impl Into<Val>, f: F) -> Comp
where
    F: FnMut(Val, Val) -> Comp + Send + 'static,
{
    Box::new(Fold {
        items: items.into_iter(),
        acc: Some(init.into()),
        current: None,
        f,
    })
}

impl<F> Computation for Fold<F>
where
    F: FnMut(Val, Val) -> Comp + Send,
{
    fn advance(&mut self, mut input: Val) -> Result<Step> {
        loop {
            if let Some(current) = self.current.as_mut() {
                match current.advance(input)? {
                    Step::Suspended(command) => return Ok(Step::Suspended(command)),
                    Step::Completed(acc) => {
                        self.current = None;
                        self.acc = Some(acc);
                        input = Val::Null;
                    }
                }
            }

            let acc = self.acc.take().ok_or(EffectError::AlreadyCompleted)?;
            match self.items.next() {
                Some(item) => self.current = Some((self.f)(acc, item)),
                None => return Ok(Step::Completed(acc)),
            }
        }
    }
}
