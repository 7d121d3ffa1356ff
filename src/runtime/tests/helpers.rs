//! Test helpers for runtime tests
//!
//! Small command vocabularies and recording interpreters

use crate::runtime::{make_interpreter, perform, pure, Command, Comp, HandlerInterpreter, Val};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Suspend on `kind` with a value parameter
pub fn ask(kind: &'static str, param: impl Into<Val>) -> Comp {
    perform(Command::new(kind, param.into()))
}

/// Interpreter answering `kind` with a fixed value
pub fn answer(kind: &'static str, value: impl Into<Val>) -> HandlerInterpreter {
    let value = value.into();
    make_interpreter(kind, move |_| pure(value.clone()))
}

/// Interpreter answering `kind` with a fixed value and counting invocations
pub fn counting(kind: &'static str, value: impl Into<Val>) -> (HandlerInterpreter, Arc<AtomicUsize>) {
    let value = value.into();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let interp = make_interpreter(kind, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        pure(value.clone())
    });
    (interp, calls)
}

pub fn count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}
