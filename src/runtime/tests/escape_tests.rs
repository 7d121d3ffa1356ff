//! Tests for continuation capture

use super::helpers::{answer, ask};
use crate::errors::EffectError;
use crate::runtime::{
    call_cc, call_cc_command, call_cc_interpreter, lazy, pure, run, Computation, ComputationExt,
    Escape, Interpreter, Step, Val,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_exit_returns_value_and_skips_rest_of_body() {
    let after_exit = Arc::new(AtomicUsize::new(0));
    let counter = after_exit.clone();

    let scope = call_cc(move |exit| {
        exit.exit("X").then(lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            pure("unreachable")
        }))
    });

    assert_eq!(run(scope).unwrap(), Val::from("X"));
    assert_eq!(after_exit.load(Ordering::SeqCst), 0);
}

#[test]
fn test_body_completing_normally_is_the_outcome() {
    assert_eq!(run(call_cc(|_| pure("normal"))).unwrap(), Val::from("normal"));
}

#[test]
fn test_inner_escape_terminates_only_inner_scope() {
    let scope = call_cc(|_outer| {
        call_cc(|inner| inner.exit("inner out"))
            .map(|v| Val::List(vec![Val::from("outer continued"), v]))
    });

    assert_eq!(
        run(scope).unwrap(),
        Val::List(vec![Val::from("outer continued"), Val::from("inner out")])
    );
}

#[test]
fn test_outer_escape_passes_through_inner_scope() {
    let inner_rest = Arc::new(AtomicUsize::new(0));
    let counter = inner_rest.clone();

    let scope = call_cc(move |outer: Escape| {
        call_cc(move |_inner| {
            outer.exit("outer out").then(lazy(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                pure(())
            }))
        })
        .map(|_| Val::from("outer continued"))
    });

    assert_eq!(run(scope).unwrap(), Val::from("outer out"));
    assert_eq!(inner_rest.load(Ordering::SeqCst), 0);
}

#[test]
fn test_each_call_mints_a_distinct_token() {
    let tokens = Arc::new(Mutex::new(Vec::new()));
    let (a, b) = (tokens.clone(), tokens.clone());

    run(call_cc(move |exit| {
        a.lock().push(exit.token().clone());
        pure(())
    }))
    .unwrap();
    run(call_cc(move |exit| {
        b.lock().push(exit.token().clone());
        pure(())
    }))
    .unwrap();

    let tokens = tokens.lock();
    assert_ne!(tokens[0], tokens[1]);
    assert!(tokens.iter().all(|t| !t.is_open()));
}

#[test]
fn test_other_commands_pass_through_scope() {
    let scope = call_cc(|exit| {
        ask("getConfig", Val::Null).and_then(move |config| {
            if config.as_str() == Some("stop") {
                exit.exit("stopped")
            } else {
                pure("kept going")
            }
        })
    });

    let result = run(answer("getConfig", "stop").interpret(scope)).unwrap();
    assert_eq!(result, Val::from("stopped"));
}

#[test]
fn test_scope_cannot_advance_after_completion() {
    let mut scope = call_cc(|exit| exit.exit(1.0));
    assert!(matches!(scope.advance(Val::Null), Ok(Step::Completed(_))));
    assert!(matches!(
        scope.advance(Val::Null),
        Err(EffectError::AlreadyCompleted)
    ));
}

#[test]
fn test_call_cc_command_needs_interpreter() {
    let err = run(call_cc_command(|_| pure(()))).unwrap_err();
    assert!(matches!(err, EffectError::UnhandledCommand { ref kind } if kind == "call-cc"));
}

#[test]
fn test_call_cc_interpreter_handles_nested_commands() {
    let program = call_cc_command(|outer| {
        call_cc_command(move |_inner| outer.exit("from inner"))
            .map(|_| Val::from("outer continued"))
    });

    let result = run(call_cc_interpreter().interpret(program)).unwrap();
    assert_eq!(result, Val::from("from inner"));
}

#[test]
fn test_call_cc_interpreter_outer_exit_from_nested_body() {
    let program = call_cc_command(|outer| {
        call_cc_command(move |_inner| outer.exit("outer out").then(pure("unreachable")))
            .map(|_| Val::from("outer continued"))
    });

    let result = run(call_cc_interpreter().interpret(program)).unwrap();
    assert_eq!(result, Val::from("outer out"));
}
