//! Handler-level instrumentation
//!
//! Wraps an existing handler so that every command it answers is followed by
//! a `log` command describing the input and the output. The wrapped handler is
//! reused as-is, so the instrumented db interpreter shares all of its logic
//! with the plain one.

use super::db::{db_handler, DbRequest, Store};
use super::logging::log;
use crate::runtime::{kinds, ComputationExt, Handler, HandlerInterpreter, Payload, Val};
use std::sync::Arc;

/// Wrap `handler`, logging `describe(input, output)` after each result
pub fn instrument<D>(handler: Handler, describe: D) -> Handler
where
    D: Fn(&Val, &Val) -> Vec<Val> + Send + Sync + 'static,
{
    let describe = Arc::new(describe);
    Arc::new(move |payload: Payload| {
        let input = payload.as_val().cloned().unwrap_or(Val::Null);
        let describe = describe.clone();
        handler(payload).and_then(move |output| {
            let entries = describe(&input, &output);
            log(entries).map(move |_| output)
        })
    })
}

/// `DB#method(firstArg) -> result`
pub fn describe_db_call(input: &Val, output: &Val) -> Vec<Val> {
    let line = match DbRequest::from_val(input) {
        Ok(request) => {
            let first = request.args.first().cloned().unwrap_or(Val::Null);
            format!("DB#{}({}) -> {}", request.method, first, output)
        }
        Err(_) => format!("DB#? -> {}", output),
    };
    vec![Val::Str(line)]
}

/// Db interpreter that also logs each call and its result
pub fn instrumented_db_interpreter(store: Arc<dyn Store>) -> HandlerInterpreter {
    HandlerInterpreter::from_handler(kinds::DB, instrument(db_handler(store), describe_db_call))
}
