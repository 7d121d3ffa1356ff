//! Collecting logger
//!
//! Instead of writing log commands anywhere, this interpreter accumulates them
//! and completes with `{value, logs}`.

use crate::runtime::{kinds, make_stateful_interpreter, Kind, Payload, StatefulInterpreter, Val};

pub fn collect_logs() -> StatefulInterpreter<Vec<Val>> {
    make_stateful_interpreter(
        kinds::LOG,
        Vec::new(),
        |logs: &mut Vec<Val>, payload: Payload| {
            logs.push(payload.into_val(&Kind::from(kinds::LOG))?);
            Ok(Val::Null)
        },
        |logs, value| Val::obj([("value", value), ("logs", Val::List(logs))]),
    )
}
