//! `getConfig` command and its interpreter

use crate::runtime::{
    kinds, make_interpreter, perform, pure, Command, Comp, ComputationExt, HandlerInterpreter, Val,
};

/// Request the configuration record
pub fn get_config() -> Comp {
    perform(Command::bare(kinds::GET_CONFIG))
}

/// Request one field of the configuration record (`Null` if absent)
pub fn config_value(key: &'static str) -> Comp {
    get_config().map(move |config| config.get(key).cloned().unwrap_or(Val::Null))
}

/// Interpreter answering every `getConfig` with `record`
pub fn config_interpreter(record: Val) -> HandlerInterpreter {
    make_interpreter(kinds::GET_CONFIG, move |_| pure(record.clone()))
}
