//! `log` command and its interpreters

use crate::runtime::{
    kinds, make_interpreter, perform, pure, Command, Comp, HandlerInterpreter, Kind, Payload, Val,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Request that `entries` be logged; resumes with `Null`
pub fn log(entries: Vec<Val>) -> Comp {
    perform(Command::new(kinds::LOG, Val::List(entries)))
}

pub fn log_line(message: impl Into<String>) -> Comp {
    log(vec![Val::Str(message.into())])
}

/// Render log entries on one line: strings verbatim, everything else as JSON
pub fn render(entries: &[Val]) -> String {
    entries
        .iter()
        .map(|entry| match entry {
            Val::Str(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Destination for log commands
///
/// A sink may be shared by concurrently running computations, so it must
/// serialize its own writes.
pub trait LogSink: Send + Sync {
    fn write(&self, entries: &[Val]);
}

/// Emits each log command as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entries: &[Val]) {
        info!(target: "effectkit::log", "LOG {}", render(entries));
    }
}

/// Keeps rendered log lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entries: &[Val]) {
        self.lines.lock().push(render(entries));
    }
}

fn entries_of(payload: Payload) -> crate::errors::Result<Vec<Val>> {
    match payload.into_val(&Kind::from(kinds::LOG))? {
        Val::List(entries) => Ok(entries),
        Val::Null => Ok(Vec::new()),
        single => Ok(vec![single]),
    }
}

/// Interpreter writing every `log` command to `sink`
pub fn logging_interpreter(sink: Arc<dyn LogSink>) -> HandlerInterpreter {
    make_interpreter(kinds::LOG, move |payload: Payload| match entries_of(payload) {
        Ok(entries) => {
            sink.write(&entries);
            pure(())
        }
        Err(error) => crate::runtime::fail(error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{run, ComputationExt, Interpreter};

    #[test]
    fn test_render_mixes_strings_and_json() {
        let line = render(&[Val::from("received request"), Val::from(3.0), Val::Null]);
        assert_eq!(line, "received request 3 null");
    }

    #[test]
    fn test_logging_interpreter_writes_in_order() {
        let sink = Arc::new(MemorySink::new());
        let program = log_line("first")
            .then(log(vec![Val::from("second"), Val::Bool(true)]))
            .then(pure("ok"));

        let result = run(logging_interpreter(sink.clone()).interpret(program)).unwrap();

        assert_eq!(result, Val::from("ok"));
        assert_eq!(sink.lines(), vec!["first".to_string(), "second true".to_string()]);
    }

    #[test]
    fn test_log_resumes_with_null() {
        let sink = Arc::new(MemorySink::new());
        let result = run(logging_interpreter(sink).interpret(log_line("x"))).unwrap();
        assert!(result.is_null());
    }
}
