//! Result of advancing a computation

use super::command::Command;
use super::values::Val;

/// Outcome of one `advance` call
#[derive(Debug)]
pub enum Step {
    /// Paused at `Command`, waiting for its resumption value
    Suspended(Command),
    /// Finished; the value is final
    Completed(Val),
}

impl Step {
    pub fn is_completed(&self) -> bool {
        matches!(self, Step::Completed(_))
    }
}
