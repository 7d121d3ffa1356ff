//! Error taxonomy for the effect runtime
//!
//! Interpreters never swallow these. A handler that models failures as values
//! completes with an error-shaped `Val` instead of returning one of these.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EffectError>;

#[derive(Debug, Error)]
pub enum EffectError {
    /// A command reached a driver or the async bridge with no interpreter for its kind
    #[error("Unhandled command: {kind}")]
    UnhandledCommand { kind: String },

    /// A future registered by the async bridge settled with a failure
    #[error("Async operation failed: {0}")]
    AsyncFailure(#[source] Box<EffectError>),

    /// An escape token was observed outside the capture scope that minted it
    #[error("Escape {token} leaked outside its capture scope ({state})")]
    EscapeLeak { token: String, state: &'static str },

    /// `advance` was called on a computation that already completed
    #[error("Computation advanced after completion")]
    AlreadyCompleted,

    /// A handler received a payload of the wrong shape for its kind
    #[error("Command '{kind}' expected a {expected} payload")]
    PayloadMismatch { kind: String, expected: &'static str },

    /// A domain failure raised by a handler body
    #[error("Handler for '{kind}' failed: {message}")]
    Handler { kind: String, message: String },

    /// A deferred future's resolver was dropped before settling it
    #[error("Pending operation was abandoned before it settled")]
    Abandoned,
}

impl EffectError {
    pub fn handler(kind: impl Into<String>, message: impl Into<String>) -> Self {
        EffectError::Handler {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
