//! Async bridge
//!
//! The single point where driving flips from pulling steps in a loop to being
//! resumed by settled futures. A `wait` command carries a future; the bridge
//! awaits it and resumes the computation with its value. Waiting cannot be a
//! `make_interpreter` handler because resumption has to happen after the
//! future settles, not inline.
//!
//! Resumptions of one computation are serialized: the next `advance` only
//! happens once the awaited future has produced its value.

use super::computation::{perform, Comp};
use super::driver::unhandled;
use super::types::{kinds, Command, Kind, Payload, Pending, Step, Val};
use crate::errors::{EffectError, Result};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Build the reserved `wait` command for a future
pub fn wait<F>(future: F) -> Comp
where
    F: Future<Output = Result<Val>> + Send + 'static,
{
    wait_pending(future.boxed())
}

pub fn wait_pending(pending: Pending) -> Comp {
    perform(Command::new(kinds::WAIT, Payload::Future(pending)))
}

/// Drive a computation whose only remaining commands are `wait`s
///
/// Resolves with the computation's result. A failed future fails the whole
/// run with `AsyncFailure` and the computation is not resumed again.
pub fn run_async(mut comp: Comp) -> BoxFuture<'static, Result<Val>> {
    async move {
        let wait_kind = Kind::from(kinds::WAIT);
        let mut input = Val::Null;
        loop {
            match comp.advance(input)? {
                Step::Completed(value) => return Ok(value),
                Step::Suspended(command) if command.is(&wait_kind) => {
                    let pending = command.payload.into_future(&command.kind)?;
                    debug!("awaiting pending operation");
                    input = match pending.await {
                        Ok(value) => value,
                        Err(error) => {
                            debug!(%error, "pending operation failed");
                            return Err(EffectError::AsyncFailure(Box::new(error)));
                        }
                    };
                }
                Step::Suspended(command) => return Err(unhandled(&command)),
            }
        }
    }
    .boxed()
}

/// Run a computation through the bridge on the tokio runtime
pub fn spawn(comp: Comp) -> JoinHandle<Result<Val>> {
    tokio::spawn(run_async(comp))
}

/* ===================== Deferred ===================== */

/// Settles the future returned by `deferred` exactly once
#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<Result<Val>>,
}

impl Resolver {
    /// Returns false if the future was already dropped
    pub fn resolve(self, value: impl Into<Val>) -> bool {
        self.tx.send(Ok(value.into())).is_ok()
    }

    pub fn reject(self, error: EffectError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

/// A future settled from outside, and its resolver
///
/// Dropping the resolver without settling fails the future with `Abandoned`.
pub fn deferred() -> (Resolver, Pending) {
    let (tx, rx) = oneshot::channel();
    let pending = async move { rx.await.unwrap_or(Err(EffectError::Abandoned)) }.boxed();
    (Resolver { tx }, pending)
}
