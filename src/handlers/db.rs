//! `db` command, storage collaborators and the db interpreter
//!
//! The db interpreter does not await storage itself. It turns each `db`
//! command into a `wait` on the store's future, so an async bridge must sit
//! outside it.

use crate::errors::{EffectError, Result};
use crate::runtime::{
    fail, kinds, make_interpreter, perform, wait_pending, Command, Comp, Handler,
    HandlerInterpreter, Kind, Payload, Pending, Val,
};
use futures::future::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request `method(args)` against the storage collaborator
pub fn db(method: &str, args: Vec<Val>) -> Comp {
    let request = Val::obj([("method", Val::from(method)), ("args", Val::List(args))]);
    perform(Command::new(kinds::DB, request))
}

pub fn load(id: impl Into<Val>) -> Comp {
    db("load", vec![id.into()])
}

/// A decoded `db` parameter
#[derive(Debug, Clone, PartialEq)]
pub struct DbRequest {
    pub method: String,
    pub args: Vec<Val>,
}

impl DbRequest {
    pub fn from_val(val: &Val) -> Result<Self> {
        let method = val
            .get("method")
            .and_then(Val::as_str)
            .ok_or_else(|| EffectError::handler(kinds::DB, "request has no method"))?;
        let args = val
            .get("args")
            .and_then(Val::as_list)
            .map(<[Val]>::to_vec)
            .unwrap_or_default();
        Ok(DbRequest {
            method: method.to_string(),
            args,
        })
    }

    pub fn from_payload(payload: Payload) -> Result<Self> {
        Self::from_val(&payload.into_val(&Kind::from(kinds::DB))?)
    }
}

/* ===================== Stores ===================== */

/// Storage collaborator invoked by the db interpreter
pub trait Store: Send + Sync {
    fn call(&self, method: &str, args: Vec<Val>) -> Pending;
}

/// In-memory store keyed by record id
///
/// Methods: `load(id)`, `save(id, record)`, `delete(id)`, `list()`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, Val>>>,
    latency: Option<Duration>,
    failures: Arc<AtomicU32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `{id, payload}` records
    pub fn seeded<I, K, P>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Val>,
    {
        let store = Self::new();
        {
            let mut map = store.records.write();
            for (id, payload) in records {
                let id = id.into();
                let record = Val::obj([("id", Val::from(id.clone())), ("payload", payload.into())]);
                map.insert(id, record);
            }
        }
        store
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `count` calls fail
    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn execute(&self, method: &str, args: &[Val]) -> Result<Val> {
        let id = || {
            args.first()
                .and_then(Val::as_str)
                .map(str::to_string)
                .ok_or_else(|| EffectError::handler(kinds::DB, format!("{} needs a string id", method)))
        };

        match method {
            "load" => Ok(self.records.read().get(&id()?).cloned().unwrap_or(Val::Null)),
            "save" => {
                let id = id()?;
                let record = args.get(1).cloned().unwrap_or(Val::Null);
                self.records.write().insert(id, record.clone());
                Ok(record)
            }
            "delete" => Ok(Val::Bool(self.records.write().remove(&id()?).is_some())),
            "list" => {
                let mut ids: Vec<String> = self.records.read().keys().cloned().collect();
                ids.sort();
                Ok(Val::List(ids.into_iter().map(Val::Str).collect()))
            }
            other => Err(EffectError::handler(
                kinds::DB,
                format!("unknown method '{}'", other),
            )),
        }
    }
}

impl Store for MemoryStore {
    fn call(&self, method: &str, args: Vec<Val>) -> Pending {
        let store = self.clone();
        let method = method.to_string();
        async move {
            if let Some(latency) = store.latency {
                tokio::time::sleep(latency).await;
            }
            if store.take_failure() {
                return Err(EffectError::handler(
                    kinds::DB,
                    format!("{} failed: store unavailable", method),
                ));
            }
            store.execute(&method, &args)
        }
        .boxed()
    }
}

/// Retries failed calls of an inner store with linear back-off
pub struct RetryingStore<S> {
    inner: Arc<S>,
    attempts: u32,
    backoff: Duration,
}

impl<S: Store + 'static> RetryingStore<S> {
    /// `attempts` counts the first call; values below 1 are treated as 1
    pub fn new(inner: S, attempts: u32, backoff: Duration) -> Self {
        RetryingStore {
            inner: Arc::new(inner),
            attempts: attempts.max(1),
            backoff,
        }
    }
}

impl<S: Store + 'static> Store for RetryingStore<S> {
    fn call(&self, method: &str, args: Vec<Val>) -> Pending {
        let inner = self.inner.clone();
        let attempts = self.attempts;
        let backoff = self.backoff;
        let method = method.to_string();
        async move {
            let mut attempt = 1;
            loop {
                match inner.call(&method, args.clone()).await {
                    Ok(value) => return Ok(value),
                    Err(error) if attempt < attempts => {
                        warn!(%method, attempt, %error, "store call failed, retrying");
                        tokio::time::sleep(backoff * attempt).await;
                        attempt += 1;
                    }
                    Err(error) => return Err(error),
                }
            }
        }
        .boxed()
    }
}

/* ===================== Interpreter ===================== */

/// Handler turning a `db` command into a `wait` on the store
pub fn db_handler(store: Arc<dyn Store>) -> Handler {
    Arc::new(move |payload: Payload| match DbRequest::from_payload(payload) {
        Ok(request) => {
            debug!(method = %request.method, "calling store");
            wait_pending(store.call(&request.method, request.args))
        }
        Err(error) => fail(error),
    })
}

pub fn db_interpreter(store: Arc<dyn Store>) -> HandlerInterpreter {
    HandlerInterpreter::from_handler(kinds::DB, db_handler(store))
}

/// `make_interpreter` form, for callers that prefer a closure
pub fn db_interpreter_with<F>(call: F) -> HandlerInterpreter
where
    F: Fn(DbRequest) -> Pending + Send + Sync + 'static,
{
    make_interpreter(kinds::DB, move |payload: Payload| {
        match DbRequest::from_payload(payload) {
            Ok(request) => wait_pending(call(request)),
            Err(error) => fail(error),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{run_async, Interpreter};

    #[tokio::test]
    async fn test_memory_store_methods() {
        let store = MemoryStore::seeded([("r1", "P")]);

        let loaded = store.call("load", vec![Val::from("r1")]).await.unwrap();
        assert_eq!(loaded.get("payload"), Some(&Val::from("P")));

        let missing = store.call("load", vec![Val::from("nope")]).await.unwrap();
        assert_eq!(missing, Val::Null);

        store
            .call("save", vec![Val::from("r2"), Val::from("Q")])
            .await
            .unwrap();
        let ids = store.call("list", vec![]).await.unwrap();
        assert_eq!(ids, Val::List(vec![Val::from("r1"), Val::from("r2")]));

        let deleted = store.call("delete", vec![Val::from("r1")]).await.unwrap();
        assert_eq!(deleted, Val::Bool(true));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_method_fails() {
        let store = MemoryStore::new();
        let err = store.call("drop_all", vec![]).await.unwrap_err();
        assert!(err.to_string().contains("unknown method 'drop_all'"));
    }

    #[tokio::test]
    async fn test_db_interpreter_routes_through_wait() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::seeded([("r1", "P")]));
        let comp = db_interpreter(store).interpret(load("r1"));

        let record = run_async(comp).await.unwrap();
        assert_eq!(record.get("id"), Some(&Val::from("r1")));
    }

    #[tokio::test]
    async fn test_db_interpreter_with_closure() {
        let interp = db_interpreter_with(|request: DbRequest| {
            let echoed = Val::from(request.method);
            async move { Ok::<_, EffectError>(echoed) }.boxed()
        });

        let result = run_async(interp.interpret(db("ping", vec![]))).await.unwrap();
        assert_eq!(result, Val::from("ping"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrying_store_recovers() {
        let inner = MemoryStore::seeded([("r1", "P")]);
        inner.fail_next(2);
        let store = RetryingStore::new(inner, 3, Duration::from_millis(10));

        let record = store.call("load", vec![Val::from("r1")]).await.unwrap();
        assert_eq!(record.get("payload"), Some(&Val::from("P")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrying_store_gives_up() {
        let inner = MemoryStore::seeded([("r1", "P")]);
        inner.fail_next(5);
        let store = RetryingStore::new(inner, 2, Duration::from_millis(10));

        let err = store.call("load", vec![Val::from("r1")]).await.unwrap_err();
        assert!(matches!(err, EffectError::Handler { .. }));
    }

    #[test]
    fn test_request_requires_method() {
        let err = DbRequest::from_val(&Val::obj([("args", Val::List(vec![]))])).unwrap_err();
        assert!(err.to_string().contains("no method"));
    }
}
