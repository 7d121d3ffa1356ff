//! Request handling written against commands only
//!
//! Nothing here knows how logging, configuration or storage are performed.

use crate::handlers::{config_value, load, log, log_line};
use crate::runtime::{pure, Comp, ComputationExt, Val};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub cookie: String,
    pub resource_id: String,
}

impl Request {
    /// Request with a freshly generated id
    pub fn new(cookie: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Request {
            id: Uuid::new_v4().to_string(),
            cookie: cookie.into(),
            resource_id: resource_id.into(),
        }
    }
}

pub fn response(status: u16, body: Option<Val>) -> Val {
    let mut fields = vec![("status", Val::Num(f64::from(status)))];
    if let Some(body) = body {
        fields.push(("body", body));
    }
    Val::obj(fields)
}

/// Completes with whether `cookie` equals the configured secret
pub fn valid_cookie(cookie: String) -> Comp {
    config_value("secret").map(move |secret| Val::Bool(secret.as_str() == Some(cookie.as_str())))
}

fn received(req: &Request) -> Comp {
    log(vec![Val::from("received request"), Val::from(req.id.clone())])
}

/// Log, authenticate, then load the requested resource
///
/// Uses `log`, `getConfig` and `db`.
pub fn handle_request(req: Request) -> Comp {
    let resource_id = req.resource_id.clone();
    received(&req)
        .then(valid_cookie(req.cookie))
        .and_then(move |valid| {
            if valid.as_bool() == Some(true) {
                load(resource_id).map(|record| response(200, Some(record)))
            } else {
                pure(response(400, None))
            }
        })
}

/// Log and authenticate only; uses `log` and `getConfig`
pub fn handle_request_without_db(req: Request) -> Comp {
    received(&req)
        .then(valid_cookie(req.cookie))
        .and_then(|valid| {
            if valid.as_bool() == Some(true) {
                log_line("authenticated").then(pure(response(200, None)))
            } else {
                pure(response(400, None))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        collect_logs, config_interpreter, db_interpreter, logging_interpreter, MemorySink,
        MemoryStore, Store,
    };
    use crate::runtime::{compose, run, Interpreter};
    use std::sync::Arc;

    fn request(cookie: &str) -> Request {
        Request {
            id: "REQUEST ID".to_string(),
            cookie: cookie.to_string(),
            resource_id: "r1".to_string(),
        }
    }

    fn stack(sink: Arc<MemorySink>) -> crate::runtime::Stack {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::seeded([("r1", "P")]));
        compose(vec![
            Arc::new(logging_interpreter(sink)) as Arc<dyn Interpreter>,
            Arc::new(config_interpreter(Val::obj([("secret", Val::from("SECRET"))]))),
            Arc::new(db_interpreter(store)),
        ])
    }

    #[tokio::test]
    async fn test_valid_cookie_loads_record() {
        let sink = Arc::new(MemorySink::new());
        let response = stack(sink.clone())
            .run_async(handle_request(request("SECRET")))
            .await
            .unwrap();

        assert_eq!(response.get("status"), Some(&Val::Num(200.0)));
        assert_eq!(
            response.get("body").and_then(|b| b.get("payload")),
            Some(&Val::from("P"))
        );
        assert_eq!(sink.lines(), vec!["received request REQUEST ID".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_cookie_skips_db() {
        let sink = Arc::new(MemorySink::new());
        let reply = stack(sink)
            .run_async(handle_request(request("WRONG")))
            .await
            .unwrap();

        assert_eq!(reply, response(400, None));
    }

    #[test]
    fn test_without_db_runs_synchronously() {
        let sink = Arc::new(MemorySink::new());
        let stack = compose(vec![
            Arc::new(logging_interpreter(sink.clone())) as Arc<dyn Interpreter>,
            Arc::new(config_interpreter(Val::obj([("secret", Val::from("SECRET"))]))),
        ]);

        let response = stack.run(handle_request_without_db(request("SECRET"))).unwrap();

        assert_eq!(response.get("status"), Some(&Val::Num(200.0)));
        assert_eq!(
            sink.lines(),
            vec!["received request REQUEST ID".to_string(), "authenticated".to_string()]
        );
    }

    #[test]
    fn test_collecting_logger_returns_logs_with_value() {
        let stack = compose(vec![
            Arc::new(config_interpreter(Val::obj([("secret", Val::from("SECRET"))])))
                as Arc<dyn Interpreter>,
            Arc::new(collect_logs()),
        ]);

        let result = run(stack.interpret(handle_request_without_db(request("SECRET")))).unwrap();

        assert_eq!(result.get("value").and_then(|v| v.get("status")), Some(&Val::Num(200.0)));
        assert_eq!(result.get("logs").and_then(Val::as_list).map(<[Val]>::len), Some(2));
    }

    #[test]
    fn test_generated_request_ids_differ() {
        assert_ne!(Request::new("c", "r").id, Request::new("c", "r").id);
    }
}
