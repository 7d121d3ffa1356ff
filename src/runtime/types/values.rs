//! Runtime value types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Runtime value type
///
/// Carried by command parameters, resumption values and final results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
}

impl Val {
    /// Build an object from key/value pairs
    pub fn obj<K, I>(entries: I) -> Val
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Val)>,
    {
        Val::Obj(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a field of an object (None for non-objects or missing keys)
    pub fn get(&self, key: &str) -> Option<&Val> {
        match self {
            Val::Obj(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Val::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Val::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Val]> {
        match self {
            Val::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Val::Null)
    }
}

/* ===================== JSON Conversion ===================== */

/// Convert a JSON value into a runtime value
pub fn json_to_val(json: &JsonValue) -> Val {
    match json {
        JsonValue::Null => Val::Null,
        JsonValue::Bool(b) => Val::Bool(*b),
        JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Val::Str(s.clone()),
        JsonValue::Array(items) => Val::List(items.iter().map(json_to_val).collect()),
        JsonValue::Object(map) => Val::Obj(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_val(v)))
                .collect(),
        ),
    }
}

/// Convert a runtime value into JSON
///
/// Non-finite numbers have no JSON form and become `null`.
pub fn val_to_json(val: &Val) -> JsonValue {
    match val {
        Val::Null => JsonValue::Null,
        Val::Bool(b) => JsonValue::Bool(*b),
        Val::Num(n) => num_to_json(*n),
        Val::Str(s) => JsonValue::String(s.clone()),
        Val::List(items) => JsonValue::Array(items.iter().map(val_to_json).collect()),
        Val::Obj(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), val_to_json(v)))
                .collect(),
        ),
    }
}

/// Largest magnitude below which every integer is exact in an `f64`
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral values render without a fraction: `3`, not `3.0`
fn num_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", val_to_json(self))
    }
}

/* ===================== Conversions ===================== */

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<i64> for Val {
    fn from(n: i64) -> Self {
        Val::Num(n as f64)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<Vec<Val>> for Val {
    fn from(items: Vec<Val>) -> Self {
        Val::List(items)
    }
}

impl From<()> for Val {
    fn from(_: ()) -> Self {
        Val::Null
    }
}

impl From<JsonValue> for Val {
    fn from(json: JsonValue) -> Self {
        json_to_val(&json)
    }
}
