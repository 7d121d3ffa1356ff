//! Commands: inert descriptions of requested effects

use super::values::Val;
use crate::errors::{EffectError, Result};
use crate::runtime::computation::Comp;
use crate::runtime::escape::Escape;
use futures::future::BoxFuture;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Reserved command kind names
pub mod kinds {
    pub const LOG: &str = "log";
    pub const GET_CONFIG: &str = "getConfig";
    pub const DB: &str = "db";
    pub const WAIT: &str = "wait";
    pub const CALL_CC: &str = "call-cc";
}

/// An in-flight asynchronous operation consumed by one `wait` command
pub type Pending = BoxFuture<'static, Result<Val>>;

/// The body handed to a capture scope through the `call-cc` command
pub type CaptureBody = Box<dyn FnOnce(Escape) -> Comp + Send>;

/* ===================== Escape Tokens ===================== */

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct TokenSite {
    serial: u64,
    open: AtomicBool,
}

/// Identity of a single capture site
///
/// Equality is pointer identity on the shared site, never the serial.
#[derive(Debug, Clone)]
pub struct EscapeToken(Arc<TokenSite>);

impl EscapeToken {
    pub(crate) fn mint() -> Self {
        EscapeToken(Arc::new(TokenSite {
            serial: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            open: AtomicBool::new(true),
        }))
    }

    /// Diagnostic number, only meaningful for display
    pub fn serial(&self) -> u64 {
        self.0.serial
    }

    /// Whether the capture scope that minted this token is still running
    pub fn is_open(&self) -> bool {
        self.0.open.load(Ordering::Acquire)
    }

    pub(crate) fn close(&self) {
        self.0.open.store(false, Ordering::Release);
    }
}

impl PartialEq for EscapeToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EscapeToken {}

impl fmt::Display for EscapeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "escape#{}", self.0.serial)
    }
}

/* ===================== Kind ===================== */

/// Command discriminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Named effect, compared by name
    Tag(Cow<'static, str>),
    /// Escape from one capture scope, compared by token identity
    Escape(EscapeToken),
}

impl Kind {
    pub fn is_escape(&self) -> bool {
        matches!(self, Kind::Escape(_))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Tag(name) => f.write_str(name),
            Kind::Escape(token) => write!(f, "{}", token),
        }
    }
}

impl From<&'static str> for Kind {
    fn from(name: &'static str) -> Self {
        Kind::Tag(Cow::Borrowed(name))
    }
}

impl From<String> for Kind {
    fn from(name: String) -> Self {
        Kind::Tag(Cow::Owned(name))
    }
}

impl From<EscapeToken> for Kind {
    fn from(token: EscapeToken) -> Self {
        Kind::Escape(token)
    }
}

/* ===================== Payload ===================== */

/// Kind-specific command parameter
pub enum Payload {
    None,
    Val(Val),
    Future(Pending),
    Body(CaptureBody),
}

impl Payload {
    /// Borrow the plain value, if this payload is one
    pub fn as_val(&self) -> Option<&Val> {
        match self {
            Payload::Val(v) => Some(v),
            _ => None,
        }
    }

    /// Take the plain value; `None` reads as `Null`
    pub fn into_val(self, kind: &Kind) -> Result<Val> {
        match self {
            Payload::None => Ok(Val::Null),
            Payload::Val(v) => Ok(v),
            _ => Err(mismatch(kind, "value")),
        }
    }

    pub fn into_future(self, kind: &Kind) -> Result<Pending> {
        match self {
            Payload::Future(pending) => Ok(pending),
            _ => Err(mismatch(kind, "future")),
        }
    }

    pub fn into_body(self, kind: &Kind) -> Result<CaptureBody> {
        match self {
            Payload::Body(body) => Ok(body),
            _ => Err(mismatch(kind, "capture body")),
        }
    }
}

fn mismatch(kind: &Kind, expected: &'static str) -> EffectError {
    EffectError::PayloadMismatch {
        kind: kind.to_string(),
        expected,
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Val(v) => f.debug_tuple("Val").field(v).finish(),
            Payload::Future(_) => f.write_str("Future(..)"),
            Payload::Body(_) => f.write_str("Body(..)"),
        }
    }
}

impl From<Val> for Payload {
    fn from(v: Val) -> Self {
        Payload::Val(v)
    }
}

/* ===================== Command ===================== */

/// A requested effect: what to do, never how
#[derive(Debug)]
pub struct Command {
    pub kind: Kind,
    pub payload: Payload,
}

impl Command {
    pub fn new(kind: impl Into<Kind>, payload: impl Into<Payload>) -> Self {
        Command {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Command without a parameter
    pub fn bare(kind: impl Into<Kind>) -> Self {
        Command {
            kind: kind.into(),
            payload: Payload::None,
        }
    }

    pub fn is(&self, kind: &Kind) -> bool {
        &self.kind == kind
    }
}
