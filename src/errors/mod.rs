//! # Errors Module
//!
//! Two families of failure flow through restgate:
//!
//! - **Structural errors** ([`GateError`]) carry an [`ErrorCode`] from the fixed
//!   101–118 taxonomy plus optional machine-readable content. Registries raise
//!   them on invalid configuration; the request builder and the dispatcher
//!   raise them on malformed input.
//! - **Response errors** ([`ResponseError`]) are raised on purpose by controller
//!   code to short-circuit to a specific client-visible status.
//!
//! Controllers return [`ControllerError`], which wraps both of the above and an
//! opaque `anyhow::Error` for everything else.
//!
//! ## Wire format
//!
//! [`ErrorCode`] is matched exhaustively inside the crate. Only at the boundary
//! is it turned into its stable number ([`ErrorCode::code`]) - the serde
//! representation is that number as well.
//!
//! ```rust
//! use restgate::errors::{ErrorCode, GateError};
//!
//! let err = GateError::new(ErrorCode::PathNotFound);
//! assert_eq!(err.code().code(), 101);
//! assert_eq!(err.to_string(), "Path not found");
//! ```

mod codes;

pub use codes::ErrorCode;

use serde_json::Value;
use thiserror::Error;

/// Structural error: a taxonomy code and optional content.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{}", .code.message(), detail_suffix(.content.as_ref()))]
pub struct GateError {
    code: ErrorCode,
    content: Option<Value>,
}

impl GateError {
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            content: None,
        }
    }

    /// Attach machine-readable content (a detail string, a list of offenders).
    #[must_use]
    pub fn with_content(code: ErrorCode, content: impl Into<Value>) -> Self {
        Self {
            code,
            content: Some(content.into()),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// Returns true if this error carries the given code.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

impl From<ErrorCode> for GateError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Renders `content` as a parenthesised suffix for `Display`.
///
/// String lists become `(a, b)`, a bare string `(text)`; anything else is
/// left out of the message.
fn detail_suffix(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) if !text.is_empty() => format!(" ({text})"),
        Some(Value::Array(items)) if !items.is_empty() => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            format!(" ({})", parts.join(", "))
        }
        _ => String::new(),
    }
}

/// An error a controller raises to answer with a specific status.
///
/// Body precedence when mapped to a response: `content`, then `message`, then
/// the canonical reason phrase of `status`, then `"Unknown error"`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("response error {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct ResponseError {
    status: u16,
    content: Option<Value>,
    message: Option<String>,
    error_code: Option<String>,
}

impl ResponseError {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            content: None,
            message: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<Value>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Application-specific identifier, echoed back to hosts untouched.
    #[must_use]
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn get_content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn get_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn get_error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}

/// Everything a controller may fail with.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    /// Opaque failure; always answered with a generic 500.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
