//! # Errors (Feathers-style)
//!
//! Campus uses a small set of structured errors that:
//! - carry a status code and a class name
//! - travel inside `anyhow::Error` through services
//! - are serialized by the transport crate, never by services
//!
//! Storage errors (`StoreError`) are recognised by [`CampusError::normalize`] so a
//! service can propagate them with `?` and still answer with the right status.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;

use crate::store::StoreError;

/// A convenience result type for Campus service APIs.
pub type CampusResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    Forbidden,        // 403
    NotFound,         // 404
    Conflict,         // 409
    Unprocessable,    // 422
    GeneralError,     // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A structured Campus error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct CampusError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl CampusError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            errors: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    pub fn from_anyhow(err: &AnyError) -> Option<&CampusError> {
        err.downcast_ref::<CampusError>()
    }

    /// Turn any error into a CampusError:
    /// - a CampusError is kept as is
    /// - a StoreError is mapped to its status
    /// - anything else becomes a GeneralError
    pub fn normalize(err: AnyError) -> CampusError {
        let err = match err.downcast::<CampusError>() {
            Ok(campus) => return campus,
            Err(other) => other,
        };
        match err.downcast::<StoreError>() {
            Ok(store) => CampusError::from(store),
            Err(other) => CampusError::general_error(other.to_string()).with_source(other),
        }
    }

    /// A copy safe to hand to clients. The `source` chain is dropped, and the
    /// message of a 5xx error is replaced so backend text never leaks.
    pub fn sanitize_for_client(&self) -> CampusError {
        let message = if self.kind.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.message.clone()
        };
        CampusError {
            kind: self.kind,
            message,
            data: if self.kind.is_server_error() { None } else { self.data.clone() },
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = serde_json::json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for CampusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for CampusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<StoreError> for CampusError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(what) => CampusError::not_found(format!("{what} not found")),
            StoreError::Conflict(what) => CampusError::conflict(format!("{what} already exists")),
            StoreError::Timeout(_) | StoreError::Backend(_) => {
                let message = err.to_string();
                CampusError::general_error(message).with_source(AnyError::new(err))
            }
        }
    }
}

/// Convenience helper for "bail with CampusError".
#[macro_export]
macro_rules! bail_campus {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::CampusError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::CampusError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}
