//! Abstract error taxonomy (C10). Maps driver diagnostics to a small, stable set of kinds so
//! that callers across the FFI boundary can branch on a taxonomy rather than a SQLSTATE string.

use std::fmt;

use thiserror::Error as ThisError;

use crate::Error as OdbcError;

/// A SQLSTATE class, mapped to an [`EngineError`] variant. `08` connection, `40` transaction
/// rollback/deadlock, `42` syntax/access. Other classes fall back to [`EngineError::Query`].
fn classify_sql_state(state: &str) -> EngineErrorKind {
    match state.get(0..2) {
        Some("08") => EngineErrorKind::Connection,
        Some("40") => EngineErrorKind::Transaction,
        Some("42") => EngineErrorKind::Query,
        _ => EngineErrorKind::Query,
    }
}

/// Abstract taxonomy a caller can match on, independent of the underlying driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Validation,
    EnvironmentNotInitialized,
    Connection,
    Query,
    Transaction,
    BufferTooSmall,
    FramingError,
    RequestTimeout,
    WorkerTerminated,
    UnsupportedFeature,
    WorkerPanic,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineErrorKind::Validation => "Validation",
            EngineErrorKind::EnvironmentNotInitialized => "EnvironmentNotInitialized",
            EngineErrorKind::Connection => "Connection",
            EngineErrorKind::Query => "Query",
            EngineErrorKind::Transaction => "Transaction",
            EngineErrorKind::BufferTooSmall => "BufferTooSmall",
            EngineErrorKind::FramingError => "FramingError",
            EngineErrorKind::RequestTimeout => "RequestTimeout",
            EngineErrorKind::WorkerTerminated => "WorkerTerminated",
            EngineErrorKind::UnsupportedFeature => "UnsupportedFeature",
            EngineErrorKind::WorkerPanic => "WorkerPanic",
        };
        f.write_str(name)
    }
}

/// Structured error surfaced to callers. Carries the abstract [`EngineErrorKind`] plus, when the
/// error originates from a driver diagnostic, the raw SQLSTATE and native error code.
#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
    pub sql_state: Option<[u8; 5]>,
    pub native_code: Option<i32>,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        EngineError {
            kind,
            message: message.into(),
            sql_state: None,
            native_code: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Validation, message)
    }

    pub fn environment_not_initialized() -> Self {
        Self::new(
            EngineErrorKind::EnvironmentNotInitialized,
            "The ODBC environment has not been initialized. Call init first.",
        )
    }

    pub fn buffer_too_small(required: usize) -> Self {
        EngineError {
            kind: EngineErrorKind::BufferTooSmall,
            message: format!("Output buffer too small, {required} bytes required."),
            sql_state: None,
            native_code: None,
        }
    }

    pub fn framing(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::FramingError, message)
    }

    pub fn request_timeout(request_id: u64) -> Self {
        Self::new(
            EngineErrorKind::RequestTimeout,
            format!("Request {request_id} timed out before the worker replied."),
        )
    }

    pub fn worker_terminated() -> Self {
        Self::new(
            EngineErrorKind::WorkerTerminated,
            "The request/response worker has terminated.",
        )
    }

    pub fn unsupported_feature(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::UnsupportedFeature, message)
    }

    /// A job panicked inside the worker thread; the panic was caught at the job boundary so the
    /// worker itself keeps running (spec.md §4.9, §9 "Panics/unrecoverable faults must not cross
    /// the FFI boundary").
    pub fn worker_panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker job panicked with a non-string payload".to_string()
        };
        Self::new(
            EngineErrorKind::WorkerPanic,
            format!("Request handler panicked: {message}"),
        )
    }
}

/// Classifies a low-level [`crate::Error`] into the abstract taxonomy, preserving SQLSTATE and
/// native error code when the error carries a driver diagnostic.
impl From<OdbcError> for EngineError {
    fn from(err: OdbcError) -> Self {
        if let OdbcError::Diagnostics { record, function } = &err {
            let state = record.state.as_str();
            let kind = classify_sql_state(state);
            let mut sql_state = [0u8; 5];
            let bytes = state.as_bytes();
            let len = bytes.len().min(5);
            sql_state[..len].copy_from_slice(&bytes[..len]);
            return EngineError {
                kind,
                message: format!("ODBC call '{function}' failed: {record}"),
                sql_state: Some(sql_state),
                native_code: Some(record.native_error),
            };
        }
        EngineError::new(EngineErrorKind::Query, err.to_string())
    }
}
