//! Classified failures from the generative backend.
//!
//! Adapters only classify; the orchestrator is the one place that decides what a
//! kind means for the UI and the credential gate.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Structured payload missing required fields or unparseable.
    InvalidResponse,
    /// Job reported done without usable media.
    JobFailed,
    /// Backend reports the credential or resource as missing.
    NotFound,
    /// Any other transport or HTTP failure.
    Upstream,
    /// The attempt's cancellation token fired.
    Cancelled,
    /// The job outlived the configured maximum wait.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct RemoteServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RemoteServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RemoteServiceError {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        RemoteServiceError::new(ErrorKind::InvalidResponse, message)
    }

    pub fn job_failed(message: impl Into<String>) -> Self {
        RemoteServiceError::new(ErrorKind::JobFailed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RemoteServiceError::new(ErrorKind::NotFound, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        RemoteServiceError::new(ErrorKind::Upstream, message)
    }

    pub fn cancelled() -> Self {
        RemoteServiceError::new(ErrorKind::Cancelled, "attempt cancelled")
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        RemoteServiceError::new(ErrorKind::TimedOut, message)
    }
}

impl From<reqwest::Error> for RemoteServiceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status == reqwest::StatusCode::NOT_FOUND => {
                RemoteServiceError::not_found(err.to_string())
            }
            _ if err.is_decode() => RemoteServiceError::invalid_response(err.to_string()),
            _ => RemoteServiceError::upstream(err.to_string()),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteServiceError>;
