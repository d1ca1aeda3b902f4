//! Error types for the OstrichDB client.
//!
//! Every fallible operation in this crate returns [`OstrichResult<T>`]. Failures
//! are split by where they happen: before I/O (validation, unsupported method,
//! bad URL), during transport, or after the server answered with a non-2xx
//! status.

use crate::Method;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OstrichError {
    /// A name, type or value failed client-side validation; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The method string is not one of GET, POST, PUT, HEAD, DELETE.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network, TLS or timeout failure from `reqwest`.
    #[error("error performing request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered, but not with a 2xx status.
    #[error("{method} {url} failed with status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OstrichError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Status code of a [`OstrichError::Status`] error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

pub type OstrichResult<T> = Result<T, OstrichError>;
