//! Error types for the builder's outer boundary.
//!
//! Builder operations themselves (add, delete, select, reorder, update)
//! are total over valid inputs and never fail. Only persistence and the
//! interactive fill flow can go wrong, so those are the only error
//! families here.

use thiserror::Error;

/// Errors from the template backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Empty response for {method} {path}")]
    EmptyResponse { method: String, path: String },

    #[error("Failed to parse response: {0}")]
    Json(String),

    #[error("Response is missing '{0}'")]
    MissingKey(&'static str),
}

impl RepositoryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status(status: u16, path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            path: path.into(),
            body: body.into(),
        }
    }

    pub fn empty_response(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::EmptyResponse {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn missing_key(key: &'static str) -> Self {
        Self::MissingKey(key)
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Errors from filling a template on the terminal.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("input closed before the form was complete")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the local draft file.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Failed to read draft: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
