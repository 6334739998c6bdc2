//! Crate-wide error type.
//!
//! Mirrors `spec.md` §7's taxonomy: transport failures, HTTP semantic failures,
//! parse failures and invariant violations are each their own variant so callers
//! can match on the failure class rather than grep a message string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("load cancelled")]
    Cancelled,

    #[error("HTTP response code {code}")]
    HttpStatus { code: u16 },

    #[error("200 response to a byte-range request (server ignored Range)")]
    ContentTypeMismatch,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("URL template error: {0}")]
    UrlTemplate(String),

    #[error("URI resolution error: {0}")]
    UriResolution(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
