//! Error types for docreport.
//!
//! Library crates use [`DocReportError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.
//!
//! A failed page fetch is deliberately *not* represented here: the cached
//! client logs the failure and returns no body, and callers surface the
//! fatality uniformly through [`DocReportError::NoContent`].

use std::path::PathBuf;

/// Top-level error type for all docreport operations.
#[derive(Debug, thiserror::Error)]
pub enum DocReportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP client construction or other network infrastructure error.
    #[error("network error: {0}")]
    Network(String),

    /// A page yielded no usable body; the document loader refuses to parse it.
    #[error("no content retrieved from {url}")]
    NoContent { url: String },

    /// An expected structural element is absent from a page.
    #[error("tag not found: <{tag}> {attrs}")]
    TagNotFound { tag: String, attrs: String },

    /// An index row does not carry the expected four leading fields.
    #[error("malformed index row: {detail}")]
    MalformedRow { detail: String },

    /// A definition list lacks the entry for an expected label.
    #[error("missing {label:?} entry on {url}")]
    MissingField { label: String, url: String },

    /// Declared-status code with no legend entry — the site format is stale.
    #[error(
        "status comparison failed for proposal {number}: \
         declared {declared:?}, real {real:?}"
    )]
    StatusMismatch {
        number: u32,
        declared: String,
        real: String,
    },

    /// The scraped status legend violates the single-letter key rule.
    #[error("legend error: {message}")]
    Legend { message: String },

    /// Response cache layer error.
    #[error("cache error: {0}")]
    Cache(String),

    /// HTML query construction or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocReportError>;

impl DocReportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a legend error from any displayable message.
    pub fn legend(msg: impl Into<String>) -> Self {
        Self::Legend {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
