//! Typed error handling for deadcss.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadcss operations.
#[derive(Error, Debug)]
pub enum DeadcssError {
    /// I/O error when reading a stylesheet or an evidence file
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A selector could not be parsed into a DOM query
    #[error("Selector error in {selector:?}: {message}")]
    Selector {
        selector: String,
        message: String,
        /// Byte offset into the selector text, if known
        position: Option<usize>,
    },

    /// Best-effort recovery from malformed stylesheet text
    #[error("Malformed CSS at offset {offset}: {message}")]
    MalformedCss { message: String, offset: usize },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Report serialization or export errors
    #[error("Report error: {message}")]
    Report { message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl DeadcssError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a selector error without location.
    pub fn selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Create a selector error pointing at a byte offset.
    pub fn selector_at(
        selector: impl Into<String>,
        message: impl Into<String>,
        position: usize,
    ) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a malformed CSS warning.
    pub fn malformed_css(message: impl Into<String>, offset: usize) -> Self {
        Self::MalformedCss {
            message: message.into(),
            offset,
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (analysis can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Selector { .. } | Self::MalformedCss { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadcss results.
pub type DeadcssResult<T> = Result<T, DeadcssError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadcssResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadcssResult<T> {
        self.map_err(|e| DeadcssError::io(path, e))
    }
}
