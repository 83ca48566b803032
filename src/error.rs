//! Error types and handling infrastructure for wkr.
//!
//! This module provides a centralized error type using `thiserror`. The binary
//! layers `anyhow` on top for context at the command level.
//!
//! ## Design Principles
//!
//! - **Filesystem errors keep their source**: the underlying `io::Error` is always attached
//! - **Contract violations are distinct variants**: callers can match on them
//! - **Consistency**: one `Result` alias across all modules

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for wkr operations.
#[derive(Error, Debug)]
pub enum WkrError {
    /// File system related errors (file not found, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The value handed to the opener is neither a path, the stdio sentinel, nor a stream
    #[error("Unknown type for file reference: {type_name}")]
    UnsupportedReferenceKind { type_name: String },

    /// Operation not permitted for this kind of reference (e.g. writing into a zip archive)
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// A compound `archive.zip:member` reference that does not split cleanly
    #[error("Invalid file reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Access mode spelling that could not be parsed
    #[error("Invalid access mode: {mode:?}")]
    InvalidMode { mode: String },

    /// Malformed line in a tally file
    #[error("Format error on line {line_number}: {message}")]
    FormatError { line_number: usize, message: String },

    /// Text decoding failure under a requested encoding
    #[error("Cannot decode line {line_number} as {encoding}: {message}")]
    DecodeError {
        line_number: usize,
        encoding: &'static str,
        message: String,
    },

    /// Zip archive could not be opened or the member could not be read
    #[error("Archive error: {message}")]
    ArchiveError {
        message: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// CSV (de)serialization errors from the tabular cache
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Invalid argument to a helper function
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for wkr operations.
pub type Result<T> = std::result::Result<T, WkrError>;

impl WkrError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a FileError naming the path the operation was applied to
    pub fn path_error(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::file_error(format!("{} '{}'", action, path.display()), source)
    }

    /// Create an InvalidOperation error with a descriptive message
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an ArchiveError for the given archive path
    pub fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::ArchiveError {
            message: format!("cannot read '{}'", path.display()),
            source,
        }
    }

    /// The underlying `io::ErrorKind`, if this is a filesystem error
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::FileError { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Path with `~` appended, used for backups
pub(crate) fn tilde_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push("~");
    PathBuf::from(name)
}

// Automatic conversion from io::Error to WkrError
impl From<std::io::Error> for WkrError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
