//! Error types for mesh I/O operations.

use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The first meaningful line is not an OFF header.
    #[error("invalid OFF header: expected OFF or COFF, got {found:?}")]
    InvalidHeader {
        /// The token found in place of the header.
        found: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// The file ended before all announced elements were read.
    #[error("unexpected end of file: expected {expected} {element}, got {got}")]
    UnexpectedEof {
        /// Kind of element being read (`"vertices"`, `"faces"`, ...).
        element: &'static str,
        /// Count announced in the header.
        expected: usize,
        /// Count actually read.
        got: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

/// Open a file for reading, reporting a missing file as [`IoError::FileNotFound`].
pub(crate) fn open_existing(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })
}
