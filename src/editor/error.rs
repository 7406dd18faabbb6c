//! Errors raised at the editor's suspension points

use std::fmt;

/// Result type for editor I/O
pub type IoResult<T> = Result<T, IoError>;

/// Why a `write`, `read_line` or `sleep` did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// Cancelled by an interrupt (Ctrl+C)
    Killed,
    /// Another read or sleep is already outstanding
    Busy,
    /// The editor state went away while waiting
    Closed,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Killed => write!(f, "killed"),
            IoError::Busy => write!(f, "another read or sleep is already pending"),
            IoError::Closed => write!(f, "editor closed while waiting"),
        }
    }
}

impl std::error::Error for IoError {}
