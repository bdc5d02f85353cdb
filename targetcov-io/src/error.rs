use std::io;
use std::path::PathBuf;

use thiserror::Error;

use targetcov_core::IntervalError;

/// Error type for targetcov-io operations.
#[derive(Error, Debug)]
pub enum IntervalIoError {
    /// IO error occurred while reading lines.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened.
    #[error("Could not open interval file: {0:#}")]
    Open(anyhow::Error),

    /// The file extension does not name a known interval dialect.
    #[error(
        "Cannot infer interval file kind from {0:?}. It must be `bed`, `bed.gz`, `interval_list` or `intervals`"
    )]
    UnknownFileKind(PathBuf),

    /// A data line has fewer than the three required columns.
    #[error("Line {line} has {found} column(s), at least 3 are required")]
    MissingColumns { line: usize, found: usize },

    /// A line that is not valid UTF-8.
    #[error("Line {line} is not valid UTF-8")]
    InvalidUtf8 { line: usize },

    /// Bounds that fail to parse or violate `begin < end`.
    #[error(transparent)]
    Malformed(#[from] IntervalError),
}

/// Result type alias for targetcov-io operations.
pub type Result<T> = std::result::Result<T, IntervalIoError>;
