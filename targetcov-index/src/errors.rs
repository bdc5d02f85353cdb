use thiserror::Error;

/// Errors raised by [`crate::IntervalIndex`] queries and accessors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The contig is not present in the index.
    #[error("Unknown contig: {0}")]
    UnknownContig(String),
    /// The query is not valid against the current index state. This is a programming error:
    /// `nearest` on a query that intersects, or a range query over a list with overlaps.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
