//! # Interval file readers.
//!
//! This small crate turns target files into [`IntervalRecord`](targetcov_core::models::IntervalRecord)s
//! and [`IntervalIndex`](targetcov_index::IntervalIndex)es. It owns the dialects
//! ([`IntervalFileKind`]), the coordinate conversions, and the choice between failing on and
//! skipping malformed lines ([`MalformedLinePolicy`]).
//!
pub mod error;
pub mod kind;
pub mod reader;

// re-expose core functions
pub use error::*;
pub use kind::*;
pub use reader::*;
