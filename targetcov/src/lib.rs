//! # targetcov
//!
//! Genomic target intervals and read depth of coverage over them.
//!
//! Each module is its own crate, switched on by the cargo feature of the same name:
//!
//! - `core`: the half-open [`Interval`](crate::core::models::Interval) value type and ingestion records.
//! - `index`: per-contig sorted interval lists with point, range and nearest queries.
//! - `io`: reading BED and interval-list files into an index.
//! - `coverage`: the parallel depth-of-coverage engine, depth histograms and their statistics.
#[cfg(feature = "core")]
#[doc(inline)]
pub use targetcov_core as core;
#[cfg(feature = "index")]
#[doc(inline)]
pub use targetcov_index as index;
#[cfg(feature = "io")]
#[doc(inline)]
pub use targetcov_io as io;
#[cfg(feature = "coverage")]
#[doc(inline)]
pub use targetcov_coverage as coverage;
