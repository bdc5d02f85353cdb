//! In-memory index over sets of genomic intervals.
//!
//! The index keeps one list of half-open [`Interval`]s per contig, sorted by `begin`, and
//! answers point containment, range intersection and nearest-neighbour queries with binary
//! searches over the `begin` values.
//!
//! ## Quick Start
//!
//! ```rust
//! use targetcov_core::models::Interval;
//! use targetcov_index::IntervalIndex;
//!
//! // exon targets on contig "1"
//! let mut index: IntervalIndex<&str> = IntervalIndex::new();
//! index.insert_merging(
//!     "1",
//!     vec![
//!         Interval::with_payload(100, 200, "exon1").unwrap(),
//!         Interval::with_payload(150, 250, "exon2").unwrap(),
//!         Interval::with_payload(400, 500, "exon3").unwrap(),
//!     ],
//! );
//!
//! // the first two were unioned into [100, 250)
//! assert_eq!(index.interval_count("1"), 2);
//! assert!(index.contains_point("1", 249));
//!
//! // a query in the gap reports its flanking targets, nearer first
//! let query: Interval = Interval::new(380, 390).unwrap();
//! assert_eq!(index.nearest("1", &query).unwrap(), vec![1, 0]);
//! ```
//!
//! Binary search over `begin` alone is only valid on non-overlapping lists. Lists built with
//! [`IntervalIndex::insert_merging`] always are; lists built with
//! [`IntervalIndex::bulk_load`] are checked, and queries on overlapping ones either fall back to
//! a linear scan or fail with [`IndexError::InvalidQuery`].

pub mod contig_index;
pub mod errors;
pub mod merge;
pub mod search;

// re-exports
pub use self::contig_index::{ContigIntervals, IntervalIndex, UnknownContigPolicy};
pub use self::errors::IndexError;
pub use targetcov_core::models::Interval;
