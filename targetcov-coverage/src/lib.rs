//! Read depth of coverage over a set of target intervals.
//!
//! Reads are reached through the [`AlignmentWindow`] trait: a forward-moving cursor that
//! reports how many reads overlap its position. A [`WindowFactory`] hands every scanning task
//! its own window, so windows are never shared between threads.
//!
//! [`CoverageEngine::scan_overall`] builds one [`DepthHistogram`] over all targets in
//! parallel, and [`CoverageEngine::scan_by_interval`] reports the mean depth of each target in
//! index order. The [`stats`] module summarises a histogram.
//!
//! ```
//! use targetcov_core::models::Interval;
//! use targetcov_coverage::{CoverageConfig, CoverageEngine, ReadSpanStore, stats};
//! use targetcov_index::IntervalIndex;
//!
//! let mut targets: IntervalIndex = IntervalIndex::new();
//! targets.insert_merging("1", vec![Interval::new(0, 4).unwrap(), Interval::new(10, 14).unwrap()]);
//!
//! let mut reads = ReadSpanStore::new();
//! reads.add_read("1", 0, 4).unwrap();
//! reads.add_read("1", 0, 4).unwrap();
//!
//! let engine = CoverageEngine::new(CoverageConfig::default()).unwrap();
//! let histogram = engine.scan_overall(&targets, &reads).unwrap();
//! assert_eq!(stats::mean(&histogram).unwrap(), 1.0);
//!
//! let per_target = engine.scan_by_interval(&targets, &reads).unwrap();
//! assert_eq!(per_target[0].mean_depth, 2.0);
//! assert_eq!(per_target[1].mean_depth, 0.0);
//! ```
pub mod cancel;
pub mod config;
pub mod engine;
pub mod errors;
pub mod histogram;
pub mod read_spans;
pub mod stats;
pub mod window;

mod walk;

// re-exports
pub use self::cancel::CancellationToken;
pub use self::config::{ConfigError, CoverageConfig};
pub use self::engine::{CoverageEngine, IntervalCoverage};
pub use self::errors::{CoverageError, TaskError};
pub use self::histogram::DepthHistogram;
pub use self::read_spans::{ReadSpanStore, ReadSpanWindow};
pub use self::stats::StatsError;
pub use self::window::{AlignmentWindow, WindowError, WindowFactory, WindowGuard};
