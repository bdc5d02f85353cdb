//! Core types for targetcov: the half-open genomic [`Interval`](models::Interval) shared by
//! the index and coverage crates, the raw [`IntervalRecord`](models::IntervalRecord) produced
//! by interval readers, and the errors raised when either is malformed.

pub mod errors;
pub mod models;
pub mod utils;

pub use errors::IntervalError;
