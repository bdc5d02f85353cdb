use std::fmt::{self, Display};
use std::time::Duration;

use thiserror::Error;

use targetcov_index::IndexError;

use crate::config::ConfigError;
use crate::histogram::DepthHistogram;
use crate::window::WindowError;

/// Failure of one `scan_overall` task: which contig chunk it owned and what went wrong.
#[derive(Error, Debug)]
#[error("task {chunk} on contig '{contig}' ({intervals} interval(s)): {source}")]
pub struct TaskError {
    pub contig: String,
    /// Chunk number within the contig, from 0.
    pub chunk: usize,
    pub intervals: usize,
    pub source: WindowError,
}

struct TaskErrorList<'a>(&'a [TaskError]);

impl Display for TaskErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CoverageError {
    /// One or more tasks failed. `partial` is the reduction of every task that succeeded.
    #[error("Coverage scan failed in {} task(s): {}", .errors.len(), TaskErrorList(.errors))]
    CoverageScanFailed {
        errors: Vec<TaskError>,
        partial: DepthHistogram,
    },
    #[error(
        "Coverage scan did not finish within {deadline:?} ({completed} task(s) done, {pending} unfinished)"
    )]
    Timeout {
        deadline: Duration,
        completed: usize,
        pending: usize,
    },
    #[error("Coverage scan cancelled ({completed} done, {pending} unfinished)")]
    Cancelled { completed: usize, pending: usize },
    /// A window failure in the sequential per-interval scan.
    #[error("Coverage scan failed on contig '{contig}': {source}")]
    Window {
        contig: String,
        #[source]
        source: WindowError,
    },
    /// The targets cannot be scanned as they are, e.g. a bulk-loaded contig with overlaps.
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("Could not start the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CoverageError>;
