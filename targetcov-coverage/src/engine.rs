use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;

use targetcov_core::models::Interval;
use targetcov_index::IntervalIndex;

use crate::cancel::CancellationToken;
use crate::config::CoverageConfig;
use crate::errors::{CoverageError, Result, TaskError};
use crate::histogram::DepthHistogram;
use crate::walk::{IntervalDepth, walk_interval};
use crate::window::{WindowError, WindowFactory, WindowGuard};

/// Mean depth over one target interval, as reported by [`CoverageEngine::scan_by_interval`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalCoverage<'a, T> {
    pub contig: &'a str,
    pub interval: &'a Interval<T>,
    /// Positions walked; always the interval length.
    pub positions: u64,
    pub mean_depth: f64,
}

/// One unit of parallel work: a run of consecutive intervals on one contig.
struct ScanTask<'a, T> {
    contig: &'a str,
    chunk: usize,
    intervals: &'a [Interval<T>],
}

impl<T> ScanTask<'_, T> {
    fn fail(&self, source: WindowError) -> TaskError {
        TaskError {
            contig: self.contig.to_string(),
            chunk: self.chunk,
            intervals: self.intervals.len(),
            source,
        }
    }
}

enum TaskOutcome {
    Finished(DepthHistogram),
    Failed(TaskError),
    Stopped,
}

/// What the collector saw before the pool drained.
#[derive(Default)]
struct Collected {
    histograms: Vec<DepthHistogram>,
    errors: Vec<TaskError>,
    stopped: usize,
    timed_out: bool,
}

/// Overlapping targets would count shared positions once per target.
fn require_disjoint<T>(index: &IntervalIndex<T>) -> Result<()> {
    for contig in index.contigs() {
        contig.require_disjoint("Coverage scan")?;
    }
    Ok(())
}

fn plan_tasks<T>(index: &IntervalIndex<T>, max_chunk: usize) -> Vec<ScanTask<'_, T>> {
    index
        .contigs()
        .flat_map(|contig| {
            contig
                .intervals()
                .chunks(max_chunk)
                .enumerate()
                .map(move |(chunk, intervals)| ScanTask {
                    contig: contig.name(),
                    chunk,
                    intervals,
                })
        })
        .collect()
}

fn progress_bar(enabled: bool, len: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar.set_message("Scanning coverage");
    bar
}

///
/// Computes read-depth histograms over the targets of an [`IntervalIndex`].
///
/// `scan_overall` splits every contig's intervals into chunks, scans the chunks on a
/// dedicated worker pool, each with its own window and its own histogram, and sums the
/// histograms once all tasks are done. `scan_by_interval` walks the same intervals in index
/// order on the calling thread and reports a mean depth per interval.
///
/// ```
/// use targetcov_core::models::Interval;
/// use targetcov_coverage::{CoverageConfig, CoverageEngine, ReadSpanStore};
/// use targetcov_index::IntervalIndex;
///
/// let mut targets: IntervalIndex = IntervalIndex::new();
/// targets.insert_merging("1", vec![Interval::new(0, 8).unwrap()]);
///
/// let mut reads = ReadSpanStore::new();
/// reads.add_read("1", 0, 4).unwrap();
///
/// let engine = CoverageEngine::new(CoverageConfig::default().with_threads(1)).unwrap();
/// let histogram = engine.scan_overall(&targets, &reads).unwrap();
/// assert_eq!(histogram.get(1), 4);
/// assert_eq!(histogram.get(0), 4);
/// ```
///
#[derive(Debug, Clone)]
pub struct CoverageEngine {
    config: CoverageConfig,
    cancel: CancellationToken,
}

impl CoverageEngine {
    /// Build an engine, rejecting an invalid config.
    pub fn new(config: CoverageConfig) -> Result<Self> {
        config.validate()?;
        Ok(CoverageEngine {
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Use `token` to stop scans from elsewhere.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    ///
    /// Genome-wide depth histogram over every interval in `index`.
    ///
    /// `histogram[d]` counts the target positions covered by exactly `d` reads, with depths
    /// beyond the last bin folded into it. The result does not depend on the thread count.
    ///
    /// # Errors
    /// - [`CoverageError::CoverageScanFailed`] if any task failed, after all others finished;
    ///   the histogram of the healthy tasks is attached.
    /// - [`CoverageError::Timeout`] if the configured deadline passed first.
    /// - [`CoverageError::Cancelled`] if the engine's token was cancelled before every task ran.
    /// - [`CoverageError::Index`] if a contig still holds overlapping intervals.
    ///
    pub fn scan_overall<T, F>(&self, index: &IntervalIndex<T>, factory: &F) -> Result<DepthHistogram>
    where
        T: Sync,
        F: WindowFactory,
    {
        require_disjoint(index)?;
        let threads = self.config.thread_count();
        let tasks = plan_tasks(index, self.config.max_chunk);
        info!(
            "Scanning coverage over {} interval(s) on {} contig(s): {} task(s), {} thread(s)",
            index.total_interval_count(),
            index.len(),
            tasks.len(),
            threads
        );

        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        let deadline = self.config.timeout();
        let started = Instant::now();
        let halt = CancellationToken::new();
        let bar = progress_bar(self.config.progress, tasks.len());

        let stride = self.config.stride;
        let capacity = self.config.histogram_capacity;
        let cancel = &self.cancel;
        let (sender, receiver) = unbounded();

        let (submitted, collected) = pool.in_place_scope(|scope| {
            let mut submitted = 0usize;
            for task in &tasks {
                if cancel.is_cancelled() || halt.is_cancelled() {
                    break;
                }
                let sender = sender.clone();
                let halt = &halt;
                scope.spawn(move |_| {
                    let outcome = run_task(task, factory, stride, capacity, || {
                        cancel.is_cancelled() || halt.is_cancelled()
                    });
                    // the collector stops listening once the deadline passes
                    let _ = sender.send(outcome);
                });
                submitted += 1;
            }
            drop(sender);

            let collected = collect(&receiver, submitted, deadline.map(|d| started + d), &bar);
            if collected.timed_out {
                halt.cancel();
            }
            (submitted, collected)
        });
        bar.finish_and_clear();

        let completed = collected.histograms.len() + collected.errors.len();
        if collected.timed_out {
            let deadline = deadline.unwrap_or(Duration::ZERO);
            warn!(
                "Coverage scan timed out after {deadline:?}: {completed} of {} task(s) done",
                tasks.len()
            );
            return Err(CoverageError::Timeout {
                deadline,
                completed,
                pending: tasks.len() - completed,
            });
        }

        if collected.stopped > 0 || submitted < tasks.len() {
            warn!(
                "Coverage scan cancelled: {completed} of {} task(s) done",
                tasks.len()
            );
            return Err(CoverageError::Cancelled {
                completed,
                pending: tasks.len() - completed,
            });
        }

        let mut histogram = DepthHistogram::new(capacity);
        for local in &collected.histograms {
            histogram.merge(local);
        }
        debug!(
            "Reduced {} task histogram(s) in {:?}",
            collected.histograms.len(),
            started.elapsed()
        );

        if !collected.errors.is_empty() {
            return Err(CoverageError::CoverageScanFailed {
                errors: collected.errors,
                partial: histogram,
            });
        }

        Ok(histogram)
    }

    ///
    /// Mean depth of every interval in `index`, in index order.
    ///
    /// Runs on the calling thread with one window per contig. The first window failure ends
    /// the scan with [`CoverageError::Window`]; cancellation is checked between intervals.
    /// A contig with overlapping intervals is refused with [`CoverageError::Index`].
    ///
    pub fn scan_by_interval<'a, T, F>(
        &self,
        index: &'a IntervalIndex<T>,
        factory: &F,
    ) -> Result<Vec<IntervalCoverage<'a, T>>>
    where
        F: WindowFactory,
    {
        require_disjoint(index)?;
        let total = index.total_interval_count();
        let max_depth = u32::try_from(self.config.histogram_capacity - 1).unwrap_or(u32::MAX);
        let mut report = Vec::with_capacity(total);

        for contig in index.contigs() {
            if contig.is_empty() {
                continue;
            }
            let name = contig.name();
            let as_window_error = |source| CoverageError::Window {
                contig: name.to_string(),
                source,
            };

            let mut window = WindowGuard::new(factory.open(name).map_err(as_window_error)?);
            for interval in contig.intervals() {
                if self.cancel.is_cancelled() {
                    warn!(
                        "Per-interval scan cancelled after {} of {total} interval(s)",
                        report.len()
                    );
                    return Err(CoverageError::Cancelled {
                        completed: report.len(),
                        pending: total - report.len(),
                    });
                }

                let mut depth = IntervalDepth::new(max_depth);
                walk_interval(&mut *window, name, interval, self.config.stride, &mut depth)
                    .map_err(as_window_error)?;

                report.push(IntervalCoverage {
                    contig: name,
                    interval,
                    positions: depth.positions(),
                    mean_depth: depth.mean(),
                });
            }
            window.finish().map_err(as_window_error)?;
        }

        Ok(report)
    }
}

fn run_task<T, F, C>(
    task: &ScanTask<'_, T>,
    factory: &F,
    stride: i64,
    capacity: usize,
    should_stop: C,
) -> TaskOutcome
where
    F: WindowFactory,
    C: Fn() -> bool,
{
    if should_stop() {
        return TaskOutcome::Stopped;
    }

    let window = match factory.open(task.contig) {
        Ok(window) => window,
        Err(err) => return TaskOutcome::Failed(task.fail(err)),
    };
    let mut window = WindowGuard::new(window);
    let mut histogram = DepthHistogram::new(capacity);

    for interval in task.intervals {
        if should_stop() {
            return TaskOutcome::Stopped;
        }
        if let Err(err) = walk_interval(&mut *window, task.contig, interval, stride, &mut histogram)
        {
            return TaskOutcome::Failed(task.fail(err));
        }
    }

    match window.finish() {
        Ok(()) => TaskOutcome::Finished(histogram),
        Err(err) => TaskOutcome::Failed(task.fail(err)),
    }
}

fn collect(
    receiver: &Receiver<TaskOutcome>,
    expected: usize,
    deadline: Option<Instant>,
    bar: &ProgressBar,
) -> Collected {
    let mut collected = Collected::default();

    for _ in 0..expected {
        let outcome = match deadline {
            Some(deadline) => receiver.recv_deadline(deadline),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match outcome {
            Ok(TaskOutcome::Finished(histogram)) => collected.histograms.push(histogram),
            Ok(TaskOutcome::Failed(err)) => {
                warn!("Coverage task failed: {err}");
                collected.errors.push(err);
            }
            Ok(TaskOutcome::Stopped) => collected.stopped += 1,
            Err(RecvTimeoutError::Timeout) => {
                collected.timed_out = true;
                break;
            }
            // every sender is gone: a task panicked, and the scope re-raises it
            Err(RecvTimeoutError::Disconnected) => break,
        }
        bar.inc(1);
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use targetcov_index::IndexError;

    use crate::read_spans::ReadSpanStore;

    fn targets(contigs: &[(&str, &[(i64, i64)])]) -> IntervalIndex {
        let mut index = IntervalIndex::new();
        for (contig, spans) in contigs {
            index.insert_merging(
                contig,
                spans.iter().map(|&(b, e)| Interval::new(b, e).unwrap()),
            );
        }
        index
    }

    #[fixture]
    fn engine() -> CoverageEngine {
        CoverageEngine::new(CoverageConfig::default().with_threads(2)).unwrap()
    }

    #[rstest]
    fn test_plan_tasks_chunks_each_contig() {
        let index = targets(&[
            ("chr1", &[(0, 10), (20, 30), (40, 50), (60, 70), (80, 90)]),
            ("chr2", &[(0, 10)]),
        ]);
        let tasks = plan_tasks(&index, 2);

        let shape: Vec<(&str, usize, usize)> = tasks
            .iter()
            .map(|task| (task.contig, task.chunk, task.intervals.len()))
            .collect();
        assert_eq!(
            shape,
            vec![("chr1", 0, 2), ("chr1", 1, 2), ("chr1", 2, 1), ("chr2", 0, 1)]
        );
    }

    #[rstest]
    fn test_invalid_config_is_rejected() {
        let result = CoverageEngine::new(CoverageConfig::default().with_stride(0));
        assert!(matches!(result, Err(CoverageError::Config(_))));
    }

    #[rstest]
    fn test_empty_index_gives_empty_histogram(engine: CoverageEngine) {
        let index: IntervalIndex = IntervalIndex::new();
        let histogram = engine.scan_overall(&index, &ReadSpanStore::new()).unwrap();
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.capacity(), 15_000);
    }

    #[rstest]
    fn test_depth_is_clamped_to_last_bin() {
        let engine = CoverageEngine::new(
            CoverageConfig::default()
                .with_threads(1)
                .with_histogram_capacity(4),
        )
        .unwrap();
        let index = targets(&[("chr1", &[(0, 10)])]);
        let mut reads = ReadSpanStore::new();
        for _ in 0..9 {
            reads.add_read("chr1", 0, 10).unwrap();
        }

        let histogram = engine.scan_overall(&index, &reads).unwrap();
        assert_eq!(histogram.as_slice(), &[0, 0, 0, 10]);

        let report = engine.scan_by_interval(&index, &reads).unwrap();
        assert_eq!(report[0].mean_depth, 3.0);
    }

    #[rstest]
    fn test_overlapping_targets_are_refused(engine: CoverageEngine) {
        let mut index: IntervalIndex = IntervalIndex::new();
        index.bulk_load(
            "1",
            vec![Interval::new(0, 10).unwrap(), Interval::new(5, 15).unwrap()],
        );
        let mut reads = ReadSpanStore::new();
        reads.add_read("1", 0, 15).unwrap();

        assert!(matches!(
            engine.scan_overall(&index, &reads),
            Err(CoverageError::Index(IndexError::InvalidQuery(_)))
        ));
        assert!(matches!(
            engine.scan_by_interval(&index, &reads),
            Err(CoverageError::Index(IndexError::InvalidQuery(_)))
        ));

        index.merge_all();
        let histogram = engine.scan_overall(&index, &reads).unwrap();
        assert_eq!(histogram.total(), 15);
        assert_eq!(histogram.get(1), 15);
    }

    #[rstest]
    fn test_scan_by_interval_keeps_index_order(engine: CoverageEngine) {
        let index = targets(&[("chrB", &[(0, 4), (10, 14)]), ("chrA", &[(0, 2)])]);
        let mut reads = ReadSpanStore::new();
        reads.add_read("chrB", 10, 14).unwrap();
        reads.add_read("chrA", 0, 2).unwrap();
        reads.add_read("chrA", 0, 2).unwrap();

        let report = engine.scan_by_interval(&index, &reads).unwrap();
        let summary: Vec<(&str, i64, f64)> = report
            .iter()
            .map(|row| (row.contig, row.interval.begin(), row.mean_depth))
            .collect();
        assert_eq!(
            summary,
            vec![("chrB", 0, 0.0), ("chrB", 10, 1.0), ("chrA", 0, 2.0)]
        );
    }
}
