use targetcov_core::models::Interval;

use crate::histogram::DepthHistogram;
use crate::window::{AlignmentWindow, WindowError};

/// Receives depth credits from [`walk_interval`].
pub(crate) trait DepthSink {
    fn credit(&mut self, depth: u32, positions: u64);
}

impl DepthSink for DepthHistogram {
    #[inline]
    fn credit(&mut self, depth: u32, positions: u64) {
        self.record(depth, positions);
    }
}

/// Running depth sum over one interval, clamped the way the histogram clamps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntervalDepth {
    max_depth: u32,
    positions: u64,
    depth_sum: u128,
}

impl IntervalDepth {
    pub(crate) fn new(max_depth: u32) -> Self {
        IntervalDepth {
            max_depth,
            positions: 0,
            depth_sum: 0,
        }
    }

    pub(crate) fn positions(&self) -> u64 {
        self.positions
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.positions == 0 {
            return 0.0;
        }
        self.depth_sum as f64 / self.positions as f64
    }
}

impl DepthSink for IntervalDepth {
    #[inline]
    fn credit(&mut self, depth: u32, positions: u64) {
        let depth = depth.min(self.max_depth);
        self.positions += positions;
        self.depth_sum += depth as u128 * positions as u128;
    }
}

///
/// Walk `interval` on `contig` with `window`, crediting every position of it to `sink`.
///
/// While more than `stride` positions remain, the depth at the cursor is credited to `stride`
/// positions at once; the final `stride` or fewer positions are visited one by one. Once the
/// window reports no reads left on the contig, the rest of the interval is credited to depth 0
/// without touching the window again.
///
pub(crate) fn walk_interval<T, W, S>(
    window: &mut W,
    contig: &str,
    interval: &Interval<T>,
    stride: i64,
    sink: &mut S,
) -> Result<(), WindowError>
where
    W: AlignmentWindow + ?Sized,
    S: DepthSink,
{
    let end = interval.end();
    let mut pos = interval.begin();

    window.advance_to(contig, pos)?;
    let mut reads_ahead = window.has_more_reads_in_current_contig();

    while pos < end {
        if !reads_ahead {
            sink.credit(0, (end - pos) as u64);
            break;
        }

        let step = if end - pos > stride { stride } else { 1 };
        sink.credit(window.size(), step as u64);
        pos += step;

        if pos < end {
            reads_ahead = window.advance_by(step)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::read_spans::ReadSpanStore;

    /// Records every cursor move so the sampling pattern can be checked.
    struct TracingWindow {
        depth: u32,
        reads_end: i64,
        pos: i64,
        visits: Vec<i64>,
    }

    impl TracingWindow {
        fn new(depth: u32, reads_end: i64) -> Self {
            TracingWindow {
                depth,
                reads_end,
                pos: 0,
                visits: Vec::new(),
            }
        }
    }

    impl AlignmentWindow for TracingWindow {
        fn advance_to(&mut self, _contig: &str, pos: i64) -> Result<(), WindowError> {
            self.pos = pos;
            self.visits.push(pos);
            Ok(())
        }

        fn advance_by(&mut self, n: i64) -> Result<bool, WindowError> {
            self.pos += n;
            self.visits.push(self.pos);
            Ok(self.has_more_reads_in_current_contig())
        }

        fn size(&self) -> u32 {
            if self.pos < self.reads_end { self.depth } else { 0 }
        }

        fn has_more_reads_in_current_contig(&self) -> bool {
            self.pos < self.reads_end
        }

        fn close(&mut self) -> Result<(), WindowError> {
            Ok(())
        }
    }

    #[rstest]
    fn test_samples_every_stride_then_every_position() {
        let mut window = TracingWindow::new(3, 1_000);
        let interval: Interval = Interval::new(0, 10).unwrap();
        let mut hist = DepthHistogram::new(8);

        walk_interval(&mut window, "chr1", &interval, 4, &mut hist).unwrap();

        assert_eq!(window.visits, vec![0, 4, 8, 9]);
        assert_eq!(hist.get(3), 10);
        assert_eq!(hist.total(), 10);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(4)]
    fn test_short_interval_visits_every_position(#[case] len: i64) {
        let mut window = TracingWindow::new(2, 1_000);
        let interval: Interval = Interval::new(100, 100 + len).unwrap();
        let mut hist = DepthHistogram::new(8);

        walk_interval(&mut window, "chr1", &interval, 4, &mut hist).unwrap();

        assert_eq!(window.visits, (100..100 + len).collect::<Vec<i64>>());
        assert_eq!(hist.get(2), len as u64);
    }

    #[rstest]
    fn test_exhausted_contig_credits_zero_without_window() {
        let mut window = TracingWindow::new(5, 8);
        let interval: Interval = Interval::new(0, 100).unwrap();
        let mut hist = DepthHistogram::new(8);

        walk_interval(&mut window, "chr1", &interval, 4, &mut hist).unwrap();

        assert_eq!(window.visits, vec![0, 4, 8]);
        assert_eq!(hist.get(5), 8);
        assert_eq!(hist.get(0), 92);
    }

    #[rstest]
    fn test_stride_one_is_exact() {
        let mut store = ReadSpanStore::new();
        store.add_read("chr1", 3, 7).unwrap();
        store.add_read("chr1", 5, 12).unwrap();
        let mut window = store.window();
        let interval: Interval = Interval::new(0, 15).unwrap();
        let mut hist = DepthHistogram::new(8);

        walk_interval(&mut window, "chr1", &interval, 1, &mut hist).unwrap();

        // depth 0: 0..3 and 12..15, depth 1: 3..5 and 7..12, depth 2: 5..7
        assert_eq!(&hist.as_slice()[..3], &[6, 7, 2]);
    }

    #[rstest]
    fn test_interval_depth_clamps_and_averages() {
        let mut depth = IntervalDepth::new(10);
        depth.credit(4, 2);
        depth.credit(50, 2);
        assert_eq!(depth.positions(), 4);
        assert_eq!(depth.mean(), 7.0);
    }
}
