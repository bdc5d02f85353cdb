use serde::Serialize;

///
/// Count of genomic positions per read depth.
///
/// `get(d)` is the number of positions covered by exactly `d` reads. The number of bins is
/// fixed at construction; a depth at or beyond the last bin is counted in the last bin.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthHistogram {
    bins: Vec<u64>,
}

impl DepthHistogram {
    /// A zeroed histogram with `capacity` bins (at least one).
    pub fn new(capacity: usize) -> Self {
        DepthHistogram {
            bins: vec![0; capacity.max(1)],
        }
    }

    /// Build a histogram from per-depth counts.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        if counts.is_empty() {
            return DepthHistogram::new(1);
        }
        DepthHistogram { bins: counts }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bins.len()
    }

    /// Deepest depth that still has a bin of its own.
    #[inline]
    pub fn max_depth(&self) -> u32 {
        u32::try_from(self.bins.len() - 1).unwrap_or(u32::MAX)
    }

    /// Add `positions` positions at `depth`, clamped into the last bin.
    #[inline]
    pub fn record(&mut self, depth: u32, positions: u64) {
        let last = self.bins.len() - 1;
        let bin = (depth as usize).min(last);
        self.bins[bin] += positions;
    }

    /// Sum another histogram into this one. Bins of `other` beyond this capacity are
    /// folded into the last bin.
    pub fn merge(&mut self, other: &DepthHistogram) {
        let last = self.bins.len() - 1;
        for (depth, count) in other.bins.iter().enumerate() {
            self.bins[depth.min(last)] += count;
        }
    }

    #[inline]
    pub fn get(&self, depth: usize) -> u64 {
        self.bins.get(depth).copied().unwrap_or(0)
    }

    /// Total number of positions counted.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|&count| count == 0)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.bins
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.bins
    }

    /// `(depth, count)` for every bin, zero bins included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.bins.iter().copied().enumerate()
    }
}

impl Default for DepthHistogram {
    fn default() -> Self {
        DepthHistogram::new(crate::config::DEFAULT_HISTOGRAM_CAPACITY)
    }
}
