//! Summary statistics over a [`DepthHistogram`].
//!
//! All functions are pure and fail only on a histogram with no counted positions.
use thiserror::Error;

use crate::histogram::DepthHistogram;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot compute statistics over an empty histogram")]
    EmptyHistogram,
}

fn nonzero_total(histogram: &DepthHistogram) -> Result<u64, StatsError> {
    match histogram.total() {
        0 => Err(StatsError::EmptyHistogram),
        total => Ok(total),
    }
}

/// Depth of the position at 0-based `rank` when all positions are sorted by depth.
fn depth_at_rank(histogram: &DepthHistogram, rank: u64) -> usize {
    let mut seen = 0u64;
    for (depth, count) in histogram.iter() {
        seen += count;
        if seen > rank {
            return depth;
        }
    }
    histogram.capacity() - 1
}

/// Mean depth over every counted position.
pub fn mean(histogram: &DepthHistogram) -> Result<f64, StatsError> {
    let total = nonzero_total(histogram)?;
    let weighted: u128 = histogram
        .iter()
        .map(|(depth, count)| depth as u128 * count as u128)
        .sum();

    Ok(weighted as f64 / total as f64)
}

///
/// Median depth. With an even number of positions, the two middle depths are averaged.
///
pub fn median(histogram: &DepthHistogram) -> Result<f64, StatsError> {
    let total = nonzero_total(histogram)?;
    let lower = depth_at_rank(histogram, (total - 1) / 2);
    let upper = depth_at_rank(histogram, total / 2);

    Ok((lower + upper) as f64 / 2.0)
}

///
/// Percentage of positions with depth strictly greater than `i`, for each bin `i`.
///
/// `out[i] = 100 - 100 * (count of positions with depth <= i) / total`, so the last element
/// is always zero.
///
pub fn to_cumulative_proportions(histogram: &DepthHistogram) -> Result<Vec<f64>, StatsError> {
    let total = nonzero_total(histogram)? as f64;
    let mut cumulative = 0u64;

    Ok(histogram
        .iter()
        .map(|(_, count)| {
            cumulative += count;
            100.0 - 100.0 * cumulative as f64 / total
        })
        .collect())
}

/// Percentage of positions covered by at least `depth` reads.
pub fn fraction_at_least(histogram: &DepthHistogram, depth: usize) -> Result<f64, StatsError> {
    let total = nonzero_total(histogram)?;
    let covered: u64 = histogram.as_slice().iter().skip(depth).sum();

    Ok(100.0 * covered as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn histogram() -> DepthHistogram {
        // depths: 0 x2, 1 x3, 3 x5
        DepthHistogram::from_counts(vec![2, 3, 0, 5])
    }

    #[rstest]
    fn test_mean(histogram: DepthHistogram) {
        assert_eq!(mean(&histogram).unwrap(), 1.8);
    }

    #[rstest]
    fn test_mean_matches_naive_average(histogram: DepthHistogram) {
        let depths: Vec<f64> = vec![0.0, 0.0, 1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 3.0, 3.0];
        let naive = depths.iter().sum::<f64>() / depths.len() as f64;
        assert!((mean(&histogram).unwrap() - naive).abs() < 1e-12);
    }

    #[rstest]
    #[case(vec![2, 3, 0, 5], 2.0)]
    #[case(vec![0, 1, 1, 1], 2.0)]
    #[case(vec![1, 0, 0, 1], 1.5)]
    #[case(vec![0, 0, 4], 2.0)]
    fn test_median(#[case] counts: Vec<u64>, #[case] expected: f64) {
        let hist = DepthHistogram::from_counts(counts);
        assert_eq!(median(&hist).unwrap(), expected);
    }

    #[rstest]
    fn test_cumulative_proportions(histogram: DepthHistogram) {
        let props = to_cumulative_proportions(&histogram).unwrap();
        assert_eq!(props, vec![80.0, 50.0, 50.0, 0.0]);
        assert_eq!(props[0], 100.0 - 100.0 * 2.0 / 10.0);
    }

    #[rstest]
    #[case(0, 100.0)]
    #[case(1, 80.0)]
    #[case(3, 50.0)]
    #[case(4, 0.0)]
    fn test_fraction_at_least(
        histogram: DepthHistogram,
        #[case] depth: usize,
        #[case] expected: f64,
    ) {
        assert_eq!(fraction_at_least(&histogram, depth).unwrap(), expected);
    }

    #[rstest]
    fn test_empty_histogram_is_an_error() {
        let empty = DepthHistogram::new(10);
        assert_eq!(mean(&empty), Err(StatsError::EmptyHistogram));
        assert_eq!(median(&empty), Err(StatsError::EmptyHistogram));
        assert_eq!(
            to_cumulative_proportions(&empty),
            Err(StatsError::EmptyHistogram)
        );
        assert_eq!(
            fraction_at_least(&empty, 1),
            Err(StatsError::EmptyHistogram)
        );
    }
}
