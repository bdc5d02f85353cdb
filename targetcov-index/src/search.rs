//! Binary searches over interval lists sorted by `begin`.
//!
//! Only the `begin` coordinate is searched. The answers are meaningful for range queries only
//! when the list is pairwise non-overlapping; see [`crate::IntervalIndex::is_disjoint`].

use targetcov_core::models::Interval;

/// Binary search for the insertion position of `key` among the `begin` values of `intervals`.
///
/// Returns the index where an interval beginning at `key` should be inserted to maintain sort
/// order:
/// - `0` if the key should be inserted at the beginning
/// - `intervals.len()` if the key should be inserted at the end
/// - Otherwise, the first index where `intervals[index].begin() >= key`
#[inline]
pub fn insertion_point<T>(key: i64, intervals: &[Interval<T>]) -> usize {
    if intervals.is_empty() || intervals[0].begin() >= key {
        return 0;
    } else if intervals[intervals.len() - 1].begin() < key {
        return intervals.len();
    }

    let mut cursor = 0;
    let mut length = intervals.len();
    while length > 1 {
        let half = length >> 1;
        length -= half;
        cursor += (usize::from(intervals[cursor + half - 1].begin() < key)) * half;
    }
    cursor
}

/// Look for an interval beginning exactly at `key`.
///
/// `Ok(index)` on an exact match, otherwise `Err(insertion_point)`, mirroring
/// [`slice::binary_search`].
#[inline]
pub fn find_begin<T>(key: i64, intervals: &[Interval<T>]) -> Result<usize, usize> {
    let ip = insertion_point(key, intervals);
    match intervals.get(ip) {
        Some(iv) if iv.begin() == key => Ok(ip),
        _ => Err(ip),
    }
}

/// Index of the last interval with `begin <= point`, or `None` when `point` precedes every
/// interval.
#[inline]
pub fn left_neighbor<T>(point: i64, intervals: &[Interval<T>]) -> Option<usize> {
    match find_begin(point, intervals) {
        Ok(idx) => Some(idx),
        Err(ip) => ip.checked_sub(1),
    }
}

/// First and last indices of the intervals intersecting `[query_begin, query_end)`.
///
/// The first candidate is the interval beginning at `query_begin`, else its left neighbour when
/// `query_begin` falls inside it, else the neighbour's successor. The last candidate is the
/// left neighbour of `query_end - 1`. An empty span (`first > last`) means no intersection.
/// Because a disjoint list is sorted on both ends, everything between the two is an
/// intersecting interval.
pub fn intersecting_span<T>(
    query_begin: i64,
    query_end: i64,
    intervals: &[Interval<T>],
) -> Option<(usize, usize)> {
    if intervals.is_empty() {
        return None;
    }

    let first = match find_begin(query_begin, intervals) {
        Ok(idx) => idx,
        Err(ip) => match ip.checked_sub(1) {
            Some(k) if query_begin < intervals[k].end() => k,
            _ => ip,
        },
    };
    let last = left_neighbor(query_end - 1, intervals)?;

    (first <= last).then_some((first, last))
}
