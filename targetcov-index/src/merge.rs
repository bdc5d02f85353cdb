use targetcov_core::models::Interval;

/// Payload policy used by [`crate::IntervalIndex::insert_merging`]: the most recently merged
/// interval's payload wins.
pub fn keep_latest<T>(_previous: Option<T>, next: Option<T>) -> Option<T> {
    next
}

/// Single left-to-right merge pass over a list sorted by `begin`.
///
/// Whenever the current interval overlaps or touches the last accepted one, the accepted
/// interval is replaced by the spanning union and its payload by `combine(previous, next)`.
/// Returns the merged list and whether any union happened.
pub fn merge_sorted<T, F>(sorted: Vec<Interval<T>>, mut combine: F) -> (Vec<Interval<T>>, bool)
where
    F: FnMut(Option<T>, Option<T>) -> Option<T>,
{
    let mut merged: Vec<Interval<T>> = Vec::with_capacity(sorted.len());
    let mut any_union = false;

    for interval in sorted {
        match merged.last_mut() {
            Some(previous) if interval.begin() <= previous.end() => {
                previous.union_with(interval, &mut combine);
                any_union = true;
            }
            _ => merged.push(interval),
        }
    }

    (merged, any_union)
}

/// Sort `intervals` and merge them with the default payload policy.
pub fn merge_intervals<T>(mut intervals: Vec<Interval<T>>) -> Vec<Interval<T>> {
    intervals.sort();
    merge_sorted(intervals, keep_latest).0
}

/// True when no two neighbours in a sorted list intersect.
pub fn is_disjoint<T>(sorted: &[Interval<T>]) -> bool {
    sorted.windows(2).all(|w| w[0].end() <= w[1].begin())
}
