//! Genome-wide interval index keyed by contig.
//!
//! [`IntervalIndex`] keeps, for every contig, a list of [`Interval`]s sorted by `begin`. Lists
//! built through [`IntervalIndex::insert_merging`] are pairwise non-overlapping, which is what
//! lets point and range queries run as two binary searches over `begin` values.
//!
//! # Examples
//!
//! ```
//! use targetcov_core::models::Interval;
//! use targetcov_index::IntervalIndex;
//!
//! let mut index: IntervalIndex = IntervalIndex::new();
//! index.insert_merging(
//!     "1",
//!     vec![Interval::new(100, 200).unwrap(), Interval::new(300, 400).unwrap()],
//! );
//!
//! assert!(index.contains_point("1", 150));
//! assert!(!index.contains_point("1", 250));
//!
//! let query: Interval = Interval::new(180, 320).unwrap();
//! assert_eq!(index.intersecting_range("1", &query).unwrap(), Some((0, 1)));
//! ```

use fxhash::FxHashMap;
use log::warn;

use targetcov_core::IntervalError;
use targetcov_core::models::{Interval, IntervalRecord};

use crate::errors::{IndexError, Result};
use crate::merge::{is_disjoint, keep_latest, merge_sorted};
use crate::search::{intersecting_span, left_neighbor};

/// What a query does when it names a contig the index has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownContigPolicy {
    /// Emit a `log::warn!` and return the empty result.
    #[default]
    Warn,
    /// Return the empty result quietly.
    Silent,
}

/// The sorted interval list of one contig.
#[derive(Debug, Clone)]
pub struct ContigIntervals<T> {
    name: String,
    intervals: Vec<Interval<T>>,
    /// Whether any union has happened on this list
    was_merged: bool,
    /// Whether no two intervals intersect
    disjoint: bool,
}

impl<T> ContigIntervals<T> {
    fn new(name: &str) -> Self {
        ContigIntervals {
            name: name.to_string(),
            intervals: Vec::new(),
            was_merged: false,
            disjoint: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intervals(&self) -> &[Interval<T>] {
        &self.intervals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn was_merged(&self) -> bool {
        self.was_merged
    }

    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    /// Sum of `end - begin` over the stored intervals.
    pub fn extent(&self) -> i64 {
        self.intervals.iter().map(Interval::len).sum()
    }

    fn merge_with<F>(&mut self, combine: F)
    where
        F: FnMut(Option<T>, Option<T>) -> Option<T>,
    {
        let mut intervals = std::mem::take(&mut self.intervals);
        intervals.sort();
        let (merged, any_union) = merge_sorted(intervals, combine);
        self.intervals = merged;
        self.was_merged |= any_union;
        self.disjoint = true;
    }

    /// [`IndexError::InvalidQuery`] naming `operation` if the list still holds overlaps.
    pub fn require_disjoint(&self, operation: &str) -> Result<()> {
        if self.disjoint {
            Ok(())
        } else {
            Err(IndexError::InvalidQuery(format!(
                "{operation} on contig '{}' requires non-overlapping intervals; merge the contig first",
                self.name
            )))
        }
    }
}

/// An in-memory index over sets of genomic intervals, one sorted list per contig.
///
/// The index is built once and then read. Queries take `&self`, so a built index can be shared
/// across threads freely; mutation needs `&mut self` and therefore cannot overlap with readers.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T = ()> {
    contigs: Vec<ContigIntervals<T>>,
    lookup: FxHashMap<String, usize>,
    unknown_contig_policy: UnknownContigPolicy,
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        IntervalIndex {
            contigs: Vec::new(),
            lookup: FxHashMap::default(),
            unknown_contig_policy: UnknownContigPolicy::default(),
        }
    }
}

impl<T> IntervalIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_contig_policy(mut self, policy: UnknownContigPolicy) -> Self {
        self.unknown_contig_policy = policy;
        self
    }

    pub fn set_unknown_contig_policy(&mut self, policy: UnknownContigPolicy) {
        self.unknown_contig_policy = policy;
    }

    ///
    /// Build an index from raw ingestion records.
    ///
    /// Contigs keep the order in which they first appear. The first malformed record aborts the
    /// build with [`IntervalError::MalformedInterval`]. If `merge` is false the lists are only
    /// sorted, as with [`IntervalIndex::bulk_load`].
    ///
    pub fn from_records<I>(records: I, merge: bool) -> std::result::Result<Self, IntervalError>
    where
        I: IntoIterator<Item = IntervalRecord<T>>,
    {
        let mut grouped: Vec<(String, Vec<Interval<T>>)> = Vec::new();
        let mut slots: FxHashMap<String, usize> = FxHashMap::default();

        for record in records {
            let (contig, interval) = record.into_interval()?;
            let slot = match slots.get(&contig) {
                Some(&slot) => slot,
                None => {
                    slots.insert(contig.clone(), grouped.len());
                    grouped.push((contig, Vec::new()));
                    grouped.len() - 1
                }
            };
            grouped[slot].1.push(interval);
        }

        let mut index = IntervalIndex::new();
        for (contig, intervals) in grouped {
            if merge {
                index.insert_merging(&contig, intervals);
            } else {
                index.bulk_load(&contig, intervals);
            }
        }
        Ok(index)
    }

    fn entry(&mut self, contig: &str) -> &mut ContigIntervals<T> {
        let slot = match self.lookup.get(contig) {
            Some(&slot) => slot,
            None => {
                self.lookup.insert(contig.to_string(), self.contigs.len());
                self.contigs.push(ContigIntervals::new(contig));
                self.contigs.len() - 1
            }
        };
        &mut self.contigs[slot]
    }

    ///
    /// Append `intervals` to the contig's list, re-sort by `begin`, and merge every overlapping
    /// or touching pair into its spanning union. The most recently merged payload wins.
    ///
    /// Merging an already merged list is a no-op.
    ///
    pub fn insert_merging<I>(&mut self, contig: &str, intervals: I)
    where
        I: IntoIterator<Item = Interval<T>>,
    {
        self.insert_merging_with(contig, intervals, keep_latest);
    }

    /// [`IntervalIndex::insert_merging`] with a caller-supplied payload policy,
    /// `combine(previous, next)`.
    pub fn insert_merging_with<I, F>(&mut self, contig: &str, intervals: I, combine: F)
    where
        I: IntoIterator<Item = Interval<T>>,
        F: FnMut(Option<T>, Option<T>) -> Option<T>,
    {
        let list = self.entry(contig);
        list.intervals.extend(intervals);
        list.merge_with(combine);
    }

    ///
    /// Append `intervals` to the contig's list and re-sort, without merging.
    ///
    /// The list may end up holding overlaps. Point queries on such a list fall back to a
    /// linear scan; index-range and nearest queries refuse it with
    /// [`IndexError::InvalidQuery`] until the contig is merged.
    ///
    pub fn bulk_load<I>(&mut self, contig: &str, intervals: I)
    where
        I: IntoIterator<Item = Interval<T>>,
    {
        let list = self.entry(contig);
        list.intervals.extend(intervals);
        list.intervals.sort();
        list.disjoint = is_disjoint(&list.intervals);
    }

    /// Run the merge pass over one contig. Returns false if the contig is unknown.
    pub fn merge_contig(&mut self, contig: &str) -> bool {
        match self.lookup.get(contig) {
            Some(&slot) => {
                self.contigs[slot].merge_with(keep_latest);
                true
            }
            None => false,
        }
    }

    /// Run the merge pass over every contig.
    pub fn merge_all(&mut self) {
        for list in self.contigs.iter_mut() {
            list.merge_with(keep_latest);
        }
    }

    /// Look up a contig for a query, applying the unknown-contig policy on a miss.
    fn query_list(&self, contig: &str) -> Option<&ContigIntervals<T>> {
        let list = self.lookup.get(contig).map(|&slot| &self.contigs[slot]);
        if list.is_none() && self.unknown_contig_policy == UnknownContigPolicy::Warn {
            warn!("Contig '{contig}' is not present in the interval index");
        }
        list
    }

    ///
    /// Check whether any stored interval on `contig` contains `pos`.
    ///
    /// An unknown contig gives `false`.
    ///
    pub fn contains_point(&self, contig: &str, pos: i64) -> bool {
        let Some(list) = self.query_list(contig) else {
            return false;
        };
        if !list.disjoint {
            return list.intervals.iter().any(|iv| iv.contains(pos));
        }

        // the left neighbour is the exact match at pos when one exists, so `pos < end`
        // answers both cases
        match left_neighbor(pos, &list.intervals) {
            Some(k) => pos < list.intervals[k].end(),
            None => false,
        }
    }

    /// Check whether any stored interval on `contig` intersects `query`.
    pub fn intersects_range<U>(&self, contig: &str, query: &Interval<U>) -> bool {
        let Some(list) = self.query_list(contig) else {
            return false;
        };
        if !list.disjoint {
            return list.intervals.iter().any(|iv| iv.intersects(query));
        }
        intersecting_span(query.begin(), query.end(), &list.intervals).is_some()
    }

    ///
    /// The contiguous index range `[first, last]` of intervals intersecting `query`, or `None`.
    ///
    /// Unknown contigs give `Ok(None)`. A contig list that still holds overlaps gives
    /// [`IndexError::InvalidQuery`], since its intersecting set need not be contiguous.
    ///
    pub fn intersecting_range<U>(
        &self,
        contig: &str,
        query: &Interval<U>,
    ) -> Result<Option<(usize, usize)>> {
        let Some(list) = self.query_list(contig) else {
            return Ok(None);
        };
        list.require_disjoint("intersecting_range")?;
        Ok(intersecting_span(query.begin(), query.end(), &list.intervals))
    }

    /// The intervals intersecting `query`, as a slice of the contig's list.
    pub fn intersecting<U>(&self, contig: &str, query: &Interval<U>) -> Result<&[Interval<T>]> {
        let Some(list) = self.query_list(contig) else {
            return Ok(&[][..]);
        };
        list.require_disjoint("intersecting")?;
        let hits = match intersecting_span(query.begin(), query.end(), &list.intervals) {
            Some((first, last)) => &list.intervals[first..=last],
            None => &list.intervals[..0],
        };
        Ok(hits)
    }

    ///
    /// Indices of the intervals flanking a query that intersects nothing, nearer one first.
    ///
    /// A query before the first interval gives `[0]`, one after the last gives `[len - 1]`.
    /// Otherwise the left gap `|qb - left.end|` is compared with the right gap
    /// `|right.begin - qe|` and ties favour the left neighbour.
    ///
    /// Calling this for a query that does intersect is a programming error and gives
    /// [`IndexError::InvalidQuery`]. Unknown contigs give an empty vector.
    ///
    pub fn nearest<U>(&self, contig: &str, query: &Interval<U>) -> Result<Vec<usize>> {
        let Some(list) = self.query_list(contig) else {
            return Ok(Vec::new());
        };
        list.require_disjoint("nearest")?;

        let intervals = &list.intervals;
        if intervals.is_empty() {
            return Ok(Vec::new());
        }

        let (qb, qe) = (query.begin(), query.end());
        if intersecting_span(qb, qe, intervals).is_some() {
            return Err(IndexError::InvalidQuery(format!(
                "nearest called for query {query} which intersects intervals on contig '{contig}'"
            )));
        }

        let last = intervals.len() - 1;
        if qe <= intervals[0].begin() {
            return Ok(vec![0]);
        }
        if qb >= intervals[last].end() {
            return Ok(vec![last]);
        }

        let left = left_neighbor(qb, intervals).unwrap_or(0).min(last);
        let right = (left_neighbor(qe - 1, intervals).unwrap_or(0) + 1).min(last);

        let gap_left = (qb - intervals[left].end()).abs();
        let gap_right = (intervals[right].begin() - qe).abs();

        if gap_left <= gap_right {
            Ok(vec![left, right])
        } else {
            Ok(vec![right, left])
        }
    }

    /// Sum of `end - begin` over one contig; zero for an unknown contig.
    pub fn extent(&self, contig: &str) -> i64 {
        self.query_list(contig).map_or(0, ContigIntervals::extent)
    }

    /// Sum of `end - begin` over every contig.
    pub fn total_extent(&self) -> i64 {
        self.contigs.iter().map(ContigIntervals::extent).sum()
    }

    /// Number of intervals stored for one contig; zero for an unknown contig.
    pub fn interval_count(&self, contig: &str) -> usize {
        self.query_list(contig).map_or(0, ContigIntervals::len)
    }

    /// Number of intervals stored across every contig.
    pub fn total_interval_count(&self) -> usize {
        self.contigs.iter().map(ContigIntervals::len).sum()
    }

    /// Contigs in the order they were first inserted.
    pub fn contigs(&self) -> impl Iterator<Item = &ContigIntervals<T>> {
        self.contigs.iter()
    }

    pub fn contig_names(&self) -> impl Iterator<Item = &str> {
        self.contigs.iter().map(ContigIntervals::name)
    }

    pub fn contains_contig(&self, contig: &str) -> bool {
        self.lookup.contains_key(contig)
    }

    /// The sorted interval list of one contig, if present.
    pub fn intervals(&self, contig: &str) -> Option<&[Interval<T>]> {
        self.lookup
            .get(contig)
            .map(|&slot| self.contigs[slot].intervals())
    }

    /// Like [`IntervalIndex::intervals`], failing with [`IndexError::UnknownContig`].
    pub fn try_intervals(&self, contig: &str) -> Result<&[Interval<T>]> {
        self.intervals(contig)
            .ok_or_else(|| IndexError::UnknownContig(contig.to_string()))
    }

    pub fn was_merged(&self, contig: &str) -> bool {
        self.lookup
            .get(contig)
            .is_some_and(|&slot| self.contigs[slot].was_merged)
    }

    pub fn is_disjoint(&self, contig: &str) -> bool {
        self.lookup
            .get(contig)
            .is_some_and(|&slot| self.contigs[slot].disjoint)
    }

    /// Number of contigs
    #[inline]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}
