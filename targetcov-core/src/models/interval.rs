use std::cmp::Ordering::{self};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::IntervalError;

/// Represent a range from [begin, end) on a single contig.
/// Inclusive begin, exclusive of end.
///
/// The bounds are private so that `begin < end` holds for every value that exists;
/// use [`Interval::new`] or [`Interval::with_payload`] to build one.
///
/// Ordering is by `(begin, end)` and equality compares the bounds only, so two intervals
/// covering the same span are equal regardless of what they carry.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "RawInterval<T>",
        bound(deserialize = "T: Deserialize<'de>")
    )
)]
pub struct Interval<T = ()> {
    begin: i64,
    end: i64,
    payload: Option<T>,
}

/// Unchecked wire form; every deserialized interval goes through [`Interval::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawInterval<T> {
    begin: i64,
    end: i64,
    payload: Option<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawInterval<T>> for Interval<T> {
    type Error = IntervalError;

    fn try_from(raw: RawInterval<T>) -> Result<Self, Self::Error> {
        let mut interval = Interval::new(raw.begin, raw.end)?;
        interval.payload = raw.payload;
        Ok(interval)
    }
}

impl<T> Interval<T> {
    /// Create an interval without a payload.
    ///
    /// ```
    /// use targetcov_core::models::Interval;
    ///
    /// let iv: Interval = Interval::new(10, 20).unwrap();
    /// assert_eq!(iv.len(), 10);
    /// assert!(Interval::<()>::new(20, 20).is_err());
    /// ```
    pub fn new(begin: i64, end: i64) -> Result<Self, IntervalError> {
        if begin >= end {
            return Err(IntervalError::InvalidBounds { begin, end });
        }
        Ok(Interval {
            begin,
            end,
            payload: None,
        })
    }

    /// Create an interval carrying `payload`.
    pub fn with_payload(begin: i64, end: i64, payload: T) -> Result<Self, IntervalError> {
        let mut interval = Self::new(begin, end)?;
        interval.payload = Some(payload);
        Ok(interval)
    }

    #[inline]
    pub fn begin(&self) -> i64 {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> i64 {
        self.end
    }

    #[inline]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Take the payload out, leaving the bounds.
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Number of positions covered. Always positive.
    #[inline]
    pub fn len(&self) -> i64 {
        self.end - self.begin
    }

    /// Always false; an interval covers at least one position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `pos` falls inside [begin, end)
    #[inline]
    pub fn contains(&self, pos: i64) -> bool {
        self.begin <= pos && pos < self.end
    }

    /// Two intervals intersect iff `max(begin) < min(end)`.
    #[inline]
    pub fn intersects<U>(&self, other: &Interval<U>) -> bool {
        self.begin.max(other.begin) < self.end.min(other.end)
    }

    /// Compute the length of the intersection between two intervals, zero when disjoint.
    #[inline]
    pub fn overlap_len<U>(&self, other: &Interval<U>) -> i64 {
        (self.end.min(other.end) - self.begin.max(other.begin)).max(0)
    }

    /// Grow this interval to the spanning union `[min(begin), max(end))` of itself and `other`,
    /// replacing the payload with `payload`.
    pub(crate) fn absorb<U>(&mut self, other: &Interval<U>, payload: Option<T>) {
        self.begin = self.begin.min(other.begin);
        self.end = self.end.max(other.end);
        self.payload = payload;
    }

    /// Split into bounds and payload, for callers that combine payloads themselves.
    pub(crate) fn take_payload(&mut self) -> Option<T> {
        self.payload.take()
    }

    /// Same bounds, payload transformed by `f`.
    pub fn map_payload<U, F>(self, f: F) -> Interval<U>
    where
        F: FnOnce(T) -> U,
    {
        Interval {
            begin: self.begin,
            end: self.end,
            payload: self.payload.map(f),
        }
    }

    /// Same bounds, no payload. Handy for building queries from stored intervals.
    pub fn bounds(&self) -> Interval<()> {
        Interval {
            begin: self.begin,
            end: self.end,
            payload: None,
        }
    }
}

impl<T> Interval<T> {
    /// Merge `next` into `self` with the payload chosen by `combine(previous, next)`.
    pub fn union_with<F>(&mut self, mut next: Interval<T>, combine: F)
    where
        F: FnOnce(Option<T>, Option<T>) -> Option<T>,
    {
        let previous = self.take_payload();
        let incoming = next.take_payload();
        let payload = combine(previous, incoming);
        self.absorb(&next, payload);
    }
}

impl<T> Ord for Interval<T> {
    #[inline]
    fn cmp(&self, other: &Interval<T>) -> Ordering {
        match self.begin.cmp(&other.begin) {
            Ordering::Less => Ordering::Less,
            Ordering::Greater => Ordering::Greater,
            Ordering::Equal => self.end.cmp(&other.end),
        }
    }
}

impl<T> PartialOrd for Interval<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Interval<T> {
    #[inline]
    fn eq(&self, other: &Interval<T>) -> bool {
        self.begin == other.begin && self.end == other.end
    }
}

impl<T> Eq for Interval<T> {}

impl<T> Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}
