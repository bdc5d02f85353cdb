use crate::errors::IntervalError;
use crate::models::Interval;

///
/// One `(contig, begin, end, payload)` tuple as produced by an interval reader,
/// before it has been validated into an [`Interval`].
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord<T = ()> {
    pub contig: String,
    pub begin: i64,
    pub end: i64,
    pub payload: Option<T>,

    /// Source line, when the record came from a file.
    pub line: Option<usize>,
}

impl<T> IntervalRecord<T> {
    pub fn new(contig: impl Into<String>, begin: i64, end: i64, payload: Option<T>) -> Self {
        IntervalRecord {
            contig: contig.into(),
            begin,
            end,
            payload,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    ///
    /// Validate the bounds and split into the contig name and an [`Interval`].
    ///
    /// Fails with [`IntervalError::MalformedInterval`] naming the contig and line when
    /// `begin >= end`.
    ///
    pub fn into_interval(self) -> Result<(String, Interval<T>), IntervalError> {
        let IntervalRecord {
            contig,
            begin,
            end,
            payload,
            line,
        } = self;

        let interval = match payload {
            Some(p) => Interval::with_payload(begin, end, p),
            None => Interval::new(begin, end),
        };

        match interval {
            Ok(interval) => Ok((contig, interval)),
            Err(_) => Err(IntervalError::MalformedInterval {
                contig,
                begin: begin.to_string(),
                end: end.to_string(),
                line,
            }),
        }
    }
}
