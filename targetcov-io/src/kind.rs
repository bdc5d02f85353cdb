use std::path::Path;
use std::str::FromStr;

use targetcov_core::utils::inner_extension;

use crate::error::IntervalIoError;

/// The dialect of an interval file. Each dialect knows its own comment syntax, column layout
/// and coordinate convention; everything it yields is 0-based half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalFileKind {
    /// `contig  begin  end  [name ...]`, 0-based half-open, whitespace separated.
    /// `#`, `track` and `browser` lines are skipped.
    Bed,
    /// `contig  start  end  strand  name`, 1-based closed, tab separated.
    /// `@` header lines are skipped.
    IntervalList,
}

impl IntervalFileKind {
    ///
    /// Determine the kind of an interval file based on its extension.
    /// A trailing `.gz` is ignored.
    ///
    pub fn from_path(path: &Path) -> Result<Self, IntervalIoError> {
        inner_extension(path)
            .and_then(|ext| ext.parse().ok())
            .ok_or_else(|| IntervalIoError::UnknownFileKind(path.to_path_buf()))
    }

    /// Column holding the interval name, used as the payload.
    pub(crate) fn name_column(&self) -> usize {
        match self {
            IntervalFileKind::Bed => 3,
            IntervalFileKind::IntervalList => 4,
        }
    }

    pub(crate) fn is_header(&self, line: &str) -> bool {
        match self {
            IntervalFileKind::Bed => {
                line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
            }
            IntervalFileKind::IntervalList => line.starts_with('@') || line.starts_with('#'),
        }
    }

    pub(crate) fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            IntervalFileKind::Bed => line.split_whitespace().collect(),
            IntervalFileKind::IntervalList => line.split('\t').map(str::trim).collect(),
        }
    }

    /// Convert the file's coordinates to 0-based half-open. `None` if the shift overflows.
    pub(crate) fn to_half_open(&self, begin: i64, end: i64) -> Option<(i64, i64)> {
        match self {
            IntervalFileKind::Bed => Some((begin, end)),
            IntervalFileKind::IntervalList => Some((begin.checked_sub(1)?, end)),
        }
    }
}

impl FromStr for IntervalFileKind {
    type Err = IntervalIoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(IntervalFileKind::Bed),
            "interval_list" | "intervals" => Ok(IntervalFileKind::IntervalList),
            _ => Err(IntervalIoError::UnknownFileKind(s.into())),
        }
    }
}
