use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use targetcov_core::IntervalError;
use targetcov_core::models::IntervalRecord;
use targetcov_core::utils::get_dynamic_reader;
use targetcov_index::IntervalIndex;

use crate::error::{IntervalIoError, Result};
use crate::kind::IntervalFileKind;

/// What to do with a line that cannot be turned into an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Stop reading and return the error.
    #[default]
    Fail,
    /// Log a warning naming the line and keep going.
    SkipAndWarn,
}

fn malformed(contig: &str, begin: &str, end: &str, line: usize) -> IntervalIoError {
    IntervalIoError::Malformed(IntervalError::MalformedInterval {
        contig: contig.to_string(),
        begin: begin.to_string(),
        end: end.to_string(),
        line: Some(line),
    })
}

///
/// Parse one line of an interval file.
///
/// Returns `Ok(None)` for blank, comment and header lines. Coordinates are converted to
/// 0-based half-open and checked for `begin < end`; the name column, when present, becomes the
/// payload.
///
/// # Arguments
/// - line: the raw line
/// - kind: which dialect the line is in
/// - line_no: 1-based line number, reported in errors
///
pub fn parse_interval_line(
    line: &str,
    kind: IntervalFileKind,
    line_no: usize,
) -> Result<Option<IntervalRecord<String>>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || kind.is_header(trimmed) {
        return Ok(None);
    }

    let fields = kind.split(trimmed);
    if fields.len() < 3 {
        return Err(IntervalIoError::MissingColumns {
            line: line_no,
            found: fields.len(),
        });
    }

    let (contig, raw_begin, raw_end) = (fields[0], fields[1], fields[2]);
    let (Ok(begin), Ok(end)) = (raw_begin.parse::<i64>(), raw_end.parse::<i64>()) else {
        return Err(malformed(contig, raw_begin, raw_end, line_no));
    };

    let Some((begin, end)) = kind.to_half_open(begin, end).filter(|(b, e)| b < e) else {
        return Err(malformed(contig, raw_begin, raw_end, line_no));
    };

    let payload = fields
        .get(kind.name_column())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string());

    Ok(Some(
        IntervalRecord::new(contig, begin, end, payload).at_line(line_no),
    ))
}

///
/// Read every interval record from a (possibly gzipped) interval file.
///
/// # Arguments
/// - path: the file to read
/// - kind: the dialect, see [`IntervalFileKind::from_path`] to infer it
/// - policy: whether malformed lines abort the read or are skipped with a warning
///
pub fn read_interval_records(
    path: &Path,
    kind: IntervalFileKind,
    policy: MalformedLinePolicy,
) -> Result<Vec<IntervalRecord<String>>> {
    let reader = get_dynamic_reader(path).map_err(IntervalIoError::Open)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_no = idx + 1;

        let parsed = String::from_utf8(bytes)
            .map_err(|_| IntervalIoError::InvalidUtf8 { line: line_no })
            .and_then(|line| parse_interval_line(&line, kind, line_no));

        match parsed {
            Ok(Some(record)) => records.push(record),
            Ok(None) => continue,
            Err(err) => match policy {
                MalformedLinePolicy::Fail => return Err(err),
                MalformedLinePolicy::SkipAndWarn => {
                    warn!("Skipping line {line_no} of {}: {err}", path.display());
                    skipped += 1;
                }
            },
        }
    }

    debug!(
        "Read {} interval(s) from {} ({} skipped)",
        records.len(),
        path.display(),
        skipped
    );

    Ok(records)
}

///
/// Read an interval file straight into an [`IntervalIndex`].
///
/// With `merge` set, overlapping and touching intervals are unioned per contig, which is what
/// point and range queries expect.
///
pub fn load_interval_index(
    path: &Path,
    kind: IntervalFileKind,
    policy: MalformedLinePolicy,
    merge: bool,
) -> Result<IntervalIndex<String>> {
    let records = read_interval_records(path, kind, policy)?;
    Ok(IntervalIndex::from_records(records, merge)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# comment")]
    #[case("track name=targets")]
    #[case("browser position chr1:1-100")]
    fn test_bed_skips_headers(#[case] line: &str) {
        let parsed = parse_interval_line(line, IntervalFileKind::Bed, 1).unwrap();
        assert_eq!(parsed, None);
    }

    #[rstest]
    fn test_bed_line_with_name() {
        let record = parse_interval_line("chr1\t100\t200\texon1\t0\t+", IntervalFileKind::Bed, 3)
            .unwrap()
            .unwrap();
        assert_eq!(
            record,
            IntervalRecord::new("chr1", 100, 200, Some("exon1".to_string())).at_line(3)
        );
    }

    #[rstest]
    fn test_interval_list_line() {
        let kind = IntervalFileKind::IntervalList;
        assert_eq!(parse_interval_line("@SQ\tSN:chr1\tLN:1000", kind, 1).unwrap(), None);

        let record = parse_interval_line("chr1\t101\t200\t+\ttarget_1", kind, 2)
            .unwrap()
            .unwrap();
        assert_eq!((record.begin, record.end), (100, 200));
        assert_eq!(record.payload.as_deref(), Some("target_1"));
    }

    #[rstest]
    fn test_single_base_interval_list_entry() {
        let record = parse_interval_line("chr1\t5\t5", IntervalFileKind::IntervalList, 1)
            .unwrap()
            .unwrap();
        assert_eq!((record.begin, record.end), (4, 5));
    }

    #[rstest]
    #[case("chr1\tabc\t200")]
    #[case("chr1\t200\t100")]
    #[case("chr1\t100\t100")]
    fn test_malformed_bounds(#[case] line: &str) {
        let err = parse_interval_line(line, IntervalFileKind::Bed, 9).unwrap_err();
        assert!(matches!(
            err,
            IntervalIoError::Malformed(IntervalError::MalformedInterval { line: Some(9), .. })
        ));
    }

    #[rstest]
    fn test_interval_list_begin_at_i64_min_is_malformed() {
        let line = format!("chr1\t{}\t10", i64::MIN);
        let err = parse_interval_line(&line, IntervalFileKind::IntervalList, 5).unwrap_err();
        assert!(matches!(
            err,
            IntervalIoError::Malformed(IntervalError::MalformedInterval { line: Some(5), .. })
        ));
    }

    #[rstest]
    fn test_malformed_keeps_raw_text() {
        let err = parse_interval_line("chrX\t1O0\t200", IntervalFileKind::Bed, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed interval on contig 'chrX' (line 4): begin=1O0, end=200"
        );
    }

    #[rstest]
    fn test_missing_columns() {
        let err = parse_interval_line("chr1\t100", IntervalFileKind::Bed, 2).unwrap_err();
        assert!(matches!(
            err,
            IntervalIoError::MissingColumns { line: 2, found: 2 }
        ));
    }
}
