use thiserror::Error;

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Invalid interval bounds: begin={begin} must be less than end={end}")]
    InvalidBounds { begin: i64, end: i64 },

    /// Raised at ingestion. `begin` and `end` hold the raw text so that non-numeric
    /// coordinates can be reported as they appeared.
    #[error("Malformed interval on contig '{contig}'{}: begin={begin}, end={end}", line_suffix(.line))]
    MalformedInterval {
        contig: String,
        begin: String,
        end: String,
        line: Option<usize>,
    },
}

pub type Result<T> = std::result::Result<T, IntervalError>;
