use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use fxhash::FxHashMap;

use targetcov_core::IntervalError;
use targetcov_core::models::Interval;

use crate::window::{AlignmentWindow, WindowError, WindowFactory};

///
/// Aligned read spans held in memory, keyed by contig.
///
/// Each read is the reference span it covers. The store is a [`WindowFactory`]: every call to
/// `open` hands out an independent [`ReadSpanWindow`] sharing the same read data.
///
#[derive(Debug, Clone, Default)]
pub struct ReadSpanStore {
    reads: Arc<FxHashMap<String, Vec<Interval>>>,
}

impl ReadSpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one read covering `[begin, end)` on `contig`.
    pub fn add_read(&mut self, contig: &str, begin: i64, end: i64) -> Result<(), IntervalError> {
        let read = Interval::new(begin, end)?;
        self.add_reads(contig, [read]);
        Ok(())
    }

    /// Add a batch of reads on `contig`. The contig's reads are kept sorted by begin.
    pub fn add_reads<I>(&mut self, contig: &str, reads: I)
    where
        I: IntoIterator<Item = Interval>,
    {
        let contigs = Arc::make_mut(&mut self.reads);
        let list = contigs.entry(contig.to_string()).or_default();
        list.extend(reads);
        list.sort();
    }

    pub fn read_count(&self, contig: &str) -> usize {
        self.reads.get(contig).map_or(0, Vec::len)
    }

    /// A window over this store, not yet positioned.
    pub fn window(&self) -> ReadSpanWindow {
        ReadSpanWindow {
            reads: Arc::clone(&self.reads),
            contig: None,
            pos: 0,
            next_read: 0,
            active_ends: BinaryHeap::new(),
            closed: false,
        }
    }
}

impl WindowFactory for ReadSpanStore {
    type Window = ReadSpanWindow;

    fn open(&self, _contig: &str) -> Result<ReadSpanWindow, WindowError> {
        Ok(self.window())
    }
}

///
/// Sweep-line cursor over a [`ReadSpanStore`].
///
/// Reads are entered as the cursor passes their begin and retired once the cursor reaches
/// their end, so moving forward costs time proportional to the reads passed. Moving backward
/// or switching contig restarts the sweep from the contig's first read.
///
#[derive(Debug)]
pub struct ReadSpanWindow {
    reads: Arc<FxHashMap<String, Vec<Interval>>>,
    contig: Option<String>,
    pos: i64,
    next_read: usize,
    // ends of reads overlapping `pos`; min-heap
    active_ends: BinaryHeap<Reverse<i64>>,
    closed: bool,
}

impl ReadSpanWindow {
    fn current_reads(&self) -> &[Interval] {
        self.contig
            .as_deref()
            .and_then(|contig| self.reads.get(contig))
            .map_or(&[][..], Vec::as_slice)
    }

    fn ensure_open(&self) -> Result<(), WindowError> {
        if self.closed {
            return Err(WindowError::Misuse("window used after close".to_string()));
        }
        Ok(())
    }

    fn restart(&mut self, contig: &str) {
        self.contig = Some(contig.to_string());
        self.next_read = 0;
        self.active_ends.clear();
    }

    fn sweep(&mut self) {
        let reads = Arc::clone(&self.reads);
        let list = self
            .contig
            .as_deref()
            .and_then(|contig| reads.get(contig))
            .map_or(&[][..], Vec::as_slice);

        while let Some(read) = list.get(self.next_read) {
            if read.begin() > self.pos {
                break;
            }
            if read.end() > self.pos {
                self.active_ends.push(Reverse(read.end()));
            }
            self.next_read += 1;
        }

        while let Some(&Reverse(end)) = self.active_ends.peek() {
            if end > self.pos {
                break;
            }
            self.active_ends.pop();
        }
    }
}

impl AlignmentWindow for ReadSpanWindow {
    fn advance_to(&mut self, contig: &str, pos: i64) -> Result<(), WindowError> {
        self.ensure_open()?;
        if self.contig.as_deref() != Some(contig) || pos < self.pos {
            self.restart(contig);
        }
        self.pos = pos;
        self.sweep();
        Ok(())
    }

    fn advance_by(&mut self, n: i64) -> Result<bool, WindowError> {
        self.ensure_open()?;
        if self.contig.is_none() {
            return Err(WindowError::Misuse(
                "advance_by called before advance_to".to_string(),
            ));
        }
        if n < 0 {
            return Err(WindowError::Misuse(format!(
                "cannot advance backwards by {n}"
            )));
        }
        self.pos += n;
        self.sweep();
        Ok(self.has_more_reads_in_current_contig())
    }

    fn size(&self) -> u32 {
        u32::try_from(self.active_ends.len()).unwrap_or(u32::MAX)
    }

    fn has_more_reads_in_current_contig(&self) -> bool {
        !self.active_ends.is_empty() || self.next_read < self.current_reads().len()
    }

    fn close(&mut self) -> Result<(), WindowError> {
        if self.closed {
            return Err(WindowError::Misuse("window closed twice".to_string()));
        }
        self.closed = true;
        self.active_ends.clear();
        Ok(())
    }
}
