use std::ops::{Deref, DerefMut};

use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to decode alignment data on contig '{contig}': {message}")]
    Decode { contig: String, message: String },
    #[error("Alignment window misuse: {0}")]
    Misuse(String),
}

///
/// A cursor over aligned reads on one contig at a time.
///
/// The cursor only moves forward within a contig. After `advance_to` or `advance_by`,
/// `size()` is the number of reads overlapping the cursor position. Implementations hold
/// their own cursor state, so one window must never be driven by two tasks.
///
pub trait AlignmentWindow {
    /// Reposition the cursor at `pos` on `contig`.
    fn advance_to(&mut self, contig: &str, pos: i64) -> Result<(), WindowError>;

    /// Move the cursor `n` positions forward. Returns `false` once no read overlaps
    /// the cursor or lies ahead of it on the current contig.
    fn advance_by(&mut self, n: i64) -> Result<bool, WindowError>;

    /// Number of reads overlapping the cursor.
    fn size(&self) -> u32;

    fn has_more_reads_in_current_contig(&self) -> bool;

    /// Release whatever the window holds. Called exactly once per window.
    fn close(&mut self) -> Result<(), WindowError>;
}

///
/// Hands out independent windows, one per scanning task.
///
/// Any `Fn(&str) -> Result<W, WindowError> + Sync` closure is a factory.
///
pub trait WindowFactory: Sync {
    type Window: AlignmentWindow;

    fn open(&self, contig: &str) -> Result<Self::Window, WindowError>;
}

impl<F, W> WindowFactory for F
where
    F: Fn(&str) -> Result<W, WindowError> + Sync,
    W: AlignmentWindow,
{
    type Window = W;

    fn open(&self, contig: &str) -> Result<W, WindowError> {
        self(contig)
    }
}

///
/// Owns a window and closes it exactly once.
///
/// [`WindowGuard::finish`] closes the window and reports the result. A guard dropped
/// without `finish` (an early return or a `?` on some other error) still closes the
/// window; that close error is only logged, since the caller already has an error to report.
///
pub struct WindowGuard<W: AlignmentWindow> {
    window: W,
    closed: bool,
}

impl<W: AlignmentWindow> WindowGuard<W> {
    pub fn new(window: W) -> Self {
        WindowGuard {
            window,
            closed: false,
        }
    }

    pub fn finish(mut self) -> Result<(), WindowError> {
        self.closed = true;
        self.window.close()
    }
}

impl<W: AlignmentWindow> Deref for WindowGuard<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.window
    }
}

impl<W: AlignmentWindow> DerefMut for WindowGuard<W> {
    fn deref_mut(&mut self) -> &mut W {
        &mut self.window
    }
}

impl<W: AlignmentWindow> Drop for WindowGuard<W> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.window.close() {
            debug!("Ignoring close failure on an abandoned window: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct CountingWindow {
        closes: Arc<AtomicUsize>,
        fail_close: bool,
    }

    impl AlignmentWindow for CountingWindow {
        fn advance_to(&mut self, _contig: &str, _pos: i64) -> Result<(), WindowError> {
            Ok(())
        }

        fn advance_by(&mut self, _n: i64) -> Result<bool, WindowError> {
            Ok(false)
        }

        fn size(&self) -> u32 {
            0
        }

        fn has_more_reads_in_current_contig(&self) -> bool {
            false
        }

        fn close(&mut self) -> Result<(), WindowError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(WindowError::Misuse("close failed".to_string()));
            }
            Ok(())
        }
    }

    fn counting(fail_close: bool) -> (CountingWindow, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let window = CountingWindow {
            closes: Arc::clone(&closes),
            fail_close,
        };
        (window, closes)
    }

    #[rstest]
    fn test_finish_closes_once() {
        let (window, closes) = counting(false);
        let guard = WindowGuard::new(window);
        guard.finish().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_drop_closes_once() {
        let (window, closes) = counting(false);
        {
            let mut guard = WindowGuard::new(window);
            guard.advance_to("chr1", 10).unwrap();
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_finish_reports_close_error() {
        let (window, closes) = counting(true);
        let result = WindowGuard::new(window).finish();
        assert!(matches!(result, Err(WindowError::Misuse(_))));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_closure_is_a_factory() {
        let closes = Arc::new(AtomicUsize::new(0));
        let factory = |_contig: &str| {
            Ok::<_, WindowError>(CountingWindow {
                closes: Arc::clone(&closes),
                fail_close: false,
            })
        };
        let window = factory.open("chr1").unwrap();
        WindowGuard::new(window).finish().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
