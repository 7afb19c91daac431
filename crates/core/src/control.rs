//! Cooperative cancellation and progress reporting for a scan pass.
//!
//! A scan runs on one logical worker. Every per-file and per-action loop calls
//! [`ScanControl::check`] at the top of its body and bails out with
//! [`Cancelled`] once the shared [`CancelFlag`] is raised. Partial results are
//! dropped by the caller; there is no partial commit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The scan was cancelled through its [`CancelFlag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Scan cancelled")]
pub struct Cancelled;

/// Shared cancellation flag. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Phase of a scan, reported alongside the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    /// Enumerating search locations and show folders.
    Enumerating,
    /// Checking the library for present and missing episodes.
    CheckingLibrary,
    /// Matching snapshot files against missing episodes.
    Matching,
    /// Building the final action plan.
    Planning,
}

/// A progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    /// 0-100.
    pub percent: u8,
}

/// Cancellation flag plus optional progress callback for one scan.
pub struct ScanControl<'a> {
    cancel: CancelFlag,
    on_progress: Option<Box<dyn FnMut(ScanProgress) + 'a>>,
    last: Option<ScanProgress>,
}

impl<'a> ScanControl<'a> {
    /// Creates a control bound to `cancel`, without progress reporting.
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            cancel,
            on_progress: None,
            last: None,
        }
    }

    /// Creates a control that can never be cancelled.
    pub fn unbounded() -> Self {
        Self::new(CancelFlag::new())
    }

    /// Installs a progress callback.
    pub fn with_progress(mut self, callback: impl FnMut(ScanProgress) + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Returns `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reports `done` out of `total` units for `phase`.
    ///
    /// The callback only fires when the phase or the integer percentage changes.
    pub fn report(&mut self, phase: ScanPhase, done: usize, total: usize) {
        let percent = percent_of(done, total);
        let progress = ScanProgress { phase, percent };
        if self.last == Some(progress) {
            return;
        }
        self.last = Some(progress);
        if let Some(callback) = self.on_progress.as_mut() {
            callback(progress);
        }
    }
}

impl fmt::Debug for ScanControl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanControl")
            .field("cancel", &self.cancel)
            .field("has_progress", &self.on_progress.is_some())
            .finish()
    }
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_check_after_cancel() {
        let flag = CancelFlag::new();
        let control = ScanControl::new(flag.clone());
        assert!(control.check().is_ok());
        flag.cancel();
        assert_eq!(control.check(), Err(Cancelled));
    }

    #[test]
    fn test_report_deduplicates_percentages() {
        let mut seen = Vec::new();
        {
            let mut control = ScanControl::unbounded().with_progress(|p| seen.push(p.percent));
            for done in 0..=400 {
                control.report(ScanPhase::Matching, done, 400);
            }
        }
        assert_eq!(seen.len(), 101);
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_percent_of_empty_total_is_complete() {
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(5, 3), 100);
        assert_eq!(percent_of(1, 3), 33);
    }
}
