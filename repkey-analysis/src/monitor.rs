//! Progress reporting and cooperative cancellation for long scans

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hook for the superlinear scans (exhaustive key search, Kasiski).
///
/// `should_stop` is polled between outer-loop iterations; a scan that sees
/// `true` returns what it has so far.
pub trait SearchMonitor {
    /// Called every [`SearchMonitor::interval`] units of work, with the best
    /// score so far when the scan has one
    fn on_progress(&self, _checked: u64, _best_score: Option<f64>) {}

    fn should_stop(&self) -> bool {
        false
    }

    fn interval(&self) -> u64 {
        1000
    }
}

/// Runs to completion and reports nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SearchMonitor for Silent {}

/// Reports progress through `tracing` at info level
#[derive(Debug, Clone, Copy)]
pub struct LogMonitor {
    every: u64,
}

impl LogMonitor {
    pub fn new(every: u64) -> Self {
        Self { every: every.max(1) }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl SearchMonitor for LogMonitor {
    fn on_progress(&self, checked: u64, best_score: Option<f64>) {
        match best_score {
            Some(score) => tracing::info!("{} checked, best score {:.4}", checked, score),
            None => tracing::info!("{} checked", checked),
        }
    }

    fn interval(&self) -> u64 {
        self.every
    }
}

/// Shared flag another thread can raise to stop a scan
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stop: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

impl SearchMonitor for StopFlag {
    fn should_stop(&self) -> bool {
        self.is_stopped()
    }
}
