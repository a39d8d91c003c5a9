use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters for one or more search sessions
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    modules_searched: Arc<AtomicU64>,
    modules_skipped: Arc<AtomicU64>,
    modules_failed: Arc<AtomicU64>,
    results_collected: Arc<AtomicU64>,
    sessions_cancelled: Arc<AtomicU64>,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self {
            modules_searched: Arc::new(AtomicU64::new(0)),
            modules_skipped: Arc::new(AtomicU64::new(0)),
            modules_failed: Arc::new(AtomicU64::new(0)),
            results_collected: Arc::new(AtomicU64::new(0)),
            sessions_cancelled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A module whose search ran to completion
    pub fn record_searched(&self) {
        self.modules_searched.fetch_add(1, Ordering::Relaxed);
    }

    /// A module that was not searched, or whose search was cut short by cancellation
    pub fn record_skipped(&self) {
        self.modules_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.modules_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_results(&self, count: u64) {
        self.results_collected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.sessions_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            modules_searched: self.modules_searched.load(Ordering::Relaxed),
            modules_skipped: self.modules_skipped.load(Ordering::Relaxed),
            modules_failed: self.modules_failed.load(Ordering::Relaxed),
            results_collected: self.results_collected.load(Ordering::Relaxed),
            sessions_cancelled: self.sessions_cancelled.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Modules searched/skipped/failed: {}/{}/{}\n\
             Results collected: {}\n\
             Sessions cancelled: {}",
            stats.modules_searched,
            stats.modules_skipped,
            stats.modules_failed,
            stats.results_collected,
            stats.sessions_cancelled
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub modules_searched: u64,
    pub modules_skipped: u64,
    pub modules_failed: u64,
    pub results_collected: u64,
    pub sessions_cancelled: u64,
}
