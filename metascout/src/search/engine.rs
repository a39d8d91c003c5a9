use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::SearchStrategy;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::metadata::Module;
use crate::metrics::SearchMetrics;
use crate::results::{sort_for_display, SearchResult as Hit};
use crate::sink::{ResultQueue, ResultSink};

/// Outcome of one session over a set of modules
#[derive(Debug, Default)]
pub struct SessionSummary {
    pub modules_searched: usize,
    pub modules_skipped: usize,
    /// The caller's token was cancelled before the session finished
    pub cancelled: bool,
    /// The result cap was reached and results were lost to it, either
    /// because modules were skipped or because the sink refused inserts
    pub truncated: bool,
    pub results: Vec<Hit>,
}

enum Outcome {
    Searched,
    Skipped,
    Failed,
}

/// Runs one strategy over many modules on a dedicated worker pool
pub struct SearchSession {
    pool: ThreadPool,
    max_results: usize,
    metrics: SearchMetrics,
}

impl SearchSession {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count.get())
            .thread_name(|i| format!("metascout-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(format!("Failed to build thread pool: {}", e)))?;
        Ok(Self {
            pool,
            max_results: config.max_results,
            metrics: SearchMetrics::new(),
        })
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Searches every module with `strategy`, then drains `sink`.
    ///
    /// Modules run in parallel. Cancelling `cancel` stops the session at the
    /// next check; results already in the sink are still returned.
    pub fn run(
        &self,
        strategy: &dyn SearchStrategy,
        sink: &dyn ResultSink,
        modules: &[Arc<Module>],
        cancel: &CancellationToken,
    ) -> SessionSummary {
        info!("Searching {} modules with {:?}", modules.len(), strategy);

        let session = cancel.child_token();
        let cap_reached = AtomicBool::new(false);

        let outcomes: Vec<Outcome> = self.pool.install(|| {
            modules
                .par_iter()
                .map(|module| {
                    let outcome = self.search_module(strategy, module, &session);
                    if self.max_results > 0 && sink.len() >= self.max_results && !session.is_cancelled() {
                        debug!("Result cap of {} reached", self.max_results);
                        cap_reached.store(true, Ordering::Relaxed);
                        session.cancel();
                    }
                    outcome
                })
                .collect()
        });

        let mut summary = SessionSummary {
            cancelled: cancel.is_cancelled(),
            ..SessionSummary::default()
        };
        for outcome in &outcomes {
            match outcome {
                Outcome::Searched => summary.modules_searched += 1,
                Outcome::Skipped | Outcome::Failed => summary.modules_skipped += 1,
            }
        }
        // Filling the cap exactly with the last module loses nothing.
        summary.truncated = cap_reached.load(Ordering::Relaxed)
            && (summary.modules_skipped > 0 || sink.rejected() > 0);

        summary.results = sink.drain();
        sort_for_display(&mut summary.results);
        self.metrics.record_results(summary.results.len() as u64);
        if summary.cancelled {
            self.metrics.record_cancelled();
        }
        self.metrics.log_stats();

        info!(
            "Search complete. Found {} results in {} modules ({} skipped)",
            summary.results.len(),
            summary.modules_searched,
            summary.modules_skipped
        );
        summary
    }

    fn search_module(
        &self,
        strategy: &dyn SearchStrategy,
        module: &Arc<Module>,
        session: &CancellationToken,
    ) -> Outcome {
        if session.is_cancelled() {
            self.metrics.record_skipped();
            return Outcome::Skipped;
        }
        match strategy.search(module, session) {
            Ok(()) => {
                self.metrics.record_searched();
                Outcome::Searched
            }
            Err(e) if e.is_cancelled() => {
                debug!("Search of {} cut short by cancellation", module.name());
                self.metrics.record_skipped();
                Outcome::Skipped
            }
            Err(e) => {
                warn!("Failed to search {}: {}", module.name(), e);
                self.metrics.record_failed();
                Outcome::Failed
            }
        }
    }
}

/// Runs the query described by `config` over `modules`
pub fn search(
    config: &SearchConfig,
    modules: &[Arc<Module>],
    cancel: &CancellationToken,
) -> SearchResult<SessionSummary> {
    let query = config.query();
    info!("Starting {} search with terms: {:?}", config.mode, query.terms);

    if query.terms.is_empty() {
        debug!("No search terms provided, returning empty result");
        return Ok(SessionSummary::default());
    }

    let queue = Arc::new(ResultQueue::bounded(config.max_results));
    let strategy = query.build_strategy(config.mode, queue.clone())?;
    let session = SearchSession::new(config)?;
    Ok(session.run(strategy.as_ref(), queue.as_ref(), modules, cancel))
}
