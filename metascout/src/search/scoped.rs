use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{check_cancelled, SearchStrategy};
use crate::errors::SearchResult;
use crate::filters::FilteredSink;
use crate::metadata::Module;
use crate::results::SearchResult as Hit;
use crate::sink::ResultSink;

type Scope = Arc<[Arc<dyn SearchStrategy>]>;

/// Runs a delegate strategy only inside a scope.
///
/// The scope is an ordered list of independent strategies that must all
/// match. A module outside the scope is skipped without running the
/// delegate. Results the delegate emits inside an in-scope module can be
/// narrowed further by writing them through [`ScopedSearchStrategy::filter_sink`].
///
/// The strategy has no sink of its own: only the delegate produces results.
#[derive(Debug, Clone)]
pub struct ScopedSearchStrategy {
    strategy: Option<Arc<dyn SearchStrategy>>,
    scope: Scope,
}

impl ScopedSearchStrategy {
    pub fn new(scope: Vec<Arc<dyn SearchStrategy>>) -> Self {
        Self {
            strategy: None,
            scope: scope.into(),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn SearchStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn strategy(&self) -> Option<&Arc<dyn SearchStrategy>> {
        self.strategy.as_ref()
    }

    /// Wraps `inner` so that it only accepts results inside this scope.
    ///
    /// The filter shares the scope list with this strategy; it holds no other
    /// state.
    pub fn filter_sink(
        &self,
        inner: Arc<dyn ResultSink>,
    ) -> FilteredSink<impl Fn(&Hit) -> bool + Send + Sync> {
        let scope = Arc::clone(&self.scope);
        FilteredSink::new(inner, move |result: &Hit| {
            scope.iter().all(|s| s.is_match_result(result))
        })
    }
}

impl SearchStrategy for ScopedSearchStrategy {
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()> {
        check_cancelled(cancel)?;

        let Some(strategy) = &self.strategy else {
            return Ok(());
        };

        if self.is_match_module(module) {
            strategy.search(module, cancel)
        } else {
            debug!("Module {} is outside the search scope", module.name());
            Ok(())
        }
    }

    fn is_match_module(&self, module: &Module) -> bool {
        self.scope.iter().all(|s| s.is_match_module(module))
    }

    fn is_match_result(&self, result: &Hit) -> bool {
        self.scope.iter().all(|s| s.is_match_result(result))
    }
}
