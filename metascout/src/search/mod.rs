/// Search strategies and the session runner.
///
/// A strategy decides *what* counts as a match; the session runner decides
/// *where* it runs. Every strategy implements the same three operations:
///
/// 1. **`search`** walks one module and writes matches into the strategy's
///    sink. It checks the cancellation token on entry.
/// 2. **`is_match_module`** is a cheap "is there anything here at all" check
///    that composite strategies use to skip whole modules.
/// 3. **`is_match_result`** re-checks a result that some *other* strategy
///    produced. This is what lets a scope narrow the output of a delegate
///    that has no notion of scope.
///
/// # Composition
///
/// ```text
/// ScopedSearchStrategy
///   scope:    [NamespaceSearchStrategy("Acme.IO"), AssemblySearchStrategy("core")]
///   strategy: MemberSearchStrategy("Reader") --writes--> FilteredSink(scope) --> ResultQueue
/// ```
///
/// # Concurrency
///
/// Strategies hold no per-module state. One instance is shared by every
/// worker of a session, and a module may be searched by several sessions at
/// once.
pub mod assembly;
pub mod engine;
pub mod matcher;
pub mod member;
pub mod namespace;
pub mod query;
pub mod resource;
pub mod scoped;

pub use assembly::AssemblySearchStrategy;
pub use engine::{search, SearchSession, SessionSummary};
pub use matcher::{SearchTerms, TermMatcher};
pub use member::{MemberSearchKind, MemberSearchStrategy};
pub use namespace::NamespaceSearchStrategy;
pub use query::{SearchMode, SearchQuery};
pub use resource::ResourceSearchStrategy;
pub use scoped::ScopedSearchStrategy;

use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::errors::{SearchError, SearchResult};
use crate::metadata::Module;
use crate::results::SearchResult as Hit;
use crate::sink::ResultSink;

/// The contract shared by all search strategies
pub trait SearchStrategy: Debug + Send + Sync {
    /// Searches one module, writing matches into the configured sink.
    ///
    /// Returns [`SearchError::Cancelled`] if the token is (or becomes)
    /// cancelled; results emitted before that point stay in the sink.
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()>;

    /// Whether the module contains at least one match anywhere
    fn is_match_module(&self, module: &Module) -> bool;

    /// Whether a previously produced result is consistent with this strategy
    fn is_match_result(&self, result: &Hit) -> bool;
}

/// Fails fast when the token is cancelled
pub fn check_cancelled(cancel: &CancellationToken) -> SearchResult<()> {
    if cancel.is_cancelled() {
        Err(SearchError::Cancelled)
    } else {
        Ok(())
    }
}

/// State common to every result-producing strategy: the sink it writes
/// into and the terms it matches against. Both are fixed at construction.
#[derive(Clone)]
pub struct StrategyBase {
    sink: Arc<dyn ResultSink>,
    terms: Arc<dyn TermMatcher>,
}

impl StrategyBase {
    pub fn new(sink: Arc<dyn ResultSink>, terms: Arc<dyn TermMatcher>) -> Self {
        Self { sink, terms }
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.terms.is_match(name)
    }

    pub fn full_name_search(&self) -> bool {
        self.terms.full_name_search()
    }

    /// Hands a result to the sink; returns whether it was accepted
    pub fn on_found_result(&self, result: Hit) -> bool {
        self.sink.try_insert(result)
    }
}

impl Debug for StrategyBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyBase")
            .field("terms", &self.terms)
            .finish_non_exhaustive()
    }
}
