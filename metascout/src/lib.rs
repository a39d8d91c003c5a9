pub mod config;
pub mod errors;
pub mod filters;
pub mod metadata;
pub mod metrics;
pub mod results;
pub mod search;
pub mod sink;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use filters::FilteredSink;
pub use metadata::{load_module, MemberKind, Module, ModuleBuilder};
pub use metrics::{SearchMetrics, SearchStats};
pub use results::SearchResult as Hit;
pub use search::{
    search, AssemblySearchStrategy, MemberSearchKind, MemberSearchStrategy, NamespaceSearchStrategy,
    ResourceSearchStrategy, ScopedSearchStrategy, SearchMode, SearchQuery, SearchSession,
    SearchStrategy, SearchTerms, SessionSummary, TermMatcher,
};
pub use sink::{ResultQueue, ResultSink};
pub use tokio_util::sync::CancellationToken;
