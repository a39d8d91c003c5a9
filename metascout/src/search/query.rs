use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::{
    AssemblySearchStrategy, MemberSearchKind, MemberSearchStrategy, NamespaceSearchStrategy,
    ResourceSearchStrategy, ScopedSearchStrategy, SearchStrategy, SearchTerms,
};
use crate::errors::{SearchError, SearchResult};
use crate::sink::ResultSink;

const NAMESPACE_PREFIXES: [&str; 2] = ["inns:", "innamespace:"];
const ASSEMBLY_PREFIXES: [&str; 2] = ["inasm:", "inassembly:"];

/// What the main terms of a query are matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    #[default]
    TypesAndMembers,
    Type,
    Member,
    Method,
    Field,
    Property,
    Event,
    Namespace,
    Assembly,
    Resource,
}

impl SearchMode {
    pub const ALL: [SearchMode; 10] = [
        SearchMode::TypesAndMembers,
        SearchMode::Type,
        SearchMode::Member,
        SearchMode::Method,
        SearchMode::Field,
        SearchMode::Property,
        SearchMode::Event,
        SearchMode::Namespace,
        SearchMode::Assembly,
        SearchMode::Resource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::TypesAndMembers => "types-and-members",
            SearchMode::Type => "type",
            SearchMode::Member => "member",
            SearchMode::Method => "method",
            SearchMode::Field => "field",
            SearchMode::Property => "property",
            SearchMode::Event => "event",
            SearchMode::Namespace => "namespace",
            SearchMode::Assembly => "assembly",
            SearchMode::Resource => "resource",
        }
    }

    fn member_kind(self) -> Option<MemberSearchKind> {
        match self {
            SearchMode::TypesAndMembers => Some(MemberSearchKind::All),
            SearchMode::Type => Some(MemberSearchKind::Type),
            SearchMode::Member => Some(MemberSearchKind::Member),
            SearchMode::Method => Some(MemberSearchKind::Method),
            SearchMode::Field => Some(MemberSearchKind::Field),
            SearchMode::Property => Some(MemberSearchKind::Property),
            SearchMode::Event => Some(MemberSearchKind::Event),
            SearchMode::Namespace | SearchMode::Assembly | SearchMode::Resource => None,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| SearchError::config_error(format!("Unknown search mode: {}", s)))
    }
}

/// A parsed user query: main terms plus scope restrictions.
///
/// ```rust,ignore
/// let query = SearchQuery::parse(r#"Reader inns:Acme.IO inasm:"Acme Core""#);
/// assert_eq!(query.terms, ["Reader"]);
/// assert_eq!(query.namespace_scope, ["Acme.IO"]);
/// assert_eq!(query.assembly_scope, ["Acme Core"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    /// Each entry becomes its own namespace scope; all must hold
    pub namespace_scope: Vec<String>,
    /// Each entry becomes its own assembly scope; all must hold
    pub assembly_scope: Vec<String>,
}

impl SearchQuery {
    pub fn parse(text: &str) -> Self {
        let mut query = SearchQuery::default();
        for word in split_words(text) {
            if let Some(value) = strip_any_prefix(&word, &NAMESPACE_PREFIXES) {
                if !value.is_empty() {
                    query.namespace_scope.push(value.to_string());
                }
            } else if let Some(value) = strip_any_prefix(&word, &ASSEMBLY_PREFIXES) {
                if !value.is_empty() {
                    query.assembly_scope.push(value.to_string());
                }
            } else {
                query.terms.push(word);
            }
        }
        query
    }

    pub fn is_scoped(&self) -> bool {
        !self.namespace_scope.is_empty() || !self.assembly_scope.is_empty()
    }

    /// Builds the root strategy for this query.
    ///
    /// An unscoped query returns the plain strategy for `mode`. A scoped one
    /// returns a [`ScopedSearchStrategy`] whose delegate writes through a
    /// sink filtered by the same scope.
    pub fn build_strategy(
        &self,
        mode: SearchMode,
        sink: Arc<dyn ResultSink>,
    ) -> SearchResult<Arc<dyn SearchStrategy>> {
        let terms = SearchTerms::new(self.terms.iter().cloned())?;
        if !self.is_scoped() {
            return Ok(delegate_for(mode, sink, terms));
        }

        let mut scope: Vec<Arc<dyn SearchStrategy>> = Vec::new();
        for ns in &self.namespace_scope {
            scope.push(Arc::new(NamespaceSearchStrategy::new(
                sink.clone(),
                SearchTerms::single(ns.clone())?,
            )));
        }
        for asm in &self.assembly_scope {
            scope.push(Arc::new(AssemblySearchStrategy::new(
                sink.clone(),
                SearchTerms::single(asm.clone())?,
            )));
        }
        debug!(
            "Scoped {} search: {} namespace and {} assembly scopes",
            mode,
            self.namespace_scope.len(),
            self.assembly_scope.len()
        );

        let scoped = ScopedSearchStrategy::new(scope);
        let filtered: Arc<dyn ResultSink> = Arc::new(scoped.filter_sink(sink));
        let delegate = delegate_for(mode, filtered, terms);
        Ok(Arc::new(scoped.with_strategy(delegate)))
    }
}

fn delegate_for(mode: SearchMode, sink: Arc<dyn ResultSink>, terms: SearchTerms) -> Arc<dyn SearchStrategy> {
    if let Some(kind) = mode.member_kind() {
        return Arc::new(MemberSearchStrategy::new(sink, terms, kind));
    }
    match mode {
        SearchMode::Namespace => Arc::new(NamespaceSearchStrategy::new(sink, terms)),
        SearchMode::Assembly => Arc::new(AssemblySearchStrategy::new(sink, terms)),
        _ => Arc::new(ResourceSearchStrategy::new(sink, terms)),
    }
}

fn strip_any_prefix<'a>(word: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        word.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| &word[prefix.len()..])
    })
}

/// Splits on whitespace; double quotes group words and are removed
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
