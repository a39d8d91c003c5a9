use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{check_cancelled, SearchStrategy, StrategyBase, TermMatcher};
use crate::errors::SearchResult;
use crate::metadata::Module;
use crate::results::{fitness_for, AssemblyResult, SearchResult as Hit};
use crate::sink::ResultSink;

/// Finds modules by name.
///
/// Terms are matched against the simple name. A term set whose text contains
/// a comma (`Acme.Core, Version=1.0`) is matched against the full identity
/// instead.
#[derive(Debug, Clone)]
pub struct AssemblySearchStrategy {
    base: StrategyBase,
    full_identity: bool,
}

impl AssemblySearchStrategy {
    pub fn new(sink: Arc<dyn ResultSink>, terms: super::SearchTerms) -> Self {
        let full_identity = terms.terms().iter().any(|t| t.contains(','));
        Self {
            base: StrategyBase::new(sink, Arc::new(terms)),
            full_identity,
        }
    }

    pub fn with_matcher(sink: Arc<dyn ResultSink>, terms: Arc<dyn TermMatcher>) -> Self {
        Self {
            base: StrategyBase::new(sink, terms),
            full_identity: false,
        }
    }

    fn candidate<'a>(&self, module: &'a Module) -> &'a str {
        if self.full_identity {
            module.full_name()
        } else {
            module.name()
        }
    }
}

impl SearchStrategy for AssemblySearchStrategy {
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()> {
        check_cancelled(cancel)?;

        if self.is_match_module(module) {
            let location = module
                .file_name()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| module.name().to_string());
            self.base.on_found_result(Hit::Assembly(AssemblyResult {
                module: Arc::clone(module),
                name: module.name().to_string(),
                fitness: fitness_for(module.name()),
                location,
                assembly: module.full_name().to_string(),
            }));
        }
        Ok(())
    }

    fn is_match_module(&self, module: &Module) -> bool {
        self.base.is_match(self.candidate(module))
    }

    /// Every result kind knows its module, so every kind can be checked.
    fn is_match_result(&self, result: &Hit) -> bool {
        match result {
            Hit::Namespace(_) | Hit::Member(_) | Hit::Assembly(_) | Hit::Resource(_) => {
                self.is_match_module(result.module())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MemberKind, ModuleBuilder};
    use crate::search::{MemberSearchKind, MemberSearchStrategy, SearchTerms};
    use crate::sink::ResultQueue;

    fn modules() -> Vec<Arc<Module>> {
        vec![
            Arc::new(
                ModuleBuilder::new("Acme.Core")
                    .full_name("Acme.Core, Version=1.0.0.0")
                    .add_member("Acme.Core", "Engine", "Start", MemberKind::Method)
                    .build(),
            ),
            Arc::new(
                ModuleBuilder::new("Acme.Tests")
                    .full_name("Acme.Tests, Version=2.0.0.0")
                    .add_member("Acme.Tests", "EngineTests", "Start", MemberKind::Method)
                    .build(),
            ),
        ]
    }

    #[test]
    fn test_search_by_name() {
        let queue = Arc::new(ResultQueue::new());
        let strategy = AssemblySearchStrategy::new(queue.clone(), SearchTerms::single("core").unwrap());
        for m in modules() {
            strategy.search(&m, &CancellationToken::new()).unwrap();
        }
        let results = queue.drain();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), "Acme.Core");
        assert_eq!(results[0].location(), "Acme.Core");
        assert_eq!(results[0].assembly(), "Acme.Core, Version=1.0.0.0");
    }

    #[test]
    fn test_full_identity_search() {
        let queue = Arc::new(ResultQueue::new());
        let strategy = AssemblySearchStrategy::new(
            queue.clone(),
            SearchTerms::single("tests, version=2").unwrap(),
        );
        let matched: Vec<bool> = modules().iter().map(|m| strategy.is_match_module(m)).collect();
        assert_eq!(matched, vec![false, true]);
    }

    #[test]
    fn test_result_match_checks_owning_module() {
        let queue = Arc::new(ResultQueue::new());
        let members = MemberSearchStrategy::new(
            queue.clone(),
            SearchTerms::single("start").unwrap(),
            MemberSearchKind::Method,
        );
        for m in modules() {
            members.search(&m, &CancellationToken::new()).unwrap();
        }
        let results = queue.drain();
        assert_eq!(results.len(), 2);

        let core = AssemblySearchStrategy::new(queue.clone(), SearchTerms::single("core").unwrap());
        let accepted: Vec<&str> = results
            .iter()
            .filter(|r| core.is_match_result(r))
            .map(|r| r.assembly())
            .collect();
        assert_eq!(accepted, vec!["Acme.Core, Version=1.0.0.0"]);
    }
}
