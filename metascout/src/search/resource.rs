use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{check_cancelled, SearchStrategy, StrategyBase, TermMatcher};
use crate::errors::SearchResult;
use crate::metadata::Module;
use crate::results::{fitness_for, ResourceResult, SearchResult as Hit};
use crate::sink::ResultSink;

/// Finds embedded resources by name
#[derive(Debug, Clone)]
pub struct ResourceSearchStrategy {
    base: StrategyBase,
}

impl ResourceSearchStrategy {
    pub fn new(sink: Arc<dyn ResultSink>, terms: impl TermMatcher + 'static) -> Self {
        Self {
            base: StrategyBase::new(sink, Arc::new(terms)),
        }
    }
}

impl SearchStrategy for ResourceSearchStrategy {
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()> {
        check_cancelled(cancel)?;

        for resource in module.resources() {
            if self.base.is_match(resource) {
                self.base.on_found_result(Hit::Resource(ResourceResult {
                    module: Arc::clone(module),
                    name: resource.clone(),
                    fitness: fitness_for(resource),
                    location: module.name().to_string(),
                    assembly: module.full_name().to_string(),
                }));
            }
        }
        Ok(())
    }

    fn is_match_module(&self, module: &Module) -> bool {
        module.resources().iter().any(|r| self.base.is_match(r))
    }

    fn is_match_result(&self, result: &Hit) -> bool {
        match result {
            Hit::Resource(r) => self.base.is_match(&r.name),
            Hit::Namespace(_) | Hit::Member(_) | Hit::Assembly(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ModuleBuilder;
    use crate::search::SearchTerms;
    use crate::sink::ResultQueue;

    #[test]
    fn test_resource_search() {
        let module = Arc::new(
            ModuleBuilder::new("Acme")
                .add_resource("Acme.Strings.resources")
                .add_resource("Acme.Icons.png")
                .build(),
        );
        let queue = Arc::new(ResultQueue::new());
        let strategy = ResourceSearchStrategy::new(queue.clone(), SearchTerms::single("strings").unwrap());

        assert!(strategy.is_match_module(&module));
        strategy.search(&module, &CancellationToken::new()).unwrap();
        let results = queue.drain();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind(), "resource");
        assert!(strategy.is_match_result(&results[0]));
    }

    #[test]
    fn test_module_without_resources() {
        let module = Arc::new(ModuleBuilder::new("Acme").build());
        let queue = Arc::new(ResultQueue::new());
        let strategy = ResourceSearchStrategy::new(queue.clone(), SearchTerms::single("").unwrap());
        assert!(!strategy.is_match_module(&module));
        strategy.search(&module, &CancellationToken::new()).unwrap();
        assert!(queue.is_empty());
    }
}
