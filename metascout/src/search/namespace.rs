use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{check_cancelled, SearchStrategy, StrategyBase, TermMatcher};
use crate::errors::SearchResult;
use crate::metadata::{MetadataReader, Module, Namespace, NamespaceDefinitionHandle};
use crate::results::{fitness_for, NamespaceResult, SearchResult as Hit};
use crate::sink::ResultSink;

/// Finds namespaces by full name.
///
/// Only namespaces that directly own at least one type are reported. Empty
/// namespaces are still walked, so `A.B` can match even when `A` holds
/// nothing but child namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceSearchStrategy {
    base: StrategyBase,
}

impl NamespaceSearchStrategy {
    pub fn new(sink: Arc<dyn ResultSink>, terms: impl TermMatcher + 'static) -> Self {
        Self::with_matcher(sink, Arc::new(terms))
    }

    pub fn with_matcher(sink: Arc<dyn ResultSink>, terms: Arc<dyn TermMatcher>) -> Self {
        Self {
            base: StrategyBase::new(sink, terms),
        }
    }

    fn visit(&self, module: &Arc<Module>, ns: &Arc<Namespace>) {
        trace!("Visiting namespace {}", ns.full_name());
        if !ns.types().is_empty() && self.base.is_match(ns.full_name()) {
            self.on_found_result(module, ns);
        }

        for child in ns.child_namespaces() {
            self.visit(module, child);
        }
    }

    fn on_found_result(&self, module: &Arc<Module>, ns: &Arc<Namespace>) {
        let result = NamespaceResult {
            namespace: Arc::clone(ns),
            module: Arc::clone(module),
            name: ns.full_name().to_string(),
            fitness: fitness_for(ns.full_name()),
            location: module.name().to_string(),
            assembly: module.full_name().to_string(),
        };
        self.base.on_found_result(Hit::Namespace(result));
    }

    fn is_match_definition(&self, metadata: &MetadataReader, handle: NamespaceDefinitionHandle) -> bool {
        let definition = metadata.namespace_definition(handle);
        if !definition.type_definitions().is_empty()
            && self.base.is_match(metadata.namespace_name(handle))
        {
            return true;
        }

        definition
            .namespace_definitions()
            .iter()
            .any(|&child| self.is_match_definition(metadata, child))
    }
}

impl SearchStrategy for NamespaceSearchStrategy {
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()> {
        check_cancelled(cancel)?;

        let Some(type_system) = module.type_system() else {
            return Ok(());
        };

        // The root is the global namespace and is never a candidate itself.
        for ns in type_system.root_namespace().child_namespaces() {
            check_cancelled(cancel)?;
            self.visit(module, ns);
        }
        Ok(())
    }

    fn is_match_module(&self, module: &Module) -> bool {
        let metadata = module.metadata();
        metadata
            .namespace_definition_root()
            .namespace_definitions()
            .iter()
            .any(|&handle| self.is_match_definition(metadata, handle))
    }

    fn is_match_result(&self, result: &Hit) -> bool {
        match result {
            Hit::Member(r) => self.base.is_match(r.member.namespace()),
            Hit::Assembly(r) => self.is_match_module(&r.module),
            // The containing namespace, not the result itself.
            Hit::Namespace(r) => r
                .namespace
                .parent_namespace()
                .is_some_and(|parent| self.base.is_match(parent.full_name())),
            Hit::Resource(_) => false,
        }
    }
}
