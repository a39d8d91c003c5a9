/// Search result records.
///
/// A result is one of a closed set of kinds. Every kind carries the module it
/// was found in, so a scope can re-check a result (its module, its namespace,
/// its parent namespace) long after the traversal that produced it is over.
///
/// Results are cheap to clone: the heavy parts are shared `Arc`s into the
/// module's metadata.
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::metadata::{Member, Module, Namespace};

/// Fitness of a matched name: the reciprocal of its length, so shorter names
/// rank first. Always in `(0, 1]`; an empty name scores 1.
pub fn fitness_for(name: &str) -> f32 {
    1.0 / name.chars().count().max(1) as f32
}

/// A namespace that directly owns at least one type
#[derive(Debug, Clone)]
pub struct NamespaceResult {
    pub namespace: Arc<Namespace>,
    pub module: Arc<Module>,
    /// Full namespace name
    pub name: String,
    pub fitness: f32,
    /// Simple name of the module
    pub location: String,
    /// Full identity of the module
    pub assembly: String,
}

/// A type or type member
#[derive(Debug, Clone)]
pub struct MemberResult {
    pub member: Arc<Member>,
    pub module: Arc<Module>,
    pub name: String,
    pub fitness: f32,
    pub location: String,
    pub assembly: String,
}

/// A whole module
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    pub module: Arc<Module>,
    pub name: String,
    pub fitness: f32,
    /// File the module was loaded from, or its name when built in memory
    pub location: String,
    pub assembly: String,
}

/// An embedded resource of a module
#[derive(Debug, Clone)]
pub struct ResourceResult {
    pub module: Arc<Module>,
    pub name: String,
    pub fitness: f32,
    pub location: String,
    pub assembly: String,
}

#[derive(Debug, Clone)]
pub enum SearchResult {
    Namespace(NamespaceResult),
    Member(MemberResult),
    Assembly(AssemblyResult),
    Resource(ResourceResult),
}

impl SearchResult {
    pub fn name(&self) -> &str {
        match self {
            SearchResult::Namespace(r) => &r.name,
            SearchResult::Member(r) => &r.name,
            SearchResult::Assembly(r) => &r.name,
            SearchResult::Resource(r) => &r.name,
        }
    }

    pub fn fitness(&self) -> f32 {
        match self {
            SearchResult::Namespace(r) => r.fitness,
            SearchResult::Member(r) => r.fitness,
            SearchResult::Assembly(r) => r.fitness,
            SearchResult::Resource(r) => r.fitness,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            SearchResult::Namespace(r) => &r.location,
            SearchResult::Member(r) => &r.location,
            SearchResult::Assembly(r) => &r.location,
            SearchResult::Resource(r) => &r.location,
        }
    }

    pub fn assembly(&self) -> &str {
        match self {
            SearchResult::Namespace(r) => &r.assembly,
            SearchResult::Member(r) => &r.assembly,
            SearchResult::Assembly(r) => &r.assembly,
            SearchResult::Resource(r) => &r.assembly,
        }
    }

    /// The module the result was found in
    pub fn module(&self) -> &Arc<Module> {
        match self {
            SearchResult::Namespace(r) => &r.module,
            SearchResult::Member(r) => &r.module,
            SearchResult::Assembly(r) => &r.module,
            SearchResult::Resource(r) => &r.module,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchResult::Namespace(_) => "namespace",
            SearchResult::Member(_) => "member",
            SearchResult::Assembly(_) => "assembly",
            SearchResult::Resource(_) => "resource",
        }
    }

    /// Presentation order: higher fitness first, then name
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .fitness()
            .total_cmp(&self.fitness())
            .then_with(|| self.name().cmp(other.name()))
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.name(), self.kind(), self.location())
    }
}

/// Sorts results for display
pub fn sort_for_display(results: &mut [SearchResult]) {
    results.sort_by(SearchResult::display_order);
}
