use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{check_cancelled, SearchStrategy, StrategyBase, TermMatcher};
use crate::errors::SearchResult;
use crate::metadata::{Member, MemberKind, Module, Namespace};
use crate::results::{MemberResult, SearchResult as Hit};
use crate::sink::ResultSink;

/// Which entities a [`MemberSearchStrategy`] considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSearchKind {
    /// Types and all members
    #[default]
    All,
    Type,
    /// Any member, but not types
    Member,
    Method,
    Field,
    Property,
    Event,
}

impl MemberSearchKind {
    pub fn accepts(self, kind: MemberKind) -> bool {
        match self {
            MemberSearchKind::All => true,
            MemberSearchKind::Type => kind == MemberKind::Type,
            MemberSearchKind::Member => kind != MemberKind::Type,
            MemberSearchKind::Method => {
                matches!(kind, MemberKind::Method | MemberKind::Constructor)
            }
            MemberSearchKind::Field => kind == MemberKind::Field,
            MemberSearchKind::Property => kind == MemberKind::Property,
            MemberSearchKind::Event => kind == MemberKind::Event,
        }
    }
}

/// Finds types and members by name.
///
/// Terms are matched against simple names unless they ask for a full-name
/// search (a single term containing a dot), in which case the dotted
/// `Namespace.Type.Member` name is used.
#[derive(Debug, Clone)]
pub struct MemberSearchStrategy {
    base: StrategyBase,
    kind: MemberSearchKind,
}

impl MemberSearchStrategy {
    pub fn new(sink: Arc<dyn ResultSink>, terms: impl TermMatcher + 'static, kind: MemberSearchKind) -> Self {
        Self::with_matcher(sink, Arc::new(terms), kind)
    }

    pub fn with_matcher(
        sink: Arc<dyn ResultSink>,
        terms: Arc<dyn TermMatcher>,
        kind: MemberSearchKind,
    ) -> Self {
        Self {
            base: StrategyBase::new(sink, terms),
            kind,
        }
    }

    pub fn kind(&self) -> MemberSearchKind {
        self.kind
    }

    fn is_match_member(&self, member: &Member) -> bool {
        if !self.kind.accepts(member.kind()) {
            return false;
        }
        if self.base.full_name_search() {
            self.base.is_match(&member.full_name())
        } else {
            self.base.is_match(member.name())
        }
    }

    fn visit(&self, module: &Arc<Module>, ns: &Namespace) {
        for ty in ns.types() {
            if self.is_match_member(ty.as_member()) {
                self.on_found_result(module, ty.as_member());
            }
            for member in ty.members() {
                if self.is_match_member(member) {
                    self.on_found_result(module, member);
                }
            }
        }
        for child in ns.child_namespaces() {
            self.visit(module, child);
        }
    }

    fn on_found_result(&self, module: &Arc<Module>, member: &Arc<Member>) {
        let result = MemberResult {
            member: Arc::clone(member),
            module: Arc::clone(module),
            name: member.name().to_string(),
            fitness: member_fitness(member),
            location: module.name().to_string(),
            assembly: module.full_name().to_string(),
        };
        self.base.on_found_result(Hit::Member(result));
    }
}

/// Constructors share one name in metadata, so they are ranked by the
/// declaring type's name instead.
fn member_fitness(member: &Member) -> f32 {
    let name = match (member.kind(), member.declaring_type()) {
        (MemberKind::Constructor, Some(declaring)) => declaring,
        _ => member.name(),
    };
    crate::results::fitness_for(name)
}

impl SearchStrategy for MemberSearchStrategy {
    fn search(&self, module: &Arc<Module>, cancel: &CancellationToken) -> SearchResult<()> {
        check_cancelled(cancel)?;

        let Some(type_system) = module.type_system() else {
            return Ok(());
        };

        let root = type_system.root_namespace();
        // Types in the global namespace are searchable, unlike the namespace itself.
        for ty in root.types() {
            if self.is_match_member(ty.as_member()) {
                self.on_found_result(module, ty.as_member());
            }
            for member in ty.members() {
                if self.is_match_member(member) {
                    self.on_found_result(module, member);
                }
            }
        }
        for ns in root.child_namespaces() {
            check_cancelled(cancel)?;
            self.visit(module, ns);
        }
        Ok(())
    }

    fn is_match_module(&self, module: &Module) -> bool {
        let metadata = module.metadata();
        let full_name = self.base.full_name_search();

        metadata.type_definitions().any(|ty| {
            let namespace = metadata.namespace_name(ty.namespace());
            let type_name = metadata.string(ty.name());

            let candidate = |name: &str, declaring: Option<&str>| {
                if full_name {
                    let full = [namespace, declaring.unwrap_or(""), name]
                        .iter()
                        .filter(|part| !part.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join(".");
                    self.base.is_match(&full)
                } else {
                    self.base.is_match(name)
                }
            };

            (self.kind.accepts(MemberKind::Type) && candidate(type_name, None))
                || ty.members().iter().any(|m| {
                    self.kind.accepts(m.kind) && candidate(metadata.string(m.name), Some(type_name))
                })
        })
    }

    fn is_match_result(&self, result: &Hit) -> bool {
        match result {
            Hit::Member(r) => self.is_match_member(&r.member),
            Hit::Namespace(_) | Hit::Assembly(_) | Hit::Resource(_) => false,
        }
    }
}
