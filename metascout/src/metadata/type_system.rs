use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

use super::raw::{MetadataReader, NamespaceDefinitionHandle};

/// Kind of entity a [`Member`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Type,
    Method,
    Constructor,
    Field,
    Property,
    Event,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberKind::Type => "type",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
        };
        f.write_str(label)
    }
}

/// A type or a member of a type.
///
/// Every member knows the full name of the namespace that owns it, so a
/// result holding a member can be checked against a namespace scope without
/// walking the tree again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    name: String,
    kind: MemberKind,
    namespace: String,
    declaring_type: Option<String>,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Full name of the owning namespace; empty for the global namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Simple name of the declaring type, `None` for types themselves
    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    /// Dotted name: `Namespace.Type` for types, `Namespace.Type.Member` for members
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !self.namespace.is_empty() {
            parts.push(&self.namespace);
        }
        if let Some(declaring) = &self.declaring_type {
            parts.push(declaring);
        }
        parts.push(&self.name);
        parts.join(".")
    }
}

/// A type together with its members
#[derive(Debug)]
pub struct Type {
    definition: Arc<Member>,
    members: Vec<Arc<Member>>,
}

impl Type {
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// The type viewed as a searchable entity
    pub fn as_member(&self) -> &Arc<Member> {
        &self.definition
    }

    pub fn members(&self) -> &[Arc<Member>] {
        &self.members
    }
}

/// A node of the materialized namespace tree
#[derive(Debug)]
pub struct Namespace {
    full_name: String,
    parent: Weak<Namespace>,
    types: Vec<Type>,
    children: Vec<Arc<Namespace>>,
}

impl Namespace {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last segment of the full name
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit('.')
            .next()
            .unwrap_or(self.full_name.as_str())
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn child_namespaces(&self) -> &[Arc<Namespace>] {
        &self.children
    }

    /// `None` for the root, or once the owning tree has been dropped
    pub fn parent_namespace(&self) -> Option<Arc<Namespace>> {
        self.parent.upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.full_name.is_empty() && self.parent.strong_count() == 0
    }
}

/// Materialized view of a module's namespaces, types and members
#[derive(Debug)]
pub struct TypeSystem {
    root: Arc<Namespace>,
}

impl TypeSystem {
    pub(crate) fn from_metadata(metadata: &MetadataReader) -> Self {
        let root = build_namespace(metadata, metadata.root_handle(), Weak::new());
        Self { root }
    }

    /// The global namespace; its full name is empty
    pub fn root_namespace(&self) -> &Arc<Namespace> {
        &self.root
    }

    /// Finds a namespace by full name
    pub fn find_namespace(&self, full_name: &str) -> Option<Arc<Namespace>> {
        fn find(ns: &Arc<Namespace>, full_name: &str) -> Option<Arc<Namespace>> {
            if ns.full_name == full_name {
                return Some(Arc::clone(ns));
            }
            ns.children.iter().find_map(|child| find(child, full_name))
        }
        find(&self.root, full_name)
    }
}

fn build_namespace(
    metadata: &MetadataReader,
    handle: NamespaceDefinitionHandle,
    parent: Weak<Namespace>,
) -> Arc<Namespace> {
    let definition = metadata.namespace_definition(handle);
    let full_name = metadata.namespace_name(handle).to_string();

    let types = definition
        .type_definitions()
        .iter()
        .map(|&type_handle| {
            let type_def = metadata.type_definition(type_handle);
            let type_name = metadata.string(type_def.name()).to_string();
            let members = type_def
                .members()
                .iter()
                .map(|m| {
                    Arc::new(Member {
                        name: metadata.string(m.name).to_string(),
                        kind: m.kind,
                        namespace: full_name.clone(),
                        declaring_type: Some(type_name.clone()),
                    })
                })
                .collect();
            Type {
                definition: Arc::new(Member {
                    name: type_name,
                    kind: MemberKind::Type,
                    namespace: full_name.clone(),
                    declaring_type: None,
                }),
                members,
            }
        })
        .collect();

    Arc::new_cyclic(|me| Namespace {
        children: definition
            .namespace_definitions()
            .iter()
            .map(|&child| build_namespace(metadata, child, me.clone()))
            .collect(),
        full_name,
        parent,
        types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::raw::MetadataBuilder;

    fn sample() -> TypeSystem {
        let mut builder = MetadataBuilder::new();
        builder.namespace("A");
        let widget = builder.add_type("A.B", "Widget");
        builder.add_member(widget, "Run", MemberKind::Method);
        builder.add_type("A.B.C", "Gear");
        builder.add_type("", "Program");
        TypeSystem::from_metadata(&builder.build())
    }

    #[test]
    fn test_tree_shape() {
        let ts = sample();
        let root = ts.root_namespace();
        assert!(root.is_root());
        assert_eq!(root.full_name(), "");
        assert_eq!(root.types().len(), 1);
        assert_eq!(root.child_namespaces().len(), 1);

        let a = &root.child_namespaces()[0];
        assert_eq!(a.full_name(), "A");
        assert!(a.types().is_empty());

        let b = &a.child_namespaces()[0];
        assert_eq!(b.full_name(), "A.B");
        assert_eq!(b.name(), "B");
        assert_eq!(b.types()[0].name(), "Widget");
    }

    #[test]
    fn test_parent_links() {
        let ts = sample();
        let c = ts.find_namespace("A.B.C").unwrap();
        let b = c.parent_namespace().unwrap();
        assert_eq!(b.full_name(), "A.B");
        let a = b.parent_namespace().unwrap();
        let root = a.parent_namespace().unwrap();
        assert!(root.is_root());
        assert!(root.parent_namespace().is_none());
    }

    #[test]
    fn test_member_names() {
        let ts = sample();
        let b = ts.find_namespace("A.B").unwrap();
        let widget = &b.types()[0];
        assert_eq!(widget.as_member().full_name(), "A.B.Widget");
        assert_eq!(widget.as_member().kind(), MemberKind::Type);

        let run = &widget.members()[0];
        assert_eq!(run.full_name(), "A.B.Widget.Run");
        assert_eq!(run.namespace(), "A.B");
        assert_eq!(run.declaring_type(), Some("Widget"));

        let program = &ts.root_namespace().types()[0];
        assert_eq!(program.as_member().full_name(), "Program");
    }
}
