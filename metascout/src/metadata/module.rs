use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::raw::{MetadataBuilder, MetadataReader, TypeDefinitionHandle};
use super::type_system::{MemberKind, TypeSystem};

/// One compiled module.
///
/// A module is immutable once built and is shared between concurrent searches
/// behind an `Arc`. The type system is materialized lazily on first use; a
/// module marked unresolvable never produces one.
pub struct Module {
    name: String,
    full_name: String,
    file_name: Option<PathBuf>,
    resources: Vec<String>,
    resolvable: bool,
    metadata: MetadataReader,
    type_system: OnceCell<Option<TypeSystem>>,
}

impl Module {
    /// Simple display name, e.g. `Acme.Core`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full identity string, e.g. `Acme.Core, Version=1.0.0.0`
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn metadata(&self) -> &MetadataReader {
        &self.metadata
    }

    /// The materialized type system, or `None` when the module has no
    /// resolvable type-system view
    pub fn type_system(&self) -> Option<&TypeSystem> {
        self.type_system
            .get_or_init(|| {
                if self.resolvable {
                    Some(TypeSystem::from_metadata(&self.metadata))
                } else {
                    warn!("Module {} has no resolvable type system", self.name);
                    None
                }
            })
            .as_ref()
    }

    pub(crate) fn set_file_name(&mut self, path: impl Into<PathBuf>) {
        self.file_name = Some(path.into());
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("full_name", &self.full_name)
            .field("namespaces", &self.metadata.namespace_count())
            .field("resolvable", &self.resolvable)
            .finish()
    }
}

/// Builds a [`Module`] in code.
///
/// ```rust,ignore
/// let module = ModuleBuilder::new("Acme.Core")
///     .add_type("Acme.Core.IO", "FileReader")
///     .add_member("Acme.Core.IO", "FileReader", "Open", MemberKind::Method)
///     .build();
/// ```
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    full_name: Option<String>,
    resources: Vec<String>,
    resolvable: bool,
    metadata: MetadataBuilder,
    type_index: HashMap<(String, String), TypeDefinitionHandle>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            resources: Vec::new(),
            resolvable: true,
            metadata: MetadataBuilder::new(),
            type_index: HashMap::new(),
        }
    }

    /// Sets the full identity; defaults to the simple name
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Declares a namespace (and its ancestors) without adding types to it
    pub fn add_namespace(mut self, full_name: &str) -> Self {
        self.metadata.namespace(full_name);
        self
    }

    pub fn add_type(mut self, namespace: &str, name: &str) -> Self {
        self.type_handle(namespace, name);
        self
    }

    /// Adds a member, declaring the owning type first if needed
    pub fn add_member(mut self, namespace: &str, type_name: &str, name: &str, kind: MemberKind) -> Self {
        let owner = self.type_handle(namespace, type_name);
        self.metadata.add_member(owner, name, kind);
        self
    }

    pub fn add_resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    /// Marks the module as having no resolvable type system
    pub fn unresolvable(mut self) -> Self {
        self.resolvable = false;
        self
    }

    pub fn build(self) -> Module {
        Module {
            full_name: self.full_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            file_name: None,
            resources: self.resources,
            resolvable: self.resolvable,
            metadata: self.metadata.build(),
            type_system: OnceCell::new(),
        }
    }

    fn type_handle(&mut self, namespace: &str, name: &str) -> TypeDefinitionHandle {
        let key = (namespace.to_string(), name.to_string());
        if let Some(handle) = self.type_index.get(&key) {
            return *handle;
        }
        let handle = self.metadata.add_type(namespace, name);
        self.type_index.insert(key, handle);
        handle
    }
}
