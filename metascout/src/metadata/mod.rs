//! Read-only model of a compiled module's metadata.
//!
//! Two views are offered over the same data:
//!
//! - [`MetadataReader`]: flat definition tables addressed by handles. Cheap to
//!   walk, used for existence checks.
//! - [`TypeSystem`]: a materialized namespace tree with parent links, types and
//!   members. Built lazily per module and used for full traversal.
//!
//! Nothing in the search core mutates a module.
mod loader;
mod module;
mod raw;
mod type_system;

pub use loader::{
    load_module, MemberDescription, ModuleDescription, NamespaceDescription, TypeDescription,
};
pub use module::{Module, ModuleBuilder};
pub use raw::{
    MemberDefinition, MetadataReader, NamespaceDefinition, NamespaceDefinitionHandle,
    StringHandle, TypeDefinition, TypeDefinitionHandle,
};
pub use type_system::{Member, MemberKind, Namespace, Type, TypeSystem};
