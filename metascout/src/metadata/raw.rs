use std::collections::HashMap;

use super::MemberKind;

/// Index into the metadata string heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringHandle(u32);

/// Index into the namespace definition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceDefinitionHandle(u32);

/// Index into the type definition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefinitionHandle(u32);

/// One row of the namespace definition table.
///
/// The name resolves to the full dotted namespace name; the root row resolves
/// to the empty string.
#[derive(Debug, Clone)]
pub struct NamespaceDefinition {
    name: StringHandle,
    parent: Option<NamespaceDefinitionHandle>,
    type_definitions: Vec<TypeDefinitionHandle>,
    namespace_definitions: Vec<NamespaceDefinitionHandle>,
}

impl NamespaceDefinition {
    pub fn name(&self) -> StringHandle {
        self.name
    }

    pub fn parent(&self) -> Option<NamespaceDefinitionHandle> {
        self.parent
    }

    /// Types declared directly in this namespace
    pub fn type_definitions(&self) -> &[TypeDefinitionHandle] {
        &self.type_definitions
    }

    /// Direct child namespaces
    pub fn namespace_definitions(&self) -> &[NamespaceDefinitionHandle] {
        &self.namespace_definitions
    }
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: StringHandle,
    namespace: NamespaceDefinitionHandle,
    members: Vec<MemberDefinition>,
}

impl TypeDefinition {
    pub fn name(&self) -> StringHandle {
        self.name
    }

    pub fn namespace(&self) -> NamespaceDefinitionHandle {
        self.namespace
    }

    pub fn members(&self) -> &[MemberDefinition] {
        &self.members
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MemberDefinition {
    pub name: StringHandle,
    pub kind: MemberKind,
}

/// Flat, handle-addressed view of a module's metadata tables.
///
/// Walking this view is cheap: nothing is allocated beyond what the tables
/// already hold, which is what makes it suitable for existence checks.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    strings: Vec<String>,
    namespaces: Vec<NamespaceDefinition>,
    types: Vec<TypeDefinition>,
}

impl MetadataReader {
    pub fn namespace_definition_root(&self) -> &NamespaceDefinition {
        &self.namespaces[0]
    }

    pub fn root_handle(&self) -> NamespaceDefinitionHandle {
        NamespaceDefinitionHandle(0)
    }

    pub fn namespace_definition(&self, handle: NamespaceDefinitionHandle) -> &NamespaceDefinition {
        &self.namespaces[handle.0 as usize]
    }

    pub fn type_definition(&self, handle: TypeDefinitionHandle) -> &TypeDefinition {
        &self.types[handle.0 as usize]
    }

    pub fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    pub fn string(&self, handle: StringHandle) -> &str {
        &self.strings[handle.0 as usize]
    }

    /// Resolves the full name of a namespace definition
    pub fn namespace_name(&self, handle: NamespaceDefinitionHandle) -> &str {
        self.string(self.namespace_definition(handle).name)
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }
}

/// Builds a consistent [`MetadataReader`]; every handle it hands out is valid
/// for the reader it produces.
#[derive(Debug)]
pub(crate) struct MetadataBuilder {
    strings: Vec<String>,
    string_index: HashMap<String, StringHandle>,
    namespaces: Vec<NamespaceDefinition>,
    namespace_index: HashMap<String, NamespaceDefinitionHandle>,
    types: Vec<TypeDefinition>,
}

impl MetadataBuilder {
    pub(crate) fn new() -> Self {
        let mut builder = Self {
            strings: Vec::new(),
            string_index: HashMap::new(),
            namespaces: Vec::new(),
            namespace_index: HashMap::new(),
            types: Vec::new(),
        };
        let name = builder.intern("");
        builder.namespaces.push(NamespaceDefinition {
            name,
            parent: None,
            type_definitions: Vec::new(),
            namespace_definitions: Vec::new(),
        });
        builder
            .namespace_index
            .insert(String::new(), NamespaceDefinitionHandle(0));
        builder
    }

    fn intern(&mut self, value: &str) -> StringHandle {
        if let Some(handle) = self.string_index.get(value) {
            return *handle;
        }
        let handle = StringHandle(self.strings.len() as u32);
        self.strings.push(value.to_string());
        self.string_index.insert(value.to_string(), handle);
        handle
    }

    /// Returns the handle for `full_name`, creating it and any missing
    /// ancestors. Empty segments are ignored, so `""` is the root.
    pub(crate) fn namespace(&mut self, full_name: &str) -> NamespaceDefinitionHandle {
        let mut current = NamespaceDefinitionHandle(0);
        let mut path = String::new();
        for segment in full_name.split('.').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);

            current = match self.namespace_index.get(&path) {
                Some(handle) => *handle,
                None => {
                    let handle = NamespaceDefinitionHandle(self.namespaces.len() as u32);
                    let name = self.intern(&path);
                    self.namespaces.push(NamespaceDefinition {
                        name,
                        parent: Some(current),
                        type_definitions: Vec::new(),
                        namespace_definitions: Vec::new(),
                    });
                    self.namespaces[current.0 as usize]
                        .namespace_definitions
                        .push(handle);
                    self.namespace_index.insert(path.clone(), handle);
                    handle
                }
            };
        }
        current
    }

    pub(crate) fn add_type(&mut self, namespace: &str, name: &str) -> TypeDefinitionHandle {
        let ns = self.namespace(namespace);
        let name = self.intern(name);
        let handle = TypeDefinitionHandle(self.types.len() as u32);
        self.types.push(TypeDefinition {
            name,
            namespace: ns,
            members: Vec::new(),
        });
        self.namespaces[ns.0 as usize].type_definitions.push(handle);
        handle
    }

    pub(crate) fn add_member(&mut self, owner: TypeDefinitionHandle, name: &str, kind: MemberKind) {
        let name = self.intern(name);
        self.types[owner.0 as usize]
            .members
            .push(MemberDefinition { name, kind });
    }

    pub(crate) fn build(self) -> MetadataReader {
        MetadataReader {
            strings: self.strings,
            namespaces: self.namespaces,
            types: self.types,
        }
    }
}
