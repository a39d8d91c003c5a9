use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::module::{Module, ModuleBuilder};
use super::type_system::MemberKind;
use crate::errors::{SearchError, SearchResult};

/// On-disk description of a module.
///
/// Descriptions are JSON or YAML. Namespaces are listed flat by full name;
/// ancestors are created implicitly.
///
/// ```yaml
/// name: Acme.Core
/// full_name: "Acme.Core, Version=1.0.0.0"
/// resources: ["Acme.Core.Strings.resources"]
/// namespaces:
///   - name: Acme.Core.IO
///     types:
///       - name: FileReader
///         members:
///           - { name: Open, kind: method }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescription {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_resolvable")]
    pub resolvable: bool,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDescription {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescription {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDescription {
    pub name: String,
    pub kind: MemberKind,
}

fn default_resolvable() -> bool {
    true
}

impl ModuleDescription {
    pub fn into_module(self) -> Module {
        let mut builder = ModuleBuilder::new(self.name);
        if let Some(full_name) = self.full_name {
            builder = builder.full_name(full_name);
        }
        if !self.resolvable {
            builder = builder.unresolvable();
        }
        for resource in self.resources {
            builder = builder.add_resource(resource);
        }
        for ns in &self.namespaces {
            builder = builder.add_namespace(&ns.name);
            for ty in &ns.types {
                builder = builder.add_type(&ns.name, &ty.name);
                for member in &ty.members {
                    builder = builder.add_member(&ns.name, &ty.name, &member.name, member.kind);
                }
            }
        }
        builder.build()
    }
}

/// Loads a module description, choosing the format from the file extension
pub fn load_module(path: &Path) -> SearchResult<Module> {
    let content = fs::read_to_string(path)?;
    let description: ModuleDescription = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => {
            return Err(SearchError::module_load(
                path,
                "unsupported extension (expected .json, .yaml or .yml)",
            ))
        }
    };

    debug!(
        "Loaded module {} with {} namespaces from {}",
        description.name,
        description.namespaces.len(),
        path.display()
    );

    let mut module = description.into_module();
    module.set_file_name(path);
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_yaml_module() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.yaml");
        fs::write(
            &path,
            r#"
name: Acme.Core
full_name: "Acme.Core, Version=1.0.0.0"
resources: ["Acme.Core.Strings.resources"]
namespaces:
  - name: Acme.Core.IO
    types:
      - name: FileReader
        members:
          - { name: Open, kind: method }
          - { name: Length, kind: property }
"#,
        )
        .unwrap();

        let module = load_module(&path).unwrap();
        assert_eq!(module.name(), "Acme.Core");
        assert_eq!(module.full_name(), "Acme.Core, Version=1.0.0.0");
        assert_eq!(module.file_name(), Some(path.as_path()));
        assert_eq!(module.resources(), ["Acme.Core.Strings.resources"]);

        let ts = module.type_system().unwrap();
        let io = ts.find_namespace("Acme.Core.IO").unwrap();
        assert_eq!(io.types()[0].members().len(), 2);
        assert!(ts.find_namespace("Acme.Core").unwrap().types().is_empty());
    }

    #[test]
    fn test_load_json_module() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("native.json");
        fs::write(
            &path,
            r#"{ "name": "native", "resolvable": false,
                 "namespaces": [ { "name": "X", "types": [ { "name": "T" } ] } ] }"#,
        )
        .unwrap();

        let module = load_module(&path).unwrap();
        assert_eq!(module.full_name(), "native");
        assert!(module.type_system().is_none());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.txt");
        fs::write(&path, "name: core").unwrap();
        let err = load_module(&path).unwrap_err();
        assert!(matches!(err, SearchError::ModuleLoad { .. }));
    }

    #[test]
    fn test_invalid_member_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(
            &path,
            "name: bad\nnamespaces:\n  - name: A\n    types:\n      - name: T\n        members:\n          - { name: x, kind: lambda }\n",
        )
        .unwrap();
        assert!(matches!(
            load_module(&path),
            Err(SearchError::YamlError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_module(Path::new("does-not-exist.json"));
        assert!(matches!(result, Err(SearchError::IoError(_))));
    }
}
