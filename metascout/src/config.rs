use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::errors::SearchResult;
use crate::metadata::{load_module, Module};
use crate::search::{SearchMode, SearchQuery};

/// Default cap on collected results; the session stops once it is reached
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Configuration for a search session.
///
/// # Configuration Locations
///
/// Configuration is layered, later sources overriding earlier ones:
/// 1. Global `$CONFIG_DIR/metascout/config.yaml`
/// 2. Local `.metascout.yaml` in the current directory
/// 3. A file given explicitly (`--config`); it must exist
///
/// # Configuration Format
///
/// ```yaml
/// # Main search terms; scope prefixes (inns:, inasm:) are allowed here too
/// terms: ["Reader"]
///
/// # types-and-members | type | member | method | field | property | event
/// # | namespace | assembly | resource
/// mode: type
///
/// # Every entry must match (AND)
/// namespace_scope: ["Acme.IO"]
/// assembly_scope: ["Acme.Core"]
///
/// # Module descriptions to search (.json, .yaml, .yml)
/// module_paths: ["modules/core.yaml"]
///
/// # Worker threads (default: CPU cores)
/// thread_count: 4
///
/// # Stop after this many results (0 = unlimited)
/// max_results: 1000
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Main search terms
    #[serde(default)]
    pub terms: Vec<String>,

    /// What the main terms are matched against
    #[serde(default)]
    pub mode: SearchMode,

    /// Namespace scopes; results must lie in a namespace matching each
    #[serde(default)]
    pub namespace_scope: Vec<String>,

    /// Assembly scopes; results must come from a module matching each
    #[serde(default)]
    pub assembly_scope: Vec<String>,

    /// Module description files to search
    #[serde(default)]
    pub module_paths: Vec<PathBuf>,

    /// Number of threads to use for searching
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Maximum number of results to collect; 0 disables the cap
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            mode: SearchMode::default(),
            namespace_scope: Vec::new(),
            assembly_scope: Vec::new(),
            module_paths: Vec::new(),
            thread_count: default_thread_count(),
            max_results: default_max_results(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("metascout/config.yaml")),
            Some(PathBuf::from(".metascout.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        // CLI values take precedence over config file values
        if !cli_config.terms.is_empty() {
            self.terms = cli_config.terms;
        }
        if cli_config.mode != SearchMode::default() {
            self.mode = cli_config.mode;
        }
        if !cli_config.namespace_scope.is_empty() {
            self.namespace_scope = cli_config.namespace_scope;
        }
        if !cli_config.assembly_scope.is_empty() {
            self.assembly_scope = cli_config.assembly_scope;
        }
        if !cli_config.module_paths.is_empty() {
            self.module_paths = cli_config.module_paths;
        }
        // Always use CLI thread count if specified
        self.thread_count = cli_config.thread_count;
        if cli_config.max_results != default_max_results() {
            self.max_results = cli_config.max_results;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// The query described by this configuration.
    ///
    /// Each term is parsed on its own, so a term may itself carry scope
    /// prefixes; explicit scope fields are appended after them.
    pub fn query(&self) -> SearchQuery {
        let mut query = SearchQuery::default();
        for term in &self.terms {
            let parsed = SearchQuery::parse(term);
            query.terms.extend(parsed.terms);
            query.namespace_scope.extend(parsed.namespace_scope);
            query.assembly_scope.extend(parsed.assembly_scope);
        }
        query
            .namespace_scope
            .extend(self.namespace_scope.iter().cloned());
        query
            .assembly_scope
            .extend(self.assembly_scope.iter().cloned());
        query
    }

    /// Loads every module listed in `module_paths`, failing on the first bad file
    pub fn load_modules(&self) -> SearchResult<Vec<Arc<Module>>> {
        let modules = self
            .module_paths
            .iter()
            .map(|path| load_module(path).map(Arc::new))
            .collect::<SearchResult<Vec<_>>>()?;
        debug!("Loaded {} modules", modules.len());
        Ok(modules)
    }
}
