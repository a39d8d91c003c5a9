/// Error types for metascout.
///
/// Traversal itself has no recoverable failure modes: a module without a
/// resolvable type system simply yields nothing. Errors therefore live at the
/// edges of the crate:
///
/// 1. **Cancellation** - a strategy observed the session token and stopped.
///    The session runner turns this into a flag on its summary.
/// 2. **Query construction** - a `/regex/` term failed to compile.
/// 3. **Loading** - configuration files and module descriptions.
///
/// ```rust,ignore
/// match strategy.search(&module, &token) {
///     Ok(()) => {}
///     Err(SearchError::Cancelled) => return summary.cancelled(),
///     Err(e) => warn!("skipping {}: {}", module.name(), e),
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while building or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search cancelled")]
    Cancelled,
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load module {path}: {reason}")]
    ModuleLoad { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl SearchError {
    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn module_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ModuleLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the cooperative cancellation signal rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
