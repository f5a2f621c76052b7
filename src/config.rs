//! Generation configuration
//!
//! An explicit configuration struct passed into the orchestration
//! entry point; nothing here is read from ambient global state.

use std::path::PathBuf;

use crate::core::error::ConfigError;

/// Global default for the API path prefix
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Which option bags the final model document is built from.
///
/// The two strategies are alternative code paths; they are never
/// merged into one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SchemaSource {
    /// Serializer-derived bags for endpoint-backed entities, raw
    /// metadata extraction for the rest
    #[default]
    Serializer,
    /// Raw metadata extraction for every entity
    #[value(name = "raw")]
    RawMetadata,
}

/// How a display-name collision between two distinct entities is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DuplicateModelPolicy {
    /// Qualify the later entity as `app.Model`, warn and continue
    #[default]
    Qualify,
    /// Abort with a duplicate-model error
    Fail,
}

/// Where a generated document is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Path(PathBuf),
    Stdout,
}

impl Destination {
    /// Parse a CLI destination argument; `-` selects stdout
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Destination::Stdout
        } else {
            Destination::Path(PathBuf::from(arg))
        }
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Applications to include; empty means all
    pub apps: Vec<String>,
    /// API path prefix; falls back to [`DEFAULT_API_PREFIX`]
    pub api_prefix: Option<String>,
    /// Route names to skip during endpoint resolution
    pub exclude_endpoints: Vec<String>,
    /// Serializer type names to skip during endpoint resolution
    pub exclude_serializers: Vec<String>,
    pub schema_source: SchemaSource,
    pub duplicate_models: DuplicateModelPolicy,
}

impl GeneratorConfig {
    /// Resolve the effective API prefix.
    ///
    /// Takes the explicit value when present, else the global default,
    /// strips one leading and one trailing `/`, and fails when the
    /// result is empty.
    pub fn resolved_prefix(&self) -> Result<String, ConfigError> {
        let prefix = self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX);
        let prefix = prefix.strip_prefix('/').unwrap_or(prefix);
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        if prefix.is_empty() {
            return Err(ConfigError::MissingApiPrefix);
        }
        Ok(prefix.to_string())
    }

    /// Whether an application belongs to the requested set
    pub fn includes_app(&self, app: &str) -> bool {
        self.apps.is_empty() || self.apps.iter().any(|a| a == app)
    }
}
