//! Point-in-time metadata snapshot loading

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::endpoints::RouteRegistration;
use crate::core::error::ConfigError;
use crate::core::metadata::{AppDescriptor, ModelRegistry};

/// Everything the pipeline reads: the reflected application set and
/// the ordered endpoint registry, captured at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub apps: Vec<AppDescriptor>,
    #[serde(default)]
    pub endpoints: Vec<RouteRegistration>,
}

impl MetadataSnapshot {
    /// Load a snapshot from a YAML or JSON file, dispatched on the
    /// file extension (anything other than `.json` parses as YAML,
    /// which accepts JSON input as well).
    ///
    /// Any failure here is a fatal configuration error: the registry
    /// pointer could not be resolved.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let unresolvable = |reason: String| ConfigError::UnresolvableRegistry {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| unresolvable(e.to_string()))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| unresolvable(e.to_string()))
        } else {
            serde_yaml::from_str(&content).map_err(|e| unresolvable(e.to_string()))
        }
    }

    /// Load a snapshot from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::UnresolvableRegistry {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// View over the application set for entity resolution
    pub fn registry(&self) -> ModelRegistry<'_> {
        ModelRegistry::new(&self.apps)
    }
}
