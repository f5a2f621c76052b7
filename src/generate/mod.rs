//! Generation pipeline: endpoint resolution, model normalization and
//! document output

pub mod normalizer;
pub mod options;
pub mod resolver;

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::config::{Destination, GeneratorConfig};
use crate::core::error::JamError;
use crate::core::snapshot::MetadataSnapshot;

pub use normalizer::{ApiNames, ModelSchema, normalize_models};
pub use options::{OptionBag, OptionSpec, extract_options};
pub use resolver::{ApiNode, EndpointRecord, ResolvedEndpoints, resolve_endpoints};

/// The two generated documents
#[derive(Debug, Clone)]
pub struct Generated {
    /// Nested routing tree (`api.json`)
    pub api: ApiNode,
    /// Entity schema map (`models.json`)
    pub models: BTreeMap<String, ModelSchema>,
}

impl Generated {
    /// Render a document as pretty JSON with stable key order and a
    /// trailing newline, so regeneration diffs stay minimal.
    fn render<T: Serialize>(value: &T) -> Result<String, JamError> {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    }

    pub fn api_document(&self) -> Result<String, JamError> {
        Self::render(&self.api)
    }

    pub fn models_document(&self) -> Result<String, JamError> {
        Self::render(&self.models)
    }

    pub fn write_api(&self, dest: &Destination) -> Result<(), JamError> {
        write_document(&self.api_document()?, dest)
    }

    pub fn write_models(&self, dest: &Destination) -> Result<(), JamError> {
        write_document(&self.models_document()?, dest)
    }
}

fn write_document(content: &str, dest: &Destination) -> Result<(), JamError> {
    match dest {
        Destination::Path(path) => {
            std::fs::write(path, content).map_err(|source| JamError::Write {
                path: path.display().to_string(),
                source,
            })
        }
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .map_err(|source| JamError::Write {
                    path: "<stdout>".to_string(),
                    source,
                })
        }
    }
}

/// Drives the whole pipeline against one metadata snapshot.
///
/// Data flows one direction: endpoint registry → resolver → (api
/// tree, intermediate records) → normalizer → final model map. No
/// state survives between runs.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run endpoint resolution then model normalization.
    ///
    /// Fatal errors abort before any document can be written.
    pub fn generate(&self, snapshot: &MetadataSnapshot) -> Result<Generated, JamError> {
        let registry = snapshot.registry();
        let resolved = resolve_endpoints(&self.config, &registry, &snapshot.endpoints)?;
        let models = normalize_models(&self.config, &registry, &resolved)?;
        Ok(Generated {
            api: resolved.api,
            models,
        })
    }
}
