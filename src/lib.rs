//! # jamgen
//!
//! Introspects a snapshot of a web application's data model and its
//! registered CRUD endpoints, and emits a language-agnostic JSON
//! description of both: a nested API routing tree and a per-entity
//! schema map. The output is consumed by a downstream front-end code
//! generator that builds client-side data bindings from it.
//!
//! ## Pipeline
//!
//! - **Endpoint resolver**: walks the endpoint registry, extracts each
//!   endpoint's visible fields into attribute/relationship bags, and
//!   builds the API tree with `"CRUD"` leaves.
//! - **Model normalizer**: walks the models of the requested
//!   applications, cross-references them against the resolver's
//!   records, and emits the final schema map with raw-metadata
//!   defaults and relationship descriptors.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jamgen::prelude::*;
//!
//! let snapshot = MetadataSnapshot::from_file(Path::new("registry.yaml"))?;
//! let generated = Generator::new(GeneratorConfig::default()).generate(&snapshot)?;
//! generated.write_api(&Destination::Stdout)?;
//! generated.write_models(&Destination::Stdout)?;
//! ```

pub mod config;
pub mod core;
pub mod generate;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::config::{
        DEFAULT_API_PREFIX, Destination, DuplicateModelPolicy, GeneratorConfig, SchemaSource,
    };
    pub use crate::core::{
        AppDescriptor, ConfigError, FieldDescriptor, JamError, MetadataSnapshot, ModelDescriptor,
        ModelRegistry, OptionSource, OptionValue, RelationDescriptor, ResolveError,
        RouteRegistration, SerializerDescriptor, VisibleField,
    };
    pub use crate::generate::{
        ApiNames, ApiNode, Generated, Generator, ModelSchema, OptionBag, ResolvedEndpoints,
    };
}

pub use crate::config::GeneratorConfig;
pub use crate::core::{JamError, MetadataSnapshot};
pub use crate::generate::{Generated, Generator};
