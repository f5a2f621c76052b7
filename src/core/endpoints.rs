//! Endpoint registrations and serializer descriptors
//!
//! The endpoint registry is an ordered list of registrations, each
//! naming a route, a singular identifier, an optional backing entity
//! and an optional serializer describing the fields the endpoint
//! exposes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::metadata::OptionSource;
use crate::core::value::OptionValue;

/// A registered CRUD endpoint.
///
/// `name` is the route name and may contain `/`, which nests extra
/// levels into the API tree. Registrations without a resolvable
/// backing entity or without a serializer are skipped during
/// resolution, never treated as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRegistration {
    pub name: String,
    /// Caller-chosen singular identifier for the backing entity
    pub single: String,
    /// Backing entity reference (`Model` or `app.Model`)
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub serializer: Option<SerializerDescriptor>,
}

/// The field-visibility list an endpoint's serializer declares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializerDescriptor {
    /// Serializer type name, matched against the exclusion set
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<VisibleField>,
}

/// One visible field, with its descriptive options in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibleField {
    pub name: String,
    /// Whether the field carries relation markers
    #[serde(default)]
    pub relation: bool,
    #[serde(default)]
    pub options: IndexMap<String, OptionValue>,
}

impl OptionSource for VisibleField {
    fn option(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name).cloned()
    }
}
