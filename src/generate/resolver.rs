//! Endpoint resolution
//!
//! Walks the endpoint registry in order, extracts each endpoint's
//! visible fields into attribute and relationship bags, and builds the
//! nested API routing tree. The serializer's visibility list is the
//! only source of field names here; raw metadata is consulted solely
//! to enrich relation fields with target information.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::config::GeneratorConfig;
use crate::core::endpoints::RouteRegistration;
use crate::core::error::{JamError, ResolveError};
use crate::core::metadata::{ModelRef, ModelRegistry};
use crate::generate::options::{
    OptionBag, SERIALIZER_ATTRIBUTE_OPTIONS, SERIALIZER_RELATION_OPTIONS, extract_options,
};

/// Leaf marker for routes supporting full CRUD
pub const CRUD_MARKER: &str = "CRUD";

/// The nested routing tree; leaves serialize as the `"CRUD"` string
#[derive(Debug, Clone, PartialEq)]
pub enum ApiNode {
    Tree(BTreeMap<String, ApiNode>),
    Crud,
}

impl ApiNode {
    pub fn tree() -> Self {
        ApiNode::Tree(BTreeMap::new())
    }

    /// Insert a CRUD leaf at the given path, creating intermediate
    /// levels as needed. A leaf in the middle of the path is widened
    /// into a tree; either direction of collision is last-write-wins
    /// and reported through the warning channel.
    pub fn insert_crud(&mut self, segments: &[&str]) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let mut node = self;
        for seg in parents {
            if matches!(node, ApiNode::Crud) {
                tracing::warn!(segment = %seg, "route path descends through a CRUD leaf, widening it");
            }
            node = node
                .as_tree_mut()
                .entry((*seg).to_string())
                .or_insert_with(ApiNode::tree);
        }
        if matches!(node, ApiNode::Crud) {
            tracing::warn!(segment = %last, "route path descends through a CRUD leaf, widening it");
        }
        let map = node.as_tree_mut();
        if matches!(map.get(*last), Some(ApiNode::Tree(_))) {
            tracing::warn!(segment = %last, "route collides with an existing subtree, replacing it");
        }
        map.insert((*last).to_string(), ApiNode::Crud);
    }

    fn as_tree_mut(&mut self) -> &mut BTreeMap<String, ApiNode> {
        if matches!(self, ApiNode::Crud) {
            *self = ApiNode::tree();
        }
        match self {
            ApiNode::Tree(map) => map,
            ApiNode::Crud => unreachable!(),
        }
    }
}

impl Default for ApiNode {
    fn default() -> Self {
        ApiNode::tree()
    }
}

impl Serialize for ApiNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiNode::Crud => serializer.serialize_str(CRUD_MARKER),
            ApiNode::Tree(map) => map.serialize(serializer),
        }
    }
}

/// Intermediate per-entity record produced by endpoint resolution
#[derive(Debug, Clone)]
pub struct EndpointRecord {
    /// Plural name, taken from the route name
    pub plural: String,
    /// Qualified identity of the backing entity, kept for the
    /// normalizer's filtering step and never emitted
    pub entity: String,
    pub attributes: BTreeMap<String, OptionBag>,
    pub relationships: BTreeMap<String, OptionBag>,
}

/// Terminal state of endpoint resolution
#[derive(Debug, Clone, Default)]
pub struct ResolvedEndpoints {
    pub api: ApiNode,
    /// Intermediate records keyed by singular identifier, in
    /// registration order
    pub records: IndexMap<String, EndpointRecord>,
}

/// Walk the endpoint registry and produce the API tree plus the
/// intermediate entity records.
///
/// Registrations without a resolvable backing entity or serializer
/// are skipped. Two registrations claiming the same singular
/// identifier, or backed by the same entity, are a fatal error.
pub fn resolve_endpoints(
    config: &GeneratorConfig,
    registry: &ModelRegistry<'_>,
    endpoints: &[RouteRegistration],
) -> Result<ResolvedEndpoints, JamError> {
    let prefix = config.resolved_prefix()?;
    let prefix_segments: Vec<&str> = prefix.split('/').collect();

    let mut api = ApiNode::tree();
    let mut records: IndexMap<String, EndpointRecord> = IndexMap::new();
    let mut claimed_entities: HashMap<String, String> = HashMap::new();

    for registration in endpoints {
        if config.exclude_endpoints.contains(&registration.name) {
            tracing::debug!(route = %registration.name, "endpoint excluded by configuration");
            continue;
        }
        let Some(model) = registration
            .entity
            .as_deref()
            .and_then(|entity| registry.resolve(entity))
        else {
            tracing::debug!(route = %registration.name, "endpoint has no backing entity, skipping");
            continue;
        };
        let Some(serializer) = &registration.serializer else {
            tracing::debug!(route = %registration.name, "endpoint has no serializer, skipping");
            continue;
        };
        if config.exclude_serializers.contains(&serializer.type_name) {
            tracing::debug!(
                route = %registration.name,
                serializer = %serializer.type_name,
                "serializer excluded by configuration"
            );
            continue;
        }

        let mut attributes = BTreeMap::new();
        let mut relationships = BTreeMap::new();
        for field in &serializer.fields {
            if field.name == "id" {
                continue;
            }
            if field.relation {
                if let Some(bag) = relation_bag(&model, field) {
                    relationships.insert(field.name.clone(), bag);
                }
            } else {
                attributes.insert(
                    field.name.clone(),
                    extract_options(field, SERIALIZER_ATTRIBUTE_OPTIONS),
                );
            }
        }

        let mut segments = prefix_segments.clone();
        segments.extend(registration.name.split('/'));
        api.insert_crud(&segments);

        if let Some(existing) = records.get(&registration.single) {
            return Err(ResolveError::DuplicateEndpoint {
                single: registration.single.clone(),
                first: existing.plural.clone(),
                second: registration.name.clone(),
            }
            .into());
        }
        let entity_id = model.id();
        if let Some(first) = claimed_entities.get(&entity_id) {
            return Err(ResolveError::DuplicateEntity {
                entity: entity_id,
                first: first.clone(),
                second: registration.name.clone(),
            }
            .into());
        }
        claimed_entities.insert(entity_id.clone(), registration.name.clone());
        records.insert(
            registration.single.clone(),
            EndpointRecord {
                plural: registration.name.clone(),
                entity: entity_id,
                attributes,
                relationships,
            },
        );
    }

    Ok(ResolvedEndpoints { api, records })
}

/// Build a relationship bag for a serializer relation field, enriched
/// from the raw forward-relation descriptor. Returns `None` (and
/// warns) when raw metadata has no matching relation.
fn relation_bag(
    model: &ModelRef<'_>,
    field: &crate::core::endpoints::VisibleField,
) -> Option<OptionBag> {
    let Some(relation) = model
        .model
        .relations
        .iter()
        .find(|r| r.field.name == field.name)
    else {
        tracing::warn!(
            model = %model.model.name,
            field = %field.name,
            "serializer marks field as relation but metadata has no matching descriptor"
        );
        return None;
    };
    let mut bag = extract_options(field, SERIALIZER_RELATION_OPTIONS);
    bag.insert("type".to_string(), relation.target.clone().into());
    if let Some(related_name) = &relation.related_name {
        bag.insert("relatedName".to_string(), related_name.clone().into());
    }
    if relation.to_many {
        bag.insert("many".to_string(), true.into());
    }
    Some(bag)
}
