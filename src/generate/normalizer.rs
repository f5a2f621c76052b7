//! Model normalization
//!
//! Walks the models declared by the requested applications,
//! cross-references them against the endpoint resolver's intermediate
//! records, and emits the final per-entity schema map. This is the
//! only place raw metadata fields and defaults are read.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::{DuplicateModelPolicy, GeneratorConfig, SchemaSource};
use crate::core::error::{JamError, ResolveError};
use crate::core::metadata::{ModelDescriptor, ModelRef, ModelRegistry};
use crate::generate::options::{
    OptionBag, RAW_ATTRIBUTE_OPTIONS, RAW_RELATION_OPTIONS, extract_options,
};
use crate::generate::resolver::ResolvedEndpoints;

/// API naming block for endpoint-backed entities
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiNames {
    pub plural: String,
    pub single: String,
}

/// Final schema for one entity
#[derive(Debug, Clone, Serialize)]
pub struct ModelSchema {
    pub attributes: BTreeMap<String, OptionBag>,
    pub relationships: BTreeMap<String, OptionBag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiNames>,
}

/// Build the final entity schema map.
///
/// Entities are enumerated per requested application (empty set means
/// all), so endpoint records whose entity lies outside the requested
/// set never appear. Display-name collisions between distinct
/// entities are resolved per the configured policy.
pub fn normalize_models(
    config: &GeneratorConfig,
    registry: &ModelRegistry<'_>,
    resolved: &ResolvedEndpoints,
) -> Result<BTreeMap<String, ModelSchema>, JamError> {
    // entity id -> (singular key, record)
    let endpoint_backed: HashMap<&str, (&str, &crate::generate::resolver::EndpointRecord)> =
        resolved
            .records
            .iter()
            .map(|(single, record)| (record.entity.as_str(), (single.as_str(), record)))
            .collect();

    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut out = BTreeMap::new();

    for app in registry.apps() {
        if !config.includes_app(&app.name) {
            continue;
        }
        for model in &app.models {
            let model_ref = ModelRef { app, model };
            let entity_id = model_ref.id();
            let backing = endpoint_backed.get(entity_id.as_str());

            let (attributes, relationships) = match (config.schema_source, backing) {
                (SchemaSource::Serializer, Some((_, record))) => {
                    (record.attributes.clone(), record.relationships.clone())
                }
                _ => raw_bags(model),
            };
            let api = backing.map(|(single, record)| ApiNames {
                plural: record.plural.clone(),
                single: (*single).to_string(),
            });

            let key = match claimed.get(&model.name) {
                None => {
                    claimed.insert(model.name.clone(), app.name.clone());
                    model.name.clone()
                }
                Some(first_app) => match config.duplicate_models {
                    DuplicateModelPolicy::Qualify => {
                        tracing::warn!(
                            model = %model.name,
                            first_app = %first_app,
                            second_app = %app.name,
                            "duplicate model name, qualifying with application name"
                        );
                        entity_id.clone()
                    }
                    DuplicateModelPolicy::Fail => {
                        return Err(ResolveError::DuplicateModelName {
                            name: model.name.clone(),
                            first_app: first_app.clone(),
                            second_app: app.name.clone(),
                        }
                        .into());
                    }
                },
            };
            out.insert(
                key,
                ModelSchema {
                    attributes,
                    relationships,
                    api,
                },
            );
        }
    }
    Ok(out)
}

/// Extract attribute and relationship bags from raw metadata,
/// bypassing any serializer. Relationship bags always carry the
/// target `type`, plus `relatedName` and `many` when declared.
fn raw_bags(model: &ModelDescriptor) -> (BTreeMap<String, OptionBag>, BTreeMap<String, OptionBag>) {
    let mut attributes = BTreeMap::new();
    let mut relationships = BTreeMap::new();
    for field in &model.fields {
        if field.name == "id" {
            continue;
        }
        attributes.insert(
            field.name.clone(),
            extract_options(field, RAW_ATTRIBUTE_OPTIONS),
        );
    }
    for relation in &model.relations {
        if relation.field.name == "id" {
            continue;
        }
        let mut bag = extract_options(relation, RAW_RELATION_OPTIONS);
        bag.insert("type".to_string(), relation.target.clone().into());
        if let Some(related_name) = &relation.related_name {
            bag.insert("relatedName".to_string(), related_name.clone().into());
        }
        if relation.to_many {
            bag.insert("many".to_string(), true.into());
        }
        relationships.insert(relation.field.name.clone(), bag);
    }
    (attributes, relationships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::core::metadata::{AppDescriptor, FieldDescriptor, RelationDescriptor};
    use crate::core::value::OptionValue;
    use crate::generate::resolver::resolve_endpoints;

    fn field(name: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            label: None,
            read_only: false,
            required: false,
            blank: true,
            null: true,
            default: OptionValue::not_provided(),
            max_length: None,
            choices: vec![],
        }
    }

    fn apps_with_two_widgets() -> Vec<AppDescriptor> {
        vec![
            AppDescriptor {
                name: "shop".to_string(),
                models: vec![ModelDescriptor {
                    name: "Widget".to_string(),
                    fields: vec![field("name")],
                    relations: vec![],
                }],
            },
            AppDescriptor {
                name: "blog".to_string(),
                models: vec![ModelDescriptor {
                    name: "Widget".to_string(),
                    fields: vec![],
                    relations: vec![],
                }],
            },
        ]
    }

    fn empty_resolved() -> ResolvedEndpoints {
        ResolvedEndpoints::default()
    }

    #[test]
    fn test_raw_defaults_read_from_metadata() {
        let mut f = field("count");
        f.default = OptionValue::Int(3);
        let apps = vec![AppDescriptor {
            name: "shop".to_string(),
            models: vec![ModelDescriptor {
                name: "Widget".to_string(),
                fields: vec![f, field("id")],
                relations: vec![],
            }],
        }];
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig::default();
        let models = normalize_models(&config, &registry, &empty_resolved()).unwrap();
        let widget = &models["Widget"];
        assert_eq!(widget.attributes["count"]["default"], json!(3));
        assert!(!widget.attributes.contains_key("id"));
        assert!(widget.api.is_none());
    }

    #[test]
    fn test_callable_default_is_not_emitted() {
        let mut f = field("created");
        f.default = OptionValue::Factory;
        let apps = vec![AppDescriptor {
            name: "shop".to_string(),
            models: vec![ModelDescriptor {
                name: "Widget".to_string(),
                fields: vec![f],
                relations: vec![],
            }],
        }];
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig::default();
        let models = normalize_models(&config, &registry, &empty_resolved()).unwrap();
        assert!(models["Widget"].attributes["created"].is_empty());
    }

    #[test]
    fn test_raw_relationships_carry_target_info() {
        let apps = vec![AppDescriptor {
            name: "shop".to_string(),
            models: vec![ModelDescriptor {
                name: "Widget".to_string(),
                fields: vec![],
                relations: vec![RelationDescriptor {
                    field: field("tags"),
                    target: "Tag".to_string(),
                    to_many: true,
                    related_name: Some("widgets".to_string()),
                }],
            }],
        }];
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig::default();
        let models = normalize_models(&config, &registry, &empty_resolved()).unwrap();
        let bag = &models["Widget"].relationships["tags"];
        assert_eq!(bag["type"], json!("Tag"));
        assert_eq!(bag["relatedName"], json!("widgets"));
        assert_eq!(bag["many"], json!(true));
    }

    #[test]
    fn test_entities_outside_requested_apps_are_dropped() {
        let apps = apps_with_two_widgets();
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig {
            apps: vec!["blog".to_string()],
            ..Default::default()
        };
        let models = normalize_models(&config, &registry, &empty_resolved()).unwrap();
        assert_eq!(models.len(), 1);
        assert!(models.contains_key("Widget"));
        assert!(models["Widget"].attributes.is_empty());
    }

    #[test]
    fn test_duplicate_names_qualified_with_app() {
        let apps = apps_with_two_widgets();
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig::default();
        let models = normalize_models(&config, &registry, &empty_resolved()).unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.contains_key("Widget"));
        assert!(models.contains_key("blog.Widget"));
    }

    #[test]
    fn test_duplicate_names_fatal_under_fail_policy() {
        let apps = apps_with_two_widgets();
        let registry = ModelRegistry::new(&apps);
        let config = GeneratorConfig {
            duplicate_models: DuplicateModelPolicy::Fail,
            ..Default::default()
        };
        let err = normalize_models(&config, &registry, &empty_resolved()).unwrap_err();
        assert!(matches!(
            err,
            JamError::Resolve(ResolveError::DuplicateModelName { .. })
        ));
    }

    #[test]
    fn test_raw_source_ignores_serializer_bags() {
        use crate::core::endpoints::{RouteRegistration, SerializerDescriptor, VisibleField};
        use indexmap::IndexMap;

        let mut f = field("name");
        f.required = true;
        let apps = vec![AppDescriptor {
            name: "shop".to_string(),
            models: vec![ModelDescriptor {
                name: "Widget".to_string(),
                fields: vec![f],
                relations: vec![],
            }],
        }];
        let registry = ModelRegistry::new(&apps);
        let mut options = IndexMap::new();
        options.insert("label".to_string(), OptionValue::Str("Name".to_string()));
        let endpoints = [RouteRegistration {
            name: "widgets".to_string(),
            single: "widget".to_string(),
            entity: Some("Widget".to_string()),
            serializer: Some(SerializerDescriptor {
                type_name: "WidgetSerializer".to_string(),
                fields: vec![VisibleField {
                    name: "name".to_string(),
                    relation: false,
                    options,
                }],
            }),
        }];
        let config = GeneratorConfig {
            schema_source: SchemaSource::RawMetadata,
            ..Default::default()
        };
        let resolved = resolve_endpoints(&config, &registry, &endpoints).unwrap();
        let models = normalize_models(&config, &registry, &resolved).unwrap();
        let widget = &models["Widget"];
        // Raw bag, not the serializer-derived one
        assert_eq!(widget.attributes["name"], {
            let mut bag = OptionBag::new();
            bag.insert("required".to_string(), json!(true));
            bag
        });
        // api names still attached
        assert_eq!(
            widget.api,
            Some(ApiNames {
                plural: "widgets".to_string(),
                single: "widget".to_string(),
            })
        );
    }
}
