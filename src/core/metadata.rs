//! Application, model, field and relation descriptors
//!
//! These mirror the shape an ORM metadata registry presents: per
//! application, the models it declares; per model, its scalar fields
//! and forward relations. They are plain serde data loaded from a
//! [`MetadataSnapshot`](crate::core::snapshot::MetadataSnapshot).

use serde::{Deserialize, Serialize};

use crate::core::value::OptionValue;

/// Capability-query interface for option extraction.
///
/// A field-like object exposes descriptive properties by name;
/// returning `None` means the property is not exposed at all, which
/// the extractor treats as "skip silently".
pub trait OptionSource {
    fn option(&self, name: &str) -> Option<OptionValue>;
}

/// An application and the models it declares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub name: String,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// A reflected model: identity plus ordered field and relation lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,
}

/// A scalar field as reflected from the metadata registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Human-readable label; `None` means unset
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub blank: bool,
    #[serde(default = "default_true")]
    pub null: bool,
    /// Declared default value; `NotProvided` when the field has none
    #[serde(
        default = "OptionValue::not_provided",
        skip_serializing_if = "OptionValue::is_not_provided"
    )]
    pub default: OptionValue,
    #[serde(default)]
    pub max_length: Option<u64>,
    /// Ordered set of allowed values; empty means unconstrained
    #[serde(default)]
    pub choices: Vec<OptionValue>,
}

fn default_true() -> bool {
    true
}

impl OptionSource for FieldDescriptor {
    fn option(&self, name: &str) -> Option<OptionValue> {
        match name {
            "verbose_name" => Some(
                self.label
                    .clone()
                    .map_or(OptionValue::Null, OptionValue::Str),
            ),
            "read_only" => Some(OptionValue::Bool(self.read_only)),
            "required" => Some(OptionValue::Bool(self.required)),
            "blank" => Some(OptionValue::Bool(self.blank)),
            "null" => Some(OptionValue::Bool(self.null)),
            "default" => Some(self.default.clone()),
            "max_length" => Some(
                self.max_length
                    .map_or(OptionValue::Null, |n| OptionValue::Int(n as i64)),
            ),
            "choices" => Some(OptionValue::List(self.choices.clone())),
            _ => None,
        }
    }
}

/// A forward relation: a field descriptor plus target information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDescriptor {
    #[serde(flatten)]
    pub field: FieldDescriptor,
    /// Display name of the target entity
    pub target: String,
    #[serde(default)]
    pub to_many: bool,
    /// Declared inverse-relation name; `None` when the source
    /// suppresses the inverse
    #[serde(default)]
    pub related_name: Option<String>,
}

impl OptionSource for RelationDescriptor {
    fn option(&self, name: &str) -> Option<OptionValue> {
        self.field.option(name)
    }
}

/// A resolved model together with its declaring application
#[derive(Debug, Clone, Copy)]
pub struct ModelRef<'a> {
    pub app: &'a AppDescriptor,
    pub model: &'a ModelDescriptor,
}

impl ModelRef<'_> {
    /// Qualified identity, unique across the whole registry
    pub fn id(&self) -> String {
        format!("{}.{}", self.app.name, self.model.name)
    }
}

/// Read-only view over the reflected application set
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry<'a> {
    apps: &'a [AppDescriptor],
}

impl<'a> ModelRegistry<'a> {
    pub fn new(apps: &'a [AppDescriptor]) -> Self {
        Self { apps }
    }

    pub fn apps(&self) -> &'a [AppDescriptor] {
        self.apps
    }

    /// Resolve an entity reference to its model.
    ///
    /// Accepts either a qualified `app.Model` reference or a bare
    /// model name (first match in application order). Returns `None`
    /// when nothing matches; unresolvable references are never errors.
    pub fn resolve(&self, entity: &str) -> Option<ModelRef<'a>> {
        if let Some((app_name, model_name)) = entity.split_once('.') {
            let app = self.apps.iter().find(|a| a.name == app_name)?;
            let model = app.models.iter().find(|m| m.name == model_name)?;
            Some(ModelRef { app, model })
        } else {
            self.apps.iter().find_map(|app| {
                app.models
                    .iter()
                    .find(|m| m.name == entity)
                    .map(|model| ModelRef { app, model })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_apps() -> Vec<AppDescriptor> {
        vec![
            AppDescriptor {
                name: "shop".to_string(),
                models: vec![ModelDescriptor {
                    name: "Widget".to_string(),
                    fields: vec![],
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

    #[test]
    fn test_resolve_bare_name_takes_first_app() {
        let apps = sample_apps();
        let registry = ModelRegistry::new(&apps);
        let found = registry.resolve("Widget").unwrap();
        assert_eq!(found.id(), "shop.Widget");
    }

    #[test]
    fn test_resolve_qualified_name() {
        let apps = sample_apps();
        let registry = ModelRegistry::new(&apps);
        let found = registry.resolve("blog.Widget").unwrap();
        assert_eq!(found.id(), "blog.Widget");
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let apps = sample_apps();
        let registry = ModelRegistry::new(&apps);
        assert!(registry.resolve("Gadget").is_none());
        assert!(registry.resolve("shop.Gadget").is_none());
        assert!(registry.resolve("store.Widget").is_none());
    }

    #[test]
    fn test_field_exposes_declared_properties() {
        let field = FieldDescriptor {
            name: "title".to_string(),
            label: Some("Title".to_string()),
            read_only: false,
            required: true,
            blank: true,
            null: true,
            default: OptionValue::not_provided(),
            max_length: Some(80),
            choices: vec![],
        };
        assert_eq!(
            field.option("verbose_name"),
            Some(OptionValue::Str("Title".to_string()))
        );
        assert_eq!(field.option("required"), Some(OptionValue::Bool(true)));
        assert_eq!(field.option("max_length"), Some(OptionValue::Int(80)));
        assert_eq!(field.option("allow_blank"), None);
    }
}
