//! Declarative option extraction
//!
//! A declaration list names the properties worth emitting for a field
//! kind, the output key each maps to, and the set of "no-op" defaults
//! that suppress emission. Extraction probes the field through the
//! [`OptionSource`] capability interface and keeps only values that
//! differ from their defaults and survive JSON encoding.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::core::metadata::OptionSource;
use crate::core::value::OptionValue;

/// Minimal JSON-safe bag of non-default field properties
pub type OptionBag = BTreeMap<String, JsonValue>;

/// One declared property: source name, optional output rename, and
/// the default values that suppress emission
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub source: &'static str,
    pub rename: Option<&'static str>,
    pub defaults: &'static [OptionValue],
}

impl OptionSpec {
    pub const fn new(source: &'static str, defaults: &'static [OptionValue]) -> Self {
        Self {
            source,
            rename: None,
            defaults,
        }
    }

    pub const fn renamed(
        source: &'static str,
        rename: &'static str,
        defaults: &'static [OptionValue],
    ) -> Self {
        Self {
            source,
            rename: Some(rename),
            defaults,
        }
    }

    fn key(&self) -> &'static str {
        self.rename.unwrap_or(self.source)
    }
}

/// Properties extracted from serializer attribute fields
pub const SERIALIZER_ATTRIBUTE_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("label", &[OptionValue::Null]),
    OptionSpec::new("read_only", &[OptionValue::Bool(false)]),
    OptionSpec::new("required", &[OptionValue::Bool(false)]),
    OptionSpec::new("allow_blank", &[OptionValue::Bool(true)]),
    OptionSpec::new(
        "default",
        &[OptionValue::Null, OptionValue::NotProvided],
    ),
    OptionSpec::new("max_length", &[OptionValue::Null]),
    OptionSpec::new("choices", &[OptionValue::Null]),
];

/// Properties extracted from serializer relation fields
pub const SERIALIZER_RELATION_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("label", &[OptionValue::Null]),
    OptionSpec::new("read_only", &[OptionValue::Bool(false)]),
    OptionSpec::new("required", &[OptionValue::Bool(false)]),
    OptionSpec::new("allow_blank", &[OptionValue::Bool(true)]),
    OptionSpec::new(
        "default",
        &[OptionValue::Null, OptionValue::NotProvided],
    ),
];

/// Properties extracted from raw metadata attribute fields
pub const RAW_ATTRIBUTE_OPTIONS: &[OptionSpec] = &[
    OptionSpec::renamed("verbose_name", "label", &[OptionValue::Null]),
    OptionSpec::renamed("read_only", "readOnly", &[OptionValue::Bool(false)]),
    OptionSpec::new("required", &[OptionValue::Bool(false)]),
    OptionSpec::new("blank", &[OptionValue::Bool(true)]),
    OptionSpec::new("null", &[OptionValue::Bool(true)]),
    OptionSpec::new(
        "default",
        &[OptionValue::NotProvided],
    ),
    OptionSpec::renamed("max_length", "maxLength", &[OptionValue::Null]),
    OptionSpec::new("choices", &[]),
];

/// Properties extracted from raw metadata relation fields
pub const RAW_RELATION_OPTIONS: &[OptionSpec] = &[
    OptionSpec::renamed("verbose_name", "label", &[OptionValue::Null]),
    OptionSpec::renamed("read_only", "readOnly", &[OptionValue::Bool(false)]),
    OptionSpec::new("required", &[OptionValue::Bool(false)]),
    OptionSpec::new("blank", &[OptionValue::Bool(true)]),
    OptionSpec::new("null", &[OptionValue::Bool(true)]),
    OptionSpec::new(
        "default",
        &[OptionValue::NotProvided],
    ),
    OptionSpec::new("choices", &[]),
];

/// Extract the minimal option bag for a field.
///
/// Per declared property: a property the field does not expose is
/// skipped; a value matching any declared default is omitted; a
/// callable value is omitted without ever being invoked; a `choices`
/// value is coerced to a plain ordered list before encoding; a value
/// that fails JSON encoding is omitted silently.
pub fn extract_options(field: &dyn OptionSource, specs: &[OptionSpec]) -> OptionBag {
    let mut bag = OptionBag::new();
    for spec in specs {
        let Some(value) = field.option(spec.source) else {
            continue;
        };
        if spec.defaults.contains(&value) {
            continue;
        }
        if value.is_callable() {
            continue;
        }
        let value = if spec.source == "choices" {
            let value = value.into_choice_list();
            // an empty choice collection is the declared default
            if matches!(&value, OptionValue::List(items) if items.is_empty()) {
                continue;
            }
            value
        } else {
            value
        };
        if let Some(json) = value.to_json() {
            bag.insert(spec.key().to_string(), json);
        }
    }
    bag
}
