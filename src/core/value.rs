//! Polymorphic option values and their JSON encoding

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A polymorphic value carried by a field option.
///
/// Besides plain JSON-representable data, this type models the
/// sentinels metadata registries hand us:
///
/// - [`OptionValue::NotProvided`]: no default was declared for the field
/// - [`OptionValue::Factory`]: the default is a factory/callable and must
///   never be invoked or serialized
/// - [`OptionValue::Set`]: an ordered iterable that is not a plain list
///   (choice collections); only encodable after coercion to a list
///
/// In snapshot files, plain values are written as plain YAML/JSON
/// scalars and sequences; the sentinels are written as single-key
/// marker maps: `{factory: true}`, `{not_provided: true}` and
/// `{set: [...]}`. A string in RFC 3339 form parses as a datetime.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    NotProvided,
    Factory,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
    List(Vec<OptionValue>),
    Set(Vec<OptionValue>),
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Null => serializer.serialize_unit(),
            OptionValue::NotProvided => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("not_provided", &true)?;
                map.end()
            }
            OptionValue::Factory => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("factory", &true)?;
                map.end()
            }
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Int(i) => serializer.serialize_i64(*i),
            OptionValue::Float(f) => serializer.serialize_f64(*f),
            OptionValue::Str(s) => serializer.serialize_str(s),
            OptionValue::DateTime(dt) => dt.serialize(serializer),
            OptionValue::List(items) => items.serialize(serializer),
            OptionValue::Set(items) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("set", items)?;
                map.end()
            }
        }
    }
}

/// Untagged wire shape; marker maps must be tried before plain maps
/// would be, and datetimes before plain strings.
#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum ValueRepr {
    Factory { factory: bool },
    NotProvided { not_provided: bool },
    Set { set: Vec<OptionValue> },
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Str(String),
    List(Vec<OptionValue>),
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ValueRepr::deserialize(deserializer)? {
            ValueRepr::Factory { .. } => OptionValue::Factory,
            ValueRepr::NotProvided { .. } => OptionValue::NotProvided,
            ValueRepr::Set { set } => OptionValue::Set(set),
            ValueRepr::Null => OptionValue::Null,
            ValueRepr::Bool(b) => OptionValue::Bool(b),
            ValueRepr::Int(i) => OptionValue::Int(i),
            ValueRepr::Float(f) => OptionValue::Float(f),
            ValueRepr::DateTime(dt) => OptionValue::DateTime(dt),
            ValueRepr::Str(s) => OptionValue::Str(s),
            ValueRepr::List(items) => OptionValue::List(items),
        })
    }
}

impl OptionValue {
    /// Sentinel for "no default declared", used as a serde default
    pub const fn not_provided() -> Self {
        OptionValue::NotProvided
    }

    pub fn is_not_provided(&self) -> bool {
        matches!(self, OptionValue::NotProvided)
    }

    /// Whether this value is a default-value factory (callable)
    pub fn is_callable(&self) -> bool {
        matches!(self, OptionValue::Factory)
    }

    /// Coerce a choice collection to a plain ordered list.
    ///
    /// `Set` and `List` both become `List`; every other value is
    /// returned unchanged and left to the encodability check.
    pub fn into_choice_list(self) -> Self {
        match self {
            OptionValue::Set(items) | OptionValue::List(items) => OptionValue::List(items),
            other => other,
        }
    }

    /// Encode this value as plain JSON.
    ///
    /// Returns `None` when the value has no JSON representation:
    /// sentinels, factories, raw `Set` collections, non-finite floats,
    /// and lists containing any unencodable element. Datetimes encode
    /// as RFC 3339 strings.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            OptionValue::Null => Some(JsonValue::Null),
            OptionValue::NotProvided | OptionValue::Factory | OptionValue::Set(_) => None,
            OptionValue::Bool(b) => Some(JsonValue::Bool(*b)),
            OptionValue::Int(i) => Some(JsonValue::Number((*i).into())),
            OptionValue::Float(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            OptionValue::Str(s) => Some(JsonValue::String(s.clone())),
            OptionValue::DateTime(dt) => Some(JsonValue::String(dt.to_rfc3339())),
            OptionValue::List(items) => items
                .iter()
                .map(OptionValue::to_json)
                .collect::<Option<Vec<_>>>()
                .map(JsonValue::Array),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_scalars_encode() {
        assert_eq!(OptionValue::Null.to_json(), Some(JsonValue::Null));
        assert_eq!(OptionValue::Bool(true).to_json(), Some(json!(true)));
        assert_eq!(OptionValue::Int(42).to_json(), Some(json!(42)));
        assert_eq!(OptionValue::Str("a".into()).to_json(), Some(json!("a")));
    }

    #[test]
    fn test_sentinels_do_not_encode() {
        assert_eq!(OptionValue::NotProvided.to_json(), None);
        assert_eq!(OptionValue::Factory.to_json(), None);
    }

    #[test]
    fn test_non_finite_float_does_not_encode() {
        assert_eq!(OptionValue::Float(f64::NAN).to_json(), None);
        assert_eq!(OptionValue::Float(f64::INFINITY).to_json(), None);
        assert_eq!(OptionValue::Float(1.5).to_json(), Some(json!(1.5)));
    }

    #[test]
    fn test_datetime_encodes_as_rfc3339() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            OptionValue::DateTime(dt).to_json(),
            Some(json!("2020-01-02T03:04:05+00:00"))
        );
    }

    #[test]
    fn test_set_requires_coercion() {
        let set = OptionValue::Set(vec![OptionValue::Int(1), OptionValue::Int(2)]);
        assert_eq!(set.to_json(), None);
        assert_eq!(set.into_choice_list().to_json(), Some(json!([1, 2])));
    }

    #[test]
    fn test_list_with_unencodable_element_does_not_encode() {
        let list = OptionValue::List(vec![OptionValue::Int(1), OptionValue::Factory]);
        assert_eq!(list.to_json(), None);
    }

    #[test]
    fn test_yaml_plain_scalars_deserialize() {
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("true").unwrap(),
            OptionValue::Bool(true)
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("42").unwrap(),
            OptionValue::Int(42)
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("1.5").unwrap(),
            OptionValue::Float(1.5)
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("draft").unwrap(),
            OptionValue::Str("draft".to_string())
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("null").unwrap(),
            OptionValue::Null
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("[1, 2]").unwrap(),
            OptionValue::List(vec![OptionValue::Int(1), OptionValue::Int(2)])
        );
    }

    #[test]
    fn test_yaml_marker_maps_deserialize() {
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("{factory: true}").unwrap(),
            OptionValue::Factory
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("{not_provided: true}").unwrap(),
            OptionValue::NotProvided
        );
        assert_eq!(
            serde_yaml::from_str::<OptionValue>("{set: [1, 2, 3]}").unwrap(),
            OptionValue::Set(vec![
                OptionValue::Int(1),
                OptionValue::Int(2),
                OptionValue::Int(3),
            ])
        );
    }

    #[test]
    fn test_datetime_strings_deserialize_as_datetime() {
        let parsed: OptionValue = serde_yaml::from_str("\"2020-01-02T03:04:05Z\"").unwrap();
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parsed, OptionValue::DateTime(expected));
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let values = [
            OptionValue::Null,
            OptionValue::NotProvided,
            OptionValue::Factory,
            OptionValue::Bool(false),
            OptionValue::Int(7),
            OptionValue::Str("x".to_string()),
            OptionValue::List(vec![OptionValue::Int(1)]),
            OptionValue::Set(vec![OptionValue::Str("a".to_string())]),
        ];
        for value in values {
            let encoded = serde_json::to_string(&value).unwrap();
            let decoded: OptionValue = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_choice_list_coercion_preserves_order() {
        let set = OptionValue::Set(vec![
            OptionValue::Int(3),
            OptionValue::Int(1),
            OptionValue::Int(2),
        ]);
        assert_eq!(set.into_choice_list().to_json(), Some(json!([3, 1, 2])));
    }
}
