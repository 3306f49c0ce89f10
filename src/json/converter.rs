//! JSON <-> attribute conversion
//!
//! Plain attribute bags arrive as JSON objects and leave as JSON objects;
//! this keeps the collection's `to_json` output shaped exactly like its
//! input.

use crate::core::{Attributes, CollectionError, Result, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Converts JSON values to attribute [`Value`]s
pub struct JsonToValueConverter;

impl JsonToValueConverter {
    pub fn convert(json_value: &JsonValue) -> Value {
        match json_value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                // u64 beyond i64 range and real floats both land here
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Self::convert).collect()),
            JsonValue::Object(_) => Value::Json(json_value.clone()),
        }
    }

    /// Convert a JSON object into an attribute bag
    pub fn json_to_attributes(json_obj: &JsonValue) -> Result<Attributes> {
        let obj = json_obj.as_object().ok_or_else(|| {
            CollectionError::InvalidInput(format!("expected JSON object, got {}", kind(json_obj)))
        })?;

        Ok(obj
            .iter()
            .map(|(name, value)| (name.clone(), Self::convert(value)))
            .collect())
    }
}

/// Converts attribute [`Value`]s back into JSON
pub struct ValueToJsonConverter;

impl ValueToJsonConverter {
    pub fn convert(value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Integer(i) => JsonValue::Number((*i).into()),
            // non-finite floats have no JSON form
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Self::convert).collect()),
            Value::Json(v) => v.clone(),
        }
    }

    pub fn attributes_to_json(attributes: &Attributes) -> JsonValue {
        let map: Map<String, JsonValue> = attributes
            .iter()
            .map(|(name, value)| (name.clone(), Self::convert(value)))
            .collect();
        JsonValue::Object(map)
    }
}

/// Parsed JSON input, keeping whether the caller sent one object or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonInputs {
    One(Attributes),
    Many(Vec<Attributes>),
}

impl JsonInputs {
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        match json {
            JsonValue::Array(items) => items
                .iter()
                .map(JsonToValueConverter::json_to_attributes)
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            JsonValue::Object(_) => JsonToValueConverter::json_to_attributes(json).map(Self::One),
            other => Err(CollectionError::InvalidInput(format!(
                "expected JSON object or array of objects, got {}",
                kind(other)
            ))),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let json: JsonValue = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    pub fn into_vec(self) -> Vec<Attributes> {
        match self {
            Self::One(attrs) => vec![attrs],
            Self::Many(list) => list,
        }
    }
}

fn kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(JsonToValueConverter::convert(&json!(3)), Value::Integer(3));
        assert_eq!(JsonToValueConverter::convert(&json!(2.5)), Value::Float(2.5));
        assert_eq!(JsonToValueConverter::convert(&json!("x")), Value::from("x"));
        assert_eq!(JsonToValueConverter::convert(&json!(true)), Value::Boolean(true));
        assert!(JsonToValueConverter::convert(&json!(null)).is_null());
    }

    #[test]
    fn test_nested_object_survives() {
        let input = json!({"id": 1, "meta": {"tags": ["a", "b"]}, "scores": [1, 2.5]});
        let attrs = JsonToValueConverter::json_to_attributes(&input).unwrap();
        assert_eq!(ValueToJsonConverter::attributes_to_json(&attrs), input);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = JsonToValueConverter::json_to_attributes(&json!([1])).unwrap_err();
        assert!(matches!(err, CollectionError::InvalidInput(_)));
    }

    #[test]
    fn test_inputs_shape() {
        let one = JsonInputs::parse(r#"{"id": 1}"#).unwrap();
        assert!(matches!(one, JsonInputs::One(_)));

        let many = JsonInputs::parse(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert!(matches!(many, JsonInputs::Many(_)));
        assert_eq!(many.into_vec().len(), 2);

        assert!(JsonInputs::parse("42").is_err());
        assert!(matches!(JsonInputs::parse("{"), Err(CollectionError::Json(_))));
    }
}
