//! Record type and JSON conversion helpers

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A record being protected: field name to nullable string value.
///
/// The caller owns the record; actions mutate it in place and keep no
/// reference to it after `apply` returns.
pub type Record = HashMap<String, Option<String>>;

/// Build a record from a JSON object.
///
/// Only string and null values are accepted. Any other value type is an
/// unsupported input and fails with a transform error naming the field.
pub fn record_from_json(value: &Value) -> Result<Record> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::transform(format!("expected a JSON object, got {}", kind_of(value))))?;

    let mut record = Record::with_capacity(object.len());
    for (field, value) in object {
        let converted = match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => {
                return Err(Error::transform(format!(
                    "unsupported value type {}",
                    kind_of(other)
                ))
                .on_field(field))
            }
        };
        record.insert(field.clone(), converted);
    }

    Ok(record)
}

/// Convert a record back into a JSON object with keys in sorted order
pub fn record_to_json(record: &Record) -> Value {
    let mut fields: Vec<_> = record.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut object = Map::with_capacity(fields.len());
    for (field, value) in fields {
        let value = match value {
            Some(s) => Value::String(s.clone()),
            None => Value::Null,
        };
        object.insert(field.clone(), value);
    }

    Value::Object(object)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json() {
        let record = record_from_json(&json!({"email": "a@b.com", "phone": null})).unwrap();

        assert_eq!(record.get("email"), Some(&Some("a@b.com".to_string())));
        assert_eq!(record.get("phone"), Some(&None));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_unsupported_value_type() {
        let err = record_from_json(&json!({"age": 42})).unwrap_err();

        match err {
            Error::Transform { field, message } => {
                assert_eq!(field.as_deref(), Some("age"));
                assert!(message.contains("number"));
            }
            other => panic!("Wrong error type: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(record_from_json(&json!(["a", "b"])).is_err());
    }

    #[test]
    fn test_record_to_json_keeps_nulls() {
        let mut record = Record::new();
        record.insert("b".to_string(), None);
        record.insert("a".to_string(), Some("x".to_string()));

        let value = record_to_json(&record);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":"x","b":null}"#);
    }
}
