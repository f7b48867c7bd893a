use serde_json::{Map, Value};

use super::schema::{Coercion, DefaultValue, DerivedField, FieldSpec, Schema};
use crate::store::value::{parse_timestamp, FieldValue, Fields};
use crate::store::Document;

/// Fields the server owns; never taken from update input
const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Errors that can occur while turning request input into stored fields
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("{message}")]
    MissingRequiredField { field: String, message: String },
    #[error("Invalid {field}")]
    InvalidTimestamp { field: String, value: String },
}

/// A stored document as returned to clients
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

impl From<Document> for Record {
    fn from(doc: Document) -> Self {
        Self { id: doc.id, fields: doc.fields }
    }
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Flat client JSON: `{ "id": ..., <fields>... }`
    pub fn to_api_output(&self) -> Value {
        let mut out: Map<String, Value> = self.fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
        out.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(out)
    }

    pub fn to_api_output_array(records: &[Record]) -> Value {
        Value::Array(records.iter().map(Record::to_api_output).collect())
    }

    /// Build the full field set for a new record of `schema` from create input.
    /// `createdAt`/`updatedAt` are left for the store to stamp.
    pub fn for_create(schema: &Schema, input: &Value) -> Result<Fields, RecordError> {
        let input = input.as_object().ok_or(RecordError::NotAnObject)?;
        Self::validate_required_fields(schema, input)?;

        let mut fields = Fields::new();
        for required in &schema.required {
            if let Some(value) = input.get(required.name) {
                fields.insert(required.name.to_string(), FieldValue::from_json(value));
            }
        }
        for spec in &schema.fields {
            let value = Self::coerce_create(spec, input.get(spec.name))?;
            fields.insert(spec.name.to_string(), value);
        }
        for derived in &schema.derived {
            let value = render_template(derived, &fields);
            fields.insert(derived.name.to_string(), value);
        }

        fields.insert("createdAt".to_string(), FieldValue::ServerTimestamp);
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);
        Ok(fields)
    }

    /// Build the partial field set written by an update. Keys are taken as sent
    /// except for system fields; declared flag, array and date fields are coerced.
    pub fn for_update(schema: &Schema, input: &Map<String, Value>) -> Result<Fields, RecordError> {
        let mut fields = Fields::new();
        for (key, raw) in input {
            if SYSTEM_FIELDS.contains(&key.as_str()) {
                continue;
            }
            let value = FieldValue::from_json(raw);
            let value = match schema.field_spec(key) {
                Some(spec) => Self::coerce_update(spec, value)?,
                None => value,
            };
            fields.insert(key.clone(), value);
        }
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);
        Ok(fields)
    }

    /// Every required field must be present and truthy; the first failure wins
    pub fn validate_required_fields(schema: &Schema, input: &Map<String, Value>) -> Result<(), RecordError> {
        for required in &schema.required {
            let present = input
                .get(required.name)
                .map(|v| FieldValue::from_json(v).is_truthy())
                .unwrap_or(false);
            if !present {
                return Err(RecordError::MissingRequiredField {
                    field: required.name.to_string(),
                    message: required.message.to_string(),
                });
            }
        }
        Ok(())
    }

    fn coerce_create(spec: &FieldSpec, raw: Option<&Value>) -> Result<FieldValue, RecordError> {
        let input = raw.map(FieldValue::from_json);
        let default = || match &spec.default {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Now => FieldValue::ServerTimestamp,
        };

        Ok(match spec.coercion {
            Coercion::Verbatim => input.unwrap_or_else(default),
            Coercion::OrDefault => input.filter(FieldValue::is_truthy).unwrap_or_else(default),
            Coercion::Array => input.filter(|v| v.as_array().is_some()).unwrap_or_else(default),
            Coercion::Boolean => FieldValue::Boolean(input.map(|v| v.is_truthy()).unwrap_or(false)),
            Coercion::Timestamp => match input.filter(FieldValue::is_truthy) {
                Some(value) => Self::to_timestamp(spec.name, &value)?,
                None => default(),
            },
            Coercion::Fixed => default(),
        })
    }

    fn coerce_update(spec: &FieldSpec, value: FieldValue) -> Result<FieldValue, RecordError> {
        Ok(match spec.coercion {
            Coercion::Boolean => FieldValue::Boolean(value.is_truthy()),
            Coercion::Array if value.as_array().is_none() => FieldValue::Array(vec![]),
            Coercion::Timestamp if value.is_truthy() => Self::to_timestamp(spec.name, &value)?,
            _ => value,
        })
    }

    fn to_timestamp(field: &str, value: &FieldValue) -> Result<FieldValue, RecordError> {
        parse_timestamp(value)
            .map(FieldValue::Timestamp)
            .ok_or_else(|| RecordError::InvalidTimestamp { field: field.to_string(), value: value.to_string() })
    }
}

/// Interpolate `{name}` placeholders with field values
fn render_template(derived: &DerivedField, fields: &Fields) -> FieldValue {
    let mut out = String::new();
    let mut rest = derived.template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                if let Some(value) = fields.get(&after[..end]) {
                    out.push_str(&value.to_string());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    FieldValue::String(out)
}
