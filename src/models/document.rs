use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_type_name, NimbusError, Result};

/// External document identifier
pub type DocumentId = String;

/// A corpus document ready for indexing
///
/// `fields` holds the flattened form of the source object: nested objects
/// become dotted paths and every value is a scalar or an array of scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from a JSON object under an explicit id
    pub fn new(id: impl Into<DocumentId>, source: &Value) -> Result<Self> {
        let object = source.as_object().ok_or_else(|| {
            NimbusError::InvalidDocument(format!(
                "document must be a JSON object, got {}",
                json_type_name(source)
            ))
        })?;

        Ok(Self {
            id: id.into(),
            fields: flatten_document(object),
        })
    }

    /// Build a document whose id is the string value of `id_field`
    pub fn from_source(source: &Value, id_field: &str) -> Result<Self> {
        let id = source
            .get(id_field)
            .and_then(Value::as_str)
            .ok_or_else(|| NimbusError::MissingIdField {
                field: id_field.to_string(),
            })?;
        Self::new(id, source)
    }
}

/// Flatten a JSON object into dotted field paths
///
/// Objects inside arrays are merged into the array's path, so
/// `{"tags": [{"name": "a"}, {"name": "b"}]}` yields `tags.name: ["a", "b"]`.
/// Nulls are skipped. A path that receives a single scalar stores it as a
/// scalar, including one-element arrays.
pub fn flatten_document(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in object {
        flatten_into(&mut out, key, value);
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, path: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(object) => {
            for (key, child) in object {
                flatten_into(out, &format!("{}.{}", path, key), child);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(out, path, item);
            }
        }
        scalar => push_value(out, path, scalar.clone()),
    }
}

fn push_value(out: &mut Map<String, Value>, path: &str, value: Value) {
    match out.get_mut(path) {
        None => {
            out.insert(path.to_string(), value);
        }
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Text values of a flattened field, one per array element
pub fn field_texts(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
