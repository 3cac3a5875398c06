//! Inbound JSON:API body translation: single-resource and bulk-array
//! shapes, reduced to flat attribute maps ready for persistence.

use crate::codec;
use serde_json::{Map, Value};

/// Result of translating a request body.
#[derive(Debug, PartialEq)]
pub enum Translated {
    /// `{"data": {"attributes": {...}}}`; `data.id` is carried through when
    /// present so replace/update flows can correlate. An id of `0` is
    /// deliberately left to miss the downstream lookup, which makes those
    /// flows fall through to create semantics.
    Single {
        id: Option<Value>,
        attributes: Map<String, Value>,
    },
    /// `{"data": [{"id"?, "attributes": {...}}, ...]}`, item by item.
    Bulk(Vec<BulkItem>),
    /// Neither shape matched.
    Empty,
}

/// One bulk item. The id is kept only when truthy; items yielding no
/// usable keys at all are skipped by the translator.
#[derive(Debug, PartialEq)]
pub struct BulkItem {
    pub id: Option<i64>,
    pub attributes: Map<String, Value>,
}

fn item_id(value: Option<&Value>) -> Option<i64> {
    let id = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}

/// Translate a request body. Attribute values pass through the codec so
/// `json`-named fields are re-encoded into the blob form the store expects.
pub fn translate(body: &Value) -> Translated {
    let data = match body.get("data") {
        Some(data) => data,
        None => return Translated::Empty,
    };

    if let Some(Value::Object(attributes)) = data.get("attributes") {
        if !attributes.is_empty() {
            return Translated::Single {
                id: data.get("id").filter(|v| !v.is_null()).cloned(),
                attributes: codec::ingest(attributes.clone()),
            };
        }
    }

    if let Some(items) = data.as_array() {
        let mut out = Vec::new();
        for item in items {
            let id = item_id(item.get("id"));
            let attributes = match item.get("attributes") {
                Some(Value::Object(attributes)) => codec::ingest(attributes.clone()),
                _ => Map::new(),
            };
            // Only keep items where correctly formatted keys were found.
            if id.is_none() && attributes.is_empty() {
                continue;
            }
            out.push(BulkItem { id, attributes });
        }
        if !out.is_empty() {
            return Translated::Bulk(out);
        }
    }

    Translated::Empty
}
