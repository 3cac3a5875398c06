//! Attribute codec: allow-listed field extraction and the opaque-blob
//! convention for `json`-named fields.
//!
//! Fields whose name contains the substring `json` are stored as an encoded
//! JSON string. The codec decodes them on the way out (so re-serializing the
//! document never double-encodes) and encodes them on the way in. Everything
//! else passes through untouched.

use crate::descriptor::ResourceDescriptor;
use serde_json::{Map, Value};

/// Whether a field follows the opaque-blob convention.
pub fn is_blob_field(name: &str) -> bool {
    name.contains("json")
}

/// Decode a stored blob into its structured form. A value that is not a
/// string, or does not parse, passes through unchanged — the codec never
/// fails a request.
fn decode_blob(value: Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

/// Encode a structured value into the blob string form the store expects.
fn encode_blob(value: Value) -> Value {
    match serde_json::to_string(&value) {
        Ok(s) => Value::String(s),
        Err(_) => value,
    }
}

/// Extract the allow-listed attributes of a stored object, in descriptor
/// order, optionally narrowed to `filter`. Missing fields are absent from
/// the result rather than null.
pub fn expose(
    descriptor: &ResourceDescriptor,
    fields: &Map<String, Value>,
    filter: Option<&[String]>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for name in &descriptor.exposed_fields {
        if let Some(filter) = filter {
            if !filter.iter().any(|f| f == name) {
                continue;
            }
        }
        if let Some(value) = fields.get(name) {
            let value = value.clone();
            if is_blob_field(name) {
                out.insert(name.clone(), decode_blob(value));
            } else {
                out.insert(name.clone(), value);
            }
        }
    }
    out
}

/// Blob-decode every `json`-named key of a field map without applying an
/// allow-list. Used for related objects whose type has no registered
/// descriptor.
pub fn expose_raw(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| {
            let value = value.clone();
            if is_blob_field(name) {
                (name.clone(), decode_blob(value))
            } else {
                (name.clone(), value)
            }
        })
        .collect()
}

/// Inverse of [`expose`]: prepare an inbound attribute map for persistence,
/// re-encoding structured values of `json`-named fields into blob strings.
pub fn ingest(attributes: Map<String, Value>) -> Map<String, Value> {
    attributes
        .into_iter()
        .map(|(name, value)| {
            if is_blob_field(&name) {
                let encoded = encode_blob(value);
                (name, encoded)
            } else {
                (name, value)
            }
        })
        .collect()
}
