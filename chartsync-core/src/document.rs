//! Shaping local records into remote documents.
//!
//! The local store keeps some structured data as opaque serialized JSON
//! text (form answers, nested detail blobs). The remote document store
//! wants that data structured, so pushing a record re-expands any field
//! that holds serialized JSON back into its structured form. Malformed or
//! legacy text falls back to the raw string; a bad field never fails the
//! record.

use chartsync_types::{Document, SyncableRecord};
use serde_json::Value;

/// Shape a local record into the outgoing remote document.
pub fn to_document(record: &SyncableRecord) -> Document {
    let mut document = Document::new();
    for (key, value) in &record.fields {
        document.insert(key.clone(), expand(value));
    }
    document
}

/// Re-expand a field value, parsing serialized-JSON text into structure.
fn expand(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return value.clone();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
        // Malformed or legacy text: keep the raw string.
        _ => value.clone(),
    }
}
