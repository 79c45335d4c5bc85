//! Stored documents to transport-safe records.
//!
//! `_id` becomes a string `id` and top-level date-times become RFC 3339
//! strings. Nothing else is renamed or dropped.
//!
//! Not idempotent in general: a second pass over a document that carries both
//! `id` and `_id` would overwrite `id`. Documents produced by one pass have no
//! `_id` left, so re-normalizing them returns them unchanged.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// Normalize an optional lookup result; absent stays absent.
pub fn normalize(document: Option<Document>) -> Option<Document> {
    document.map(normalize_document)
}

pub fn normalize_document(mut document: Document) -> Document {
    if let Some(raw_id) = document.remove("_id") {
        document.insert("id", render_id(raw_id));
    }

    for (_, value) in document.iter_mut() {
        if let Bson::DateTime(dt) = value {
            if let Ok(rendered) = dt.try_to_rfc3339_string() {
                *value = Bson::String(rendered);
            }
        }
    }

    document
}

fn render_id(raw: Bson) -> String {
    match raw {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.into_relaxed_extjson().to_string(),
    }
}

/// JSON form of a normalized document.
pub fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}
