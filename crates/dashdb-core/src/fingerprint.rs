//! Content fingerprints.
//!
//! A fingerprint is the BLAKE3 digest of a record's user-visible fields in
//! canonical form: object keys sorted at every depth, compact JSON. It is a
//! change-detection signal only; equal fingerprints are never deduplicated.

use serde_json::{Map, Value};

/// Fingerprint `object`, skipping the top-level fields named in `excluded`.
pub fn hash(object: &Map<String, Value>, excluded: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut entries: Vec<(&String, &Value)> = object
        .iter()
        .filter(|(name, _)| !excluded.contains(&name.as_str()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    hasher.update(b"{");
    for (index, (name, value)) in entries.into_iter().enumerate() {
        if index > 0 {
            hasher.update(b",");
        }
        hasher.update(Value::String(name.clone()).to_string().as_bytes());
        hasher.update(b":");
        hasher.update(canonical(value).to_string().as_bytes());
    }
    hasher.update(b"}");

    hasher.finalize().to_hex().to_string()
}

/// Fingerprint a record's open field map, which never holds reserved fields.
pub fn of_fields(fields: &Map<String, Value>) -> String {
    hash(fields, &[])
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(name, inner)| (name.clone(), canonical(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}
