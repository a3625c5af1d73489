//! Output formatting helpers for the CLI.

use dashdb_core::storage::{Record, ReservedKeys};
use serde_json::Value;

/// Convert a record to the JSON object stored on disk.
pub fn record_json(record: &Record, keys: &ReservedKeys) -> Value {
    Value::Object(record.to_object(keys))
}

/// Print records one compact JSON object per line.
pub fn print_records(records: &[Record], keys: &ReservedKeys) {
    for record in records {
        println!("{}", record_json(record, keys));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashdb_core::StoreOptions;
    use serde_json::json;

    #[test]
    fn test_record_json_includes_reserved_fields() {
        let keys = StoreOptions::default().reserved_keys();
        let record = Record {
            id: Some("abc".to_string()),
            fields: json!({"name": "Foo"}).as_object().cloned().unwrap(),
            ..Record::default()
        };

        assert_eq!(
            record_json(&record, &keys),
            json!({"id": "abc", "name": "Foo"})
        );
    }
}
