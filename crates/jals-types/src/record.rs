//! The open-ended record exchanged between pipeline stages.
//!
//! A `Record` is a JSON object: string keys mapped to strings, numbers,
//! booleans, nulls, lists, or nested objects. No schema is enforced here;
//! each transformer reads and writes its own shape by convention.

use serde_json::{Map, Value};

/// A structured record passed into and out of transformers.
pub type Record = Map<String, Value>;

/// Length of the compact JSON rendering of a record.
///
/// This is a coarse, monotonic proxy for input size recorded in history
/// entries, not a byte-exact measure of memory use.
pub fn record_size(record: &Record) -> usize {
    serde_json::to_string(record).map(|s| s.len()).unwrap_or(0)
}

/// Turn a JSON value into a record.
///
/// Objects are taken as-is; any other value is wrapped under `"value"`.
pub fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Record::new();
            map.insert("value".into(), other);
            map
        }
    }
}

/// Lenient accessors for loosely-shaped records.
///
/// Missing keys and type mismatches read as absent rather than failing,
/// matching how stages treat optional input fields.
pub trait RecordExt {
    /// The list stored under `key`, or an empty slice.
    fn list(&self, key: &str) -> &[Value];

    /// The nested object stored under `key`, if any.
    fn object(&self, key: &str) -> Option<&Record>;

    /// A copy of the nested object under `key`, or an empty record.
    fn object_or_empty(&self, key: &str) -> Record {
        self.object(key).cloned().unwrap_or_default()
    }

    /// The numeric value under `key` as `f64`.
    fn number(&self, key: &str) -> Option<f64>;

    /// The string value under `key`.
    fn text(&self, key: &str) -> Option<&str>;
}

impl RecordExt for Record {
    fn list(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn object(&self, key: &str) -> Option<&Record> {
        self.get(key).and_then(Value::as_object)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn size_grows_with_content() {
        let small = into_record(json!({"a": 1}));
        let large = into_record(json!({"a": 1, "b": [1, 2, 3, 4, 5]}));
        assert!(record_size(&large) > record_size(&small));
        assert_eq!(record_size(&Record::new()), 2);
    }

    #[test]
    fn non_object_is_wrapped() {
        let record = into_record(json!([1, 2]));
        assert_eq!(record.get("value"), Some(&json!([1, 2])));
    }

    #[test]
    fn lenient_accessors() {
        let record = into_record(json!({
            "strokes": [{"id": 1}],
            "metadata": {"author": "x"},
            "curvature": 0.4,
            "label": "loop",
            "broken": "not a list"
        }));

        assert_eq!(record.list("strokes").len(), 1);
        assert!(record.list("missing").is_empty());
        assert!(record.list("broken").is_empty());
        assert_eq!(record.object_or_empty("metadata").len(), 1);
        assert!(record.object_or_empty("missing").is_empty());
        assert_eq!(record.number("curvature"), Some(0.4));
        assert_eq!(record.text("label"), Some("loop"));
        assert_eq!(record.text("curvature"), None);
    }
}
