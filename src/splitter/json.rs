//! JSON document splitting.

use crate::model::Item;
use crate::splitter::Parsed;
use serde_json::Value as JsonValue;

/// Split a JSON document: a root array emits each element individually, a
/// root object emits one `{key, value}` record per entry. Any other root, or
/// invalid JSON, is malformed.
pub(crate) fn parse(content: &str) -> Parsed {
    let root: JsonValue = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => return Parsed::truncated(Vec::new(), format!("invalid json: {err}")),
    };

    match root {
        JsonValue::Array(values) => {
            Parsed::complete(values.into_iter().map(Item::from_json).collect())
        }
        JsonValue::Object(map) => Parsed::complete(
            map.into_iter()
                .map(|(key, value)| {
                    Item::Map(vec![
                        ("key".to_string(), Item::Str(key)),
                        ("value".to_string(), Item::from_json(value)),
                    ])
                })
                .collect(),
        ),
        other => Parsed::truncated(
            Vec::new(),
            format!("json root must be array or object, got {other}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_array_emits_elements() {
        let parsed = parse(r#"[1, "two", {"three": 3}]"#);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.records[0], Item::Int(1));
        assert_eq!(parsed.records[1], Item::Str("two".into()));
        assert_eq!(
            parsed.records[2].get_field("three"),
            Some(&Item::Int(3))
        );
    }

    #[test]
    fn root_object_emits_key_value_records() {
        let parsed = parse(r#"{"a": 1, "b": [2]}"#);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(
            parsed.records[0].get_field("key"),
            Some(&Item::Str("a".into()))
        );
        assert_eq!(
            parsed.records[1].get_field("value"),
            Some(&Item::List(vec![Item::Int(2)]))
        );
    }

    #[test]
    fn scalar_root_is_malformed() {
        let parsed = parse("42");
        assert!(parsed.records.is_empty());
        assert!(parsed.error.expect("error").contains("root"));
    }
}
