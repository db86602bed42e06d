//! JSON body scaffolding from JSON-Schema-shaped nodes
//!
//! Produces an editable template with the schema's keys and empty values.
//! `required`, enums, formats and the `oneOf`/`anyOf`/`allOf` combinators are
//! not interpreted.

use serde_json::{Map, Value};

/// Flatten a schema into an empty scaffold instance.
///
/// - `object` schemas (or untyped schemas with `properties`) become a mapping
///   of each property to its own scaffold
/// - `array` schemas become `[]`
/// - every other schema becomes `""`
///
/// # Example
///
/// ```rust
/// use collection_import_sdk::import::schema::flatten_schema;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "id": { "type": "string" }, "tags": { "type": "array" } }
/// });
/// assert_eq!(flatten_schema(&schema), json!({ "id": "", "tags": [] }));
/// ```
pub fn flatten_schema(schema: &Value) -> Value {
    match schema_type(schema) {
        Some("object") => {
            let scaffold: Map<String, Value> = schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|properties| {
                    properties
                        .iter()
                        .map(|(name, property)| (name.clone(), flatten_schema(property)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(scaffold)
        }
        Some("array") => Value::Array(Vec::new()),
        _ => Value::String(String::new()),
    }
}

fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        // OpenAPI 3.1 allows a list of types, e.g. ["object", "null"]
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        Some(_) => None,
        None if schema.get("properties").is_some_and(Value::is_object) => Some("object"),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" },
                "address": {
                    "type": "object",
                    "properties": {
                        "street": { "type": "string" },
                        "lines": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        });
        assert_eq!(
            flatten_schema(&schema),
            json!({ "name": "", "age": "", "address": { "street": "", "lines": [] } })
        );
    }

    #[test]
    fn test_flatten_preserves_property_order() {
        let schema = json!({
            "type": "object",
            "properties": { "zeta": {}, "alpha": {}, "mid": {} }
        });
        let scaffold = flatten_schema(&schema);
        let keys: Vec<&String> = scaffold.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_flatten_non_object_roots() {
        assert_eq!(flatten_schema(&json!({ "type": "array" })), json!([]));
        assert_eq!(flatten_schema(&json!({ "type": "number" })), json!(""));
        assert_eq!(flatten_schema(&json!({})), json!(""));
        assert_eq!(flatten_schema(&json!({ "type": "object" })), json!({}));
    }

    #[test]
    fn test_flatten_untyped_schema_with_properties() {
        let schema = json!({ "properties": { "id": { "type": "string" } } });
        assert_eq!(flatten_schema(&schema), json!({ "id": "" }));
    }

    #[test]
    fn test_flatten_type_list() {
        let schema = json!({ "type": ["array", "null"] });
        assert_eq!(flatten_schema(&schema), json!([]));
    }

    #[test]
    fn test_combinators_are_not_interpreted() {
        let schema = json!({ "allOf": [{ "type": "object", "properties": { "id": {} } }] });
        assert_eq!(flatten_schema(&schema), json!(""));
    }
}
