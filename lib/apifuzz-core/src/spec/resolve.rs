//! Cycle-safe `$ref` resolution over a raw spec document.
//!
//! The resolver walks `properties`, `items`, and every element of
//! `allOf`/`anyOf`/`oneOf`, recursively resolving nested `$ref`s. A
//! visited-set of refs is threaded down the *current descent only*: it is
//! cloned before branching into sibling properties, so a ref seen down one
//! branch does not suppress it being followed down another. A ref revisited
//! along the same descent (an actual cycle) resolves to an empty schema
//! instead of failing or recursing forever.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Looks up a raw `#/a/b/c` JSON pointer inside the full spec document.
///
/// Returns `None` if any path segment is missing, matching the prototype's
/// `obj.get(part)` returning `None` partway through.
fn lookup_ref<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in pointer.trim_start_matches("#/").split('/') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Recursively resolves `$ref`s within `schema`, returning an owned,
/// fully-inlined schema.
///
/// Non-object values pass through unchanged (the prototype's `if not
/// isinstance(schema, dict): return schema` base case).
#[must_use]
pub fn resolve_schema(document: &Value, schema: &Value) -> Value {
    resolve_schema_inner(document, schema, &HashSet::new())
}

fn resolve_schema_inner(document: &Value, schema: &Value, seen_refs: &HashSet<String>) -> Value {
    let Some(object) = schema.as_object() else {
        return schema.clone();
    };

    if let Some(Value::String(reference)) = object.get("$ref") {
        if seen_refs.contains(reference) {
            return Value::Object(Map::new());
        }
        let mut seen = seen_refs.clone();
        seen.insert(reference.clone());
        return match lookup_ref(document, reference) {
            Some(resolved) => resolve_schema_inner(document, resolved, &seen),
            None => Value::Object(Map::new()),
        };
    }

    let mut resolved = object.clone();

    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        let mut resolved_props = Map::new();
        for (key, value) in properties {
            resolved_props.insert(key.clone(), resolve_schema_inner(document, value, seen_refs));
        }
        resolved.insert("properties".to_string(), Value::Object(resolved_props));
    }

    if let Some(items) = object.get("items") {
        resolved.insert(
            "items".to_string(),
            resolve_schema_inner(document, items, seen_refs),
        );
    }

    for combinator in ["allOf", "anyOf", "oneOf"] {
        if let Some(variants) = object.get(combinator).and_then(Value::as_array) {
            let resolved_variants: Vec<Value> = variants
                .iter()
                .map(|variant| resolve_schema_inner(document, variant, seen_refs))
                .collect();
            resolved.insert(combinator.to_string(), Value::Array(resolved_variants));
        }
    }

    Value::Object(resolved)
}

/// Resolves a top-level `$ref` pointer only (no recursion into the target),
/// used for resolving response objects before extracting their own schema.
#[must_use]
pub fn resolve_ref<'a>(document: &'a Value, schema: &'a Value) -> &'a Value {
    match schema.get("$ref").and_then(Value::as_str) {
        Some(reference) => lookup_ref(document, reference).unwrap_or(schema),
        None => schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_simple_ref() {
        let document = json!({
            "components": {"schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}}
        });
        let schema = json!({"$ref": "#/components/schemas/Pet"});
        let resolved = resolve_schema(&document, &schema);
        assert_eq!(resolved["type"], "object");
        assert_eq!(resolved["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_cyclic_ref_truncates_to_empty_schema() {
        let document = json!({
            "components": {"schemas": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/Node"}}}
            }}
        });
        let schema = json!({"$ref": "#/components/schemas/Node"});
        let resolved = resolve_schema(&document, &schema);
        let next = &resolved["properties"]["next"];
        assert_eq!(next, &json!({}));
    }

    #[test]
    fn test_sibling_branches_do_not_suppress_each_other() {
        // Both `a` and `b` reference the same schema; seeing it once while
        // resolving `a` must not blank it out while resolving `b`.
        let document = json!({
            "components": {"schemas": {
                "Leaf": {"type": "string"}
            }}
        });
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"$ref": "#/components/schemas/Leaf"},
                "b": {"$ref": "#/components/schemas/Leaf"}
            }
        });
        let resolved = resolve_schema(&document, &schema);
        assert_eq!(resolved["properties"]["a"]["type"], "string");
        assert_eq!(resolved["properties"]["b"]["type"], "string");
    }

    #[test]
    fn test_missing_ref_resolves_to_empty_schema() {
        let document = json!({});
        let schema = json!({"$ref": "#/components/schemas/Missing"});
        let resolved = resolve_schema(&document, &schema);
        assert_eq!(resolved, json!({}));
    }

    #[test]
    fn test_non_object_schema_passes_through() {
        let document = json!({});
        let schema = json!("not-a-schema");
        assert_eq!(resolve_schema(&document, &schema), schema);
    }

    #[test]
    fn test_resolves_all_of_variants() {
        let document = json!({
            "components": {"schemas": {"Named": {"properties": {"name": {"type": "string"}}}}}
        });
        let schema = json!({"allOf": [{"$ref": "#/components/schemas/Named"}, {"properties": {"age": {"type": "integer"}}}]});
        let resolved = resolve_schema(&document, &schema);
        let variants = resolved["allOf"].as_array().unwrap();
        assert_eq!(variants[0]["properties"]["name"]["type"], "string");
        assert_eq!(variants[1]["properties"]["age"]["type"], "integer");
    }

    #[test]
    fn test_resolve_schema_is_idempotent() {
        let document = json!({
            "components": {"schemas": {"Pet": {"type": "object"}}}
        });
        let schema = json!({"$ref": "#/components/schemas/Pet"});
        let once = resolve_schema(&document, &schema);
        let twice = resolve_schema(&document, &once);
        assert_eq!(once, twice);
    }
}
