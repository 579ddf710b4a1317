//! Placeholder resolution: replaces `{name}` path segments and `"{name}"`
//! header values with harvested dynamic values or schema-derived dummies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::matching::matching_key;
use super::DynamicIdTable;
use crate::request::generate_example_value;
use crate::rng::FuzzRng;
use crate::sender::FuzzRequest;
use crate::spec::ParameterLocation;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("valid regex"));

/// Resolves every `{name}` placeholder in `request.url` and every header
/// value of the exact form `"{name}"`, consulting `table` first and
/// falling back to a schema-derived (or generic string) example.
///
/// Guarantees the resulting URL contains no remaining `{…}` placeholders.
#[must_use]
pub fn resolve_dependencies(
    request: &FuzzRequest,
    table: &DynamicIdTable,
    rng: &mut FuzzRng,
) -> FuzzRequest {
    let mut resolved = request.clone();

    let placeholders: Vec<String> = PLACEHOLDER_RE
        .captures_iter(&request.url)
        .map(|caps| caps[1].to_string())
        .collect();

    for placeholder in placeholders {
        let value = resolve_one(&placeholder, request, table, rng);
        let needle = format!("{{{placeholder}}}");
        resolved.url = resolved.url.replacen(&needle, &value, 1);
    }

    for (_, value) in &mut resolved.headers {
        if let Some(placeholder) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
            *value = resolve_one(placeholder, request, table, rng);
        }
    }

    resolved
}

fn resolve_one(
    placeholder: &str,
    request: &FuzzRequest,
    table: &DynamicIdTable,
    rng: &mut FuzzRng,
) -> String {
    if let Some(key) = matching_key(placeholder, table) {
        if let Some(values) = table.get(key) {
            let pool: Vec<&String> = values.iter().collect();
            if let Some(value) = rng.choose(&pool) {
                return (*value).clone();
            }
        }
    }

    let schema = request
        .parameters
        .iter()
        .find(|p| p.name == placeholder && p.location == ParameterLocation::Path)
        .map(|p| p.schema.clone())
        .unwrap_or_else(|| serde_json::json!({"type": "string"}));

    generate_example_value(&schema, rng)
        .map(value_to_string)
        .unwrap_or_default()
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};

    fn request(url: &str) -> FuzzRequest {
        FuzzRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            headers: IndexMap::new(),
            body: None,
            parameters: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_dependencies_leaves_no_placeholder() {
        let mut rng = FuzzRng::from_seed(1);
        let table = IndexMap::new();
        let resolved = resolve_dependencies(&request("/pets/{id}"), &table, &mut rng);
        assert!(!resolved.url.contains('{'));
    }

    #[test]
    fn test_resolve_dependencies_uses_harvested_value() {
        let mut rng = FuzzRng::from_seed(1);
        let mut table = IndexMap::new();
        let mut values = IndexSet::new();
        values.insert("42".to_string());
        table.insert("id".to_string(), values);
        let resolved = resolve_dependencies(&request("/pets/{petId}"), &table, &mut rng);
        assert_eq!(resolved.url, "/pets/42");
    }

    #[test]
    fn test_resolve_dependencies_resolves_placeholder_header() {
        let mut rng = FuzzRng::from_seed(1);
        let mut table = IndexMap::new();
        let mut values = IndexSet::new();
        values.insert("abc123".to_string());
        table.insert("token".to_string(), values);
        let mut req = request("/pets");
        req.headers.insert("Authorization".to_string(), "{token}".to_string());
        let resolved = resolve_dependencies(&req, &table, &mut rng);
        assert_eq!(resolved.headers.get("Authorization").unwrap(), "abc123");
    }

    #[test]
    fn test_resolve_dependencies_multiple_placeholders() {
        let mut rng = FuzzRng::from_seed(1);
        let table = IndexMap::new();
        let resolved = resolve_dependencies(&request("/owners/{ownerId}/pets/{petId}"), &table, &mut rng);
        assert!(!resolved.url.contains('{'));
        assert!(resolved.url.starts_with("/owners/"));
    }
}
