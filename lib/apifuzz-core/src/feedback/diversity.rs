//! Response-field diversity: rewards a response for surfacing JSON fields
//! never seen before across the whole run, independent of TCL coverage.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::sender::FuzzResponse;

/// Flattens a nested JSON value into dot-and-index-separated leaf keys.
///
/// `{"a": {"b": 1, "c": [{"d": 2}]}}` flattens to the keys `a.b` and
/// `a.c.0.d`.
#[must_use]
pub fn flatten_json(value: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    flatten_into(value, String::new(), &mut keys);
    keys
}

fn flatten_into(value: &Value, prefix: String, keys: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, new_prefix, keys);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let new_prefix = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{prefix}.{index}")
                };
                flatten_into(child, new_prefix, keys);
            }
        }
        _ => {
            if !prefix.is_empty() {
                keys.insert(prefix);
            }
        }
    }
}

/// Scores a response's field diversity against the globally seen field set.
///
/// Returns `(new_field_count, response_fields)`: the number of flattened
/// field paths in this response that were never seen before, and the full
/// flattened field set for this response (callers fold this into the
/// global seen-fields set). Non-JSON and empty bodies score zero.
#[must_use]
pub fn calculate_diversity(
    response: &FuzzResponse,
    seen_fields: &BTreeSet<String>,
) -> (f64, BTreeSet<String>) {
    let content_type = response.header("content-type").unwrap_or_default();
    if response.body.trim().is_empty() || !content_type.contains("application/json") {
        return (0.0, BTreeSet::new());
    }

    let Ok(body) = serde_json::from_str::<Value>(&response.body) else {
        return (0.0, BTreeSet::new());
    };

    let fields = flatten_json(&body);
    let new_count = fields.difference(seen_fields).count();
    (new_count as f64, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn json_response(body: &str) -> FuzzResponse {
        let mut headers = IndexMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        FuzzResponse {
            status: 200,
            body: body.to_string(),
            headers,
        }
    }

    #[test]
    fn test_flatten_json_nested_object_and_array() {
        let value = serde_json::json!({"a": {"b": 1, "c": [{"d": 2}]}});
        let keys = flatten_json(&value);
        assert!(keys.contains("a.b"));
        assert!(keys.contains("a.c.0.d"));
    }

    #[test]
    fn test_diversity_scores_new_fields_only() {
        let response = json_response(r#"{"id": 1, "name": "fido"}"#);
        let seen: BTreeSet<String> = ["id".to_string()].into_iter().collect();
        let (new_count, fields) = calculate_diversity(&response, &seen);
        assert_eq!(new_count, 1.0);
        assert!(fields.contains("id"));
        assert!(fields.contains("name"));
    }

    #[test]
    fn test_diversity_zero_for_non_json_content_type() {
        let mut response = json_response(r#"{"id": 1}"#);
        response
            .headers
            .insert("content-type".to_string(), "text/plain".to_string());
        let (new_count, fields) = calculate_diversity(&response, &BTreeSet::new());
        assert_eq!(new_count, 0.0);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_diversity_zero_for_empty_body() {
        let response = json_response("");
        let (new_count, _) = calculate_diversity(&response, &BTreeSet::new());
        assert_eq!(new_count, 0.0);
    }

    #[test]
    fn test_diversity_zero_for_malformed_json() {
        let response = json_response("{not json");
        let (new_count, _) = calculate_diversity(&response, &BTreeSet::new());
        assert_eq!(new_count, 0.0);
    }
}
