//! ID harvesting: pulls candidate resource identifiers out of a response
//! body, filtered by plausibility and key-name matching.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::dependency::DynamicIdTable;

const BASE_TOKENS: &[&str] = &["id", "key", "token"];
const MAX_ID_LENGTH: usize = 30;

/// Extracts candidate IDs from a raw JSON response body.
///
/// `dynamic_param_names` (already lowercased) widens the matching tokens
/// beyond the built-in `{id, key, token}`. Malformed JSON yields an empty
/// table silently — this is a best-effort signal, not a parser.
#[must_use]
pub fn extract_ids(json_body: &str, dynamic_param_names: &BTreeSet<String>) -> DynamicIdTable {
    let mut found = IndexMap::new();
    let Ok(parsed) = serde_json::from_str::<Value>(json_body) else {
        return found;
    };

    let match_tokens: BTreeSet<String> = BASE_TOKENS
        .iter()
        .map(|t| (*t).to_string())
        .chain(dynamic_param_names.iter().cloned())
        .collect();

    recursive_extract(&parsed, &match_tokens, &mut found);
    found
}

fn recursive_extract(value: &Value, match_tokens: &BTreeSet<String>, found: &mut DynamicIdTable) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                        let key_lower = key.to_lowercase();
                        let Some(stringified) = scalar_to_string(child) else {
                            continue;
                        };
                        if is_valid_id(&stringified) {
                            if let Some(token) = match_tokens
                                .iter()
                                .find(|token| key_lower.starts_with(*token) || key_lower.ends_with(*token))
                            {
                                found
                                    .entry(token.clone())
                                    .or_insert_with(IndexSet::new)
                                    .insert(stringified);
                            }
                        }
                    }
                    Value::Object(_) | Value::Array(_) => {
                        recursive_extract(child, match_tokens, found);
                    }
                    Value::Null => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                recursive_extract(item, match_tokens, found);
            }
        }
        _ => {}
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True".to_string() } else { "False".to_string() }),
        _ => None,
    }
}

fn is_valid_id(value: &str) -> bool {
    value.len() <= MAX_ID_LENGTH
        && !value.contains(' ')
        && value.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
