//! Deep sequence mutation: the mutation-mode counterpart to shallow
//! single-field mutation, applied to every request in a sequence at once.

use serde_json::{Map, Value};

use crate::feedback::path_match::match_path;
use crate::rng::FuzzRng;
use crate::sender::FuzzRequest;
use crate::spec::Endpoint;

/// Fills in every missing optional body property across the whole
/// sequence with a boundary/invalid fuzz value, one request at a time.
///
/// Requests whose endpoint can't be identified, or that declare no body
/// schema, pass through unchanged. Headers are never touched.
#[must_use]
pub fn deep_mutation(sequence: &[FuzzRequest], endpoints: &[Endpoint], rng: &mut FuzzRng) -> Vec<FuzzRequest> {
    sequence
        .iter()
        .map(|request| deep_mutate_one(request, endpoints, rng))
        .collect()
}

fn deep_mutate_one(request: &FuzzRequest, endpoints: &[Endpoint], rng: &mut FuzzRng) -> FuzzRequest {
    let mut mutated = request.clone();

    let Some(endpoint) = find_endpoint_by_request(request, endpoints) else {
        return mutated;
    };
    let Some(schema) = &endpoint.request_body else {
        return mutated;
    };

    let mut body = match &mutated.body {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    let required: std::collections::HashSet<&str> =
        schema.required.iter().map(String::as_str).collect();
    for (field, field_schema) in &schema.properties {
        if !body.contains_key(field) && !required.contains(field.as_str()) {
            body.insert(field.clone(), generate_fuzz_value(field_schema, rng));
        }
    }

    mutated.body = Some(Value::Object(body));
    mutated
}

fn find_endpoint_by_request<'a>(request: &FuzzRequest, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
    let path = request.path_without_query();
    endpoints
        .iter()
        .find(|ep| ep.method == request.method && match_path(path, &ep.path))
}

/// Generates a boundary/invalid value for an optional field, biased
/// toward values likely to break naive validation.
#[must_use]
pub fn generate_fuzz_value(schema: &Value, rng: &mut FuzzRng) -> Value {
    match schema.get("type").and_then(Value::as_str) {
        Some("string") => {
            let options = ["".to_string(), "a".repeat(1000), "💥💥💥".to_string(), "\0".to_string(), "null".to_string(), "1234".to_string()];
            rng.choose(&options).cloned().map(Value::String).unwrap_or_default()
        }
        Some("integer") => {
            let options: [i64; 5] = [-1, 0, 1, i64::from(i32::MAX), i64::from(i32::MIN)];
            rng.choose(&options).copied().map(Value::from).unwrap_or(Value::from(0))
        }
        Some("number") => {
            let options: [f64; 5] = [-1.0, 0.0, 3.14159, f64::INFINITY, f64::NEG_INFINITY];
            let chosen = *rng.choose(&options).unwrap_or(&0.0);
            serde_json::Number::from_f64(chosen).map_or_else(
                || Value::String(if chosen.is_sign_positive() { "Infinity".to_string() } else { "-Infinity".to_string() }),
                Value::Number,
            )
        }
        Some("boolean") => {
            let options = [true, false];
            Value::Bool(*rng.choose(&options).unwrap_or(&true))
        }
        Some("array") => Value::Array(Vec::new()),
        Some("object") => Value::Object(Map::new()),
        _ => Value::String("fuzz".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn endpoint_with_body() -> Endpoint {
        Endpoint {
            path: "/pets".to_string(),
            method: "POST".to_string(),
            parameters: Vec::new(),
            request_body: Some(crate::spec::RequestBodySchema {
                properties: indexmap::IndexMap::from([
                    ("name".to_string(), json!({"type": "string"})),
                    ("tag".to_string(), json!({"type": "string"})),
                ]),
                required: vec!["name".to_string()],
            }),
            request_body_content_types: vec!["application/json".to_string()],
            responses: indexmap::IndexMap::new(),
        }
    }

    fn request() -> FuzzRequest {
        FuzzRequest {
            method: "POST".to_string(),
            url: "/pets".to_string(),
            headers: IndexMap::new(),
            body: Some(json!({"name": "fido"})),
            parameters: Vec::new(),
        }
    }

    #[test]
    fn test_deep_mutation_adds_missing_optional_field() {
        let mut rng = FuzzRng::from_seed(1);
        let endpoints = vec![endpoint_with_body()];
        let mutated = deep_mutation(std::slice::from_ref(&request()), &endpoints, &mut rng);
        let body = mutated[0].body.as_ref().unwrap();
        assert!(body.get("tag").is_some());
        assert_eq!(body["name"], json!("fido"));
    }

    #[test]
    fn test_deep_mutation_skips_unknown_endpoint() {
        let mut rng = FuzzRng::from_seed(1);
        let mutated = deep_mutation(std::slice::from_ref(&request()), &[], &mut rng);
        assert_eq!(mutated[0].body, request().body);
    }

    #[test]
    fn test_generate_fuzz_value_number_handles_infinity() {
        let mut rng = FuzzRng::from_seed(1);
        for _ in 0..20 {
            let value = generate_fuzz_value(&json!({"type": "number"}), &mut rng);
            assert!(value.is_number() || value.is_string());
        }
    }

    #[test]
    fn test_generate_fuzz_value_array_is_empty() {
        let mut rng = FuzzRng::from_seed(1);
        assert_eq!(generate_fuzz_value(&json!({"type": "array"}), &mut rng), json!([]));
    }

    #[test]
    fn test_generate_fuzz_value_unknown_type_is_fuzz() {
        let mut rng = FuzzRng::from_seed(1);
        assert_eq!(
            generate_fuzz_value(&json!({}), &mut rng),
            json!("fuzz")
        );
    }
}
