//! Endpoint → request skeleton synthesis.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::example::generate_example_value;
use crate::rng::FuzzRng;
use crate::sender::FuzzRequest;
use crate::spec::Endpoint;

/// Builds a request skeleton for `endpoint`: path placeholders left
/// intact, headers populated with example values, body populated with
/// every required property (or, for a bare `POST` with none, one
/// optional non-`readOnly` property, preferring ones with a declared
/// `example`).
#[must_use]
pub fn build_request(endpoint: &Endpoint, rng: &mut FuzzRng) -> FuzzRequest {
    let mut headers = IndexMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    for header in endpoint.header_params() {
        let value = generate_example_value(&header.schema, rng)
            .map(value_to_header_string)
            .unwrap_or_default();
        headers.insert(header.name.clone(), value);
    }

    let body = endpoint.request_body.as_ref().and_then(|schema| {
        let mut object = Map::new();

        for name in &schema.required {
            if let Some(definition) = schema.properties.get(name) {
                if let Some(value) = generate_example_value(definition, rng) {
                    object.insert(name.clone(), value);
                }
            }
        }

        if endpoint.method == "POST" && object.is_empty() {
            let required: std::collections::HashSet<&str> =
                schema.required.iter().map(String::as_str).collect();
            let optional_fields: Vec<(String, Value)> = schema
                .properties
                .iter()
                .filter(|(name, definition)| {
                    !required.contains(name.as_str())
                        && !definition.get("readOnly").and_then(Value::as_bool).unwrap_or(false)
                })
                .map(|(name, definition)| (name.clone(), definition.clone()))
                .collect();

            let with_example: Vec<(String, Value)> = optional_fields
                .iter()
                .filter(|(_, definition)| definition.get("example").is_some())
                .cloned()
                .collect();

            let candidates = if with_example.is_empty() {
                &optional_fields
            } else {
                &with_example
            };

            if let Some((name, definition)) = rng.choose(candidates) {
                if let Some(value) = generate_example_value(definition, rng) {
                    object.insert(name.clone(), value);
                }
            }
        }

        if object.is_empty() {
            None
        } else {
            Some(Value::Object(object))
        }
    });

    FuzzRequest {
        method: endpoint.method.clone(),
        url: endpoint.path.clone(),
        headers,
        body,
        parameters: endpoint.parameters.clone(),
    }
}

fn value_to_header_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Parameter, ParameterLocation, RequestBodySchema};
    use serde_json::json;

    fn get_endpoint() -> Endpoint {
        Endpoint {
            path: "/pets/{id}".to_string(),
            method: "GET".to_string(),
            parameters: vec![
                Parameter {
                    name: "id".to_string(),
                    location: ParameterLocation::Path,
                    required: true,
                    schema: json!({"type": "string"}),
                },
                Parameter {
                    name: "X-Trace".to_string(),
                    location: ParameterLocation::Header,
                    required: false,
                    schema: json!({"type": "string"}),
                },
            ],
            request_body: None,
            request_body_content_types: Vec::new(),
            responses: indexmap::IndexMap::new(),
        }
    }

    #[test]
    fn test_build_request_leaves_path_placeholder_intact() {
        let mut rng = FuzzRng::from_seed(1);
        let request = build_request(&get_endpoint(), &mut rng);
        assert_eq!(request.url, "/pets/{id}");
    }

    #[test]
    fn test_build_request_populates_header_example() {
        let mut rng = FuzzRng::from_seed(1);
        let request = build_request(&get_endpoint(), &mut rng);
        assert_eq!(request.headers.get("X-Trace").unwrap(), "example-string");
    }

    #[test]
    fn test_build_request_populates_required_body_fields() {
        let mut rng = FuzzRng::from_seed(1);
        let mut endpoint = get_endpoint();
        endpoint.method = "PUT".to_string();
        endpoint.request_body = Some(RequestBodySchema {
            properties: indexmap::IndexMap::from([
                ("name".to_string(), json!({"type": "string"})),
                ("age".to_string(), json!({"type": "integer"})),
            ]),
            required: vec!["name".to_string()],
        });
        let request = build_request(&endpoint, &mut rng);
        let body = request.body.unwrap();
        assert_eq!(body["name"], json!("example-string"));
        assert!(body.get("age").is_none());
    }

    #[test]
    fn test_build_request_post_with_no_required_fields_adds_one_optional() {
        let mut rng = FuzzRng::from_seed(1);
        let mut endpoint = get_endpoint();
        endpoint.method = "POST".to_string();
        endpoint.request_body = Some(RequestBodySchema {
            properties: indexmap::IndexMap::from([(
                "nickname".to_string(),
                json!({"type": "string"}),
            )]),
            required: Vec::new(),
        });
        let request = build_request(&endpoint, &mut rng);
        let body = request.body.unwrap();
        assert_eq!(body["nickname"], json!("example-string"));
    }

    #[test]
    fn test_build_request_empty_body_is_none() {
        let mut rng = FuzzRng::from_seed(1);
        let mut endpoint = get_endpoint();
        endpoint.method = "GET".to_string();
        endpoint.request_body = Some(RequestBodySchema::default());
        let request = build_request(&endpoint, &mut rng);
        assert!(request.body.is_none());
    }
}
