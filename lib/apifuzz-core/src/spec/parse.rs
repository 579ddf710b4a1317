//! Endpoint extraction: turns a raw, `$ref`-laden spec document into the
//! normalized [`Endpoint`] list.

use serde_json::Value;

use super::load::SpecVersion;
use super::model::{Endpoint, Parameter, ParameterLocation, RequestBodySchema, ResponseSpec};
use super::resolve::{resolve_ref, resolve_schema};

const METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Extracts every `(path, method)` operation from `document` as a normalized
/// [`Endpoint`].
#[must_use]
pub fn parse_endpoints(document: &Value, version: SpecVersion) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return endpoints;
    };

    for (path, path_item) in paths {
        let Some(path_item) = path_item.as_object() else {
            continue;
        };
        for method in METHODS {
            let Some(operation) = path_item.get(*method) else {
                continue;
            };
            endpoints.push(parse_operation(document, path, method, operation, version));
        }
    }

    endpoints
}

fn parse_operation(
    document: &Value,
    path: &str,
    method: &str,
    operation: &Value,
    version: SpecVersion,
) -> Endpoint {
    let raw_parameters = operation
        .get("parameters")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut parameters = Vec::new();
    for raw in &raw_parameters {
        if let Some(parameter) = parse_parameter(document, raw, version) {
            parameters.push(parameter);
        }
    }

    let (request_body, request_body_content_types) = match version {
        SpecVersion::OpenApi3 => extract_request_body_v3(document, operation),
        SpecVersion::Swagger2 => (extract_request_body_v2(document, &raw_parameters), Vec::new()),
    };

    let responses = match version {
        SpecVersion::OpenApi3 => extract_responses_v3(document, operation),
        SpecVersion::Swagger2 => extract_responses_v2(document, operation),
    };

    Endpoint {
        path: path.to_string(),
        method: method.to_uppercase(),
        parameters,
        request_body,
        request_body_content_types,
        responses,
    }
}

fn parse_parameter(document: &Value, raw: &Value, version: SpecVersion) -> Option<Parameter> {
    let raw = resolve_ref(document, raw);
    let name = raw.get("name")?.as_str()?.to_string();
    let location = match raw.get("in")?.as_str()? {
        "path" => ParameterLocation::Path,
        "query" => ParameterLocation::Query,
        "header" => ParameterLocation::Header,
        "body" => ParameterLocation::Body,
        _ => return None,
    };
    // A missing `required` key defaults to `true` for path parameters
    // (they're positionally mandatory regardless of what a non-compliant
    // document says) and `false` everywhere else.
    let required = raw
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(location == ParameterLocation::Path);

    let schema = match version {
        SpecVersion::OpenApi3 => raw.get("schema").cloned().unwrap_or(Value::Null),
        SpecVersion::Swagger2 => {
            if location == ParameterLocation::Body {
                raw.get("schema").cloned().unwrap_or(Value::Null)
            } else {
                // Swagger 2.0 non-body parameters carry `type`/`format`/`enum`
                // directly on the parameter object.
                let mut schema = serde_json::Map::new();
                for key in ["type", "format", "enum", "pattern", "minimum", "maximum"] {
                    if let Some(value) = raw.get(key) {
                        schema.insert(key.to_string(), value.clone());
                    }
                }
                Value::Object(schema)
            }
        }
    };

    Some(Parameter {
        name,
        location,
        required,
        schema: resolve_schema(document, &schema),
    })
}

fn extract_request_body_v3(
    document: &Value,
    operation: &Value,
) -> (Option<RequestBodySchema>, Vec<String>) {
    let Some(content) = operation
        .get("requestBody")
        .map(|body| resolve_ref(document, body))
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object)
    else {
        return (None, Vec::new());
    };

    let content_types: Vec<String> = content.keys().cloned().collect();

    let body = content
        .get("application/json")
        .and_then(|media| media.get("schema"))
        .map(|schema| resolve_schema(document, schema))
        .map(|schema| RequestBodySchema {
            properties: schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            required: schema
                .get("required")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        });

    (body, content_types)
}

fn extract_request_body_v2(document: &Value, parameters: &[Value]) -> Option<RequestBodySchema> {
    let body_param = parameters.iter().find(|param| {
        resolve_ref(document, param)
            .get("in")
            .and_then(Value::as_str)
            == Some("body")
    })?;
    let schema = resolve_ref(document, body_param).get("schema")?;
    let schema = resolve_schema(document, schema);

    Some(RequestBodySchema {
        properties: schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default(),
        required: schema
            .get("required")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
    })
}

fn extract_responses_v3(
    document: &Value,
    operation: &Value,
) -> indexmap::IndexMap<String, ResponseSpec> {
    let mut parsed = indexmap::IndexMap::new();
    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return parsed;
    };

    for (status, response) in responses {
        let response = resolve_ref(document, response);
        let description = response
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut content = indexmap::IndexMap::new();
        if let Some(raw_content) = response.get("content").and_then(Value::as_object) {
            for (mime, media) in raw_content {
                if let Some(schema) = media.get("schema") {
                    content.insert(mime.clone(), resolve_schema(document, schema));
                }
            }
        }

        parsed.insert(status.clone(), ResponseSpec { description, content });
    }

    parsed
}

fn extract_responses_v2(
    document: &Value,
    operation: &Value,
) -> indexmap::IndexMap<String, ResponseSpec> {
    let mut parsed = indexmap::IndexMap::new();
    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return parsed;
    };

    for (status, response) in responses {
        let response = resolve_ref(document, response);
        let description = response
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut content = indexmap::IndexMap::new();
        if let Some(schema) = response.get("schema") {
            let schema = resolve_schema(document, schema);
            if !schema.is_null() {
                content.insert("application/json".to_string(), schema);
            }
        }

        parsed.insert(status.clone(), ResponseSpec { description, content });
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_v3_get() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, "GET");
        assert_eq!(endpoints[0].path, "/pets");
    }

    #[test]
    fn test_parse_v3_request_body_required_fields() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "required": ["name"],
                                        "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
                                    }
                                }
                            }
                        },
                        "responses": {"201": {"description": "created"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        let body = endpoints[0].request_body.as_ref().unwrap();
        assert_eq!(body.required, vec!["name".to_string()]);
        assert!(body.properties.contains_key("age"));
    }

    #[test]
    fn test_parse_v2_body_parameter() {
        let document = json!({
            "swagger": "2.0",
            "paths": {
                "/pets": {
                    "post": {
                        "parameters": [{
                            "name": "body",
                            "in": "body",
                            "required": true,
                            "schema": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}}
                        }],
                        "responses": {"201": {"description": "created"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::Swagger2);
        let body = endpoints[0].request_body.as_ref().unwrap();
        assert_eq!(body.required, vec!["name".to_string()]);
    }

    #[test]
    fn test_parse_path_parameter() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets/{id}": {
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        assert_eq!(endpoints[0].path_params().count(), 1);
        assert!(endpoints[0].path_params().next().unwrap().required);
    }

    #[test]
    fn test_path_parameter_defaults_required_true_when_omitted() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets/{id}": {
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        assert!(endpoints[0].path_params().next().unwrap().required);
    }

    #[test]
    fn test_query_parameter_defaults_required_false_when_omitted() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        assert!(!endpoints[0].query_params().next().unwrap().required);
    }

    #[test]
    fn test_parse_multiple_methods_on_same_path() {
        let document = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {"responses": {"200": {"description": "ok"}}},
                    "post": {"responses": {"201": {"description": "created"}}}
                }
            }
        });
        let endpoints = parse_endpoints(&document, SpecVersion::OpenApi3);
        assert_eq!(endpoints.len(), 2);
    }
}
