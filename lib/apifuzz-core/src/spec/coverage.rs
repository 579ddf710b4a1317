//! `SpecInfo`: the aggregate "expected" universe used by TCL scoring.

use std::collections::BTreeSet;

use serde_json::Value;

use super::model::Endpoint;
use super::resolve::resolve_schema;

/// The six expected coverage sets plus the declared body-response
/// expectations, aggregated once from the fully normalized endpoint list.
///
/// `operations` and `input_content_types`/`response_expectations` carry the
/// templated path (not a concrete one) — matching against observed coverage
/// uses the path-template matcher in `feedback::path_match`.
#[derive(Debug, Clone, Default)]
pub struct SpecInfo {
    /// All templated paths declared in the spec.
    pub paths: BTreeSet<String>,
    /// `(method, templated path)` pairs.
    pub operations: BTreeSet<(String, String)>,
    /// Union of every parameter name and request-body property name.
    pub parameters: BTreeSet<String>,
    /// Every declared response status code, as a string.
    pub status_codes: BTreeSet<String>,
    /// Union of top-level property names across every declared response schema.
    pub response_fields: BTreeSet<String>,
    /// `(method, templated path, content type)` for every declared request body content type.
    pub input_content_types: BTreeSet<(String, String, String)>,
    /// `(method, templated path, status)` for responses that promise a body.
    pub response_expectations: BTreeSet<(String, String, String)>,
}

impl SpecInfo {
    /// Builds a [`SpecInfo`] from the full normalized endpoint list.
    #[must_use]
    pub fn from_endpoints(endpoints: &[Endpoint], document: &Value, is_v2: bool) -> Self {
        let mut info = SpecInfo::default();

        for endpoint in endpoints {
            info.paths.insert(endpoint.path.clone());
            info.operations
                .insert((endpoint.method.clone(), endpoint.path.clone()));

            for parameter in &endpoint.parameters {
                info.parameters.insert(parameter.name.clone());
            }
            if let Some(body) = &endpoint.request_body {
                for name in body.properties.keys() {
                    info.parameters.insert(name.clone());
                }
            }

            if is_v2 {
                info.input_content_types.insert((
                    endpoint.method.clone(),
                    endpoint.path.clone(),
                    "application/json".to_string(),
                ));
            } else {
                for content_type in &endpoint.request_body_content_types {
                    info.input_content_types.insert((
                        endpoint.method.clone(),
                        endpoint.path.clone(),
                        content_type.clone(),
                    ));
                }
            }

            for (status, response) in &endpoint.responses {
                info.status_codes.insert(status.clone());

                let schema = response
                    .content
                    .get("application/json")
                    .cloned()
                    .unwrap_or(Value::Null);
                let schema = if schema.is_null() && is_v2 {
                    response.content.values().next().cloned().unwrap_or(Value::Null)
                } else {
                    schema
                };
                let schema = resolve_schema(document, &schema);

                if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                    for name in properties.keys() {
                        info.response_fields.insert(name.clone());
                    }
                }

                let has_schema = !schema.is_null() && schema != Value::Object(Default::default());
                let has_content = !response.content.is_empty();
                if has_schema || has_content {
                    info.response_expectations.insert((
                        endpoint.method.clone(),
                        endpoint.path.clone(),
                        status.clone(),
                    ));
                }
            }
        }

        info
    }
}

/// The union of every path-parameter name declared anywhere in the spec,
/// used to widen the ID harvester's matching tokens beyond `{id, key,
/// token}`.
#[must_use]
pub fn dynamic_param_names(endpoints: &[Endpoint]) -> BTreeSet<String> {
    endpoints
        .iter()
        .flat_map(Endpoint::path_params)
        .map(|p| p.name.to_lowercase())
        .collect()
}
