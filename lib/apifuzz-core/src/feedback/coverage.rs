//! Per-sequence coverage extraction: the same six dimensions tracked in
//! [`crate::spec::SpecInfo`], but measured against the requests/responses a
//! single test sequence actually produced.

use std::collections::BTreeSet;

use crate::sender::{FuzzRequest, FuzzResponse};

/// The coverage a single test sequence achieved, across the six dimensions
/// scored by [`super::tcl::calculate_tcl_score`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Concrete URL paths (query string stripped) that were requested.
    pub paths: BTreeSet<String>,
    /// `(method, path)` pairs that were requested.
    pub operations: BTreeSet<(String, String)>,
    /// Header names and top-level request-body property names that were
    /// exercised.
    pub parameters: BTreeSet<String>,
    /// Response status codes seen, formatted as a decimal string.
    pub status_codes: BTreeSet<String>,
    /// Top-level response body field names seen, across every JSON-object
    /// response.
    pub response_fields: BTreeSet<String>,
    /// `(method, path, content-type)` triples for every request that sent a
    /// body with a declared `Content-Type`.
    pub input_content_types: BTreeSet<(String, String, String)>,
}

impl Coverage {
    /// Unions `other` into `self`, in place — the accretion step that turns
    /// per-sequence coverage into the engine's monotonically-growing
    /// cumulative coverage.
    pub fn merge(&mut self, other: &Coverage) {
        self.paths.extend(other.paths.iter().cloned());
        self.operations.extend(other.operations.iter().cloned());
        self.parameters.extend(other.parameters.iter().cloned());
        self.status_codes.extend(other.status_codes.iter().cloned());
        self.response_fields.extend(other.response_fields.iter().cloned());
        self.input_content_types.extend(other.input_content_types.iter().cloned());
    }
}

/// Extracts the [`Coverage`] a sequence of requests and their corresponding
/// responses achieved.
///
/// `requests` and `responses` are assumed to be paired by index (the same
/// pairing used by the corpus's `TestEntry`).
#[must_use]
pub fn extract_seq_coverage(requests: &[FuzzRequest], responses: &[FuzzResponse]) -> Coverage {
    let mut coverage = Coverage::default();

    for request in requests {
        let path = request.path_without_query().to_string();
        coverage.operations.insert((request.method.clone(), path.clone()));
        coverage.paths.insert(path.clone());

        for (header_name, _) in &request.headers {
            coverage.parameters.insert(header_name.clone());
        }
        if let Some(body) = request.body.as_ref().and_then(serde_json::Value::as_object) {
            for key in body.keys() {
                coverage.parameters.insert(key.clone());
            }
        }

        if request.body.is_some() {
            if let Some(content_type) = header_lookup(&request.headers, "Content-Type") {
                coverage
                    .input_content_types
                    .insert((request.method.clone(), path, content_type.to_string()));
            }
        }
    }

    for response in responses {
        coverage.status_codes.insert(response.status.to_string());
        if let Ok(serde_json::Value::Object(body)) = serde_json::from_str(&response.body) {
            for key in body.keys() {
                coverage.response_fields.insert(key.clone());
            }
        }
    }

    coverage
}

fn header_lookup<'a>(
    headers: &'a indexmap::IndexMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
