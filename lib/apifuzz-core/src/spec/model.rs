//! Normalized endpoint model shared by every downstream component.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Part of the URL path template, e.g. `/pets/{id}`.
    Path,
    /// A query string parameter.
    Query,
    /// An HTTP header.
    Header,
    /// The request body (Swagger 2.0 `in: body` only; normalized away into
    /// [`Endpoint::request_body`] for v3).
    Body,
}

/// A single declared parameter on an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, as declared (case preserved).
    pub name: String,
    /// Where this parameter is carried.
    pub location: ParameterLocation,
    /// Whether the spec marks this parameter required.
    pub required: bool,
    /// The (already `$ref`-resolved) JSON schema for this parameter's value.
    pub schema: Value,
}

/// The normalized request body: every required property plus the full
/// property map, after `$ref` resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBodySchema {
    /// Property name → resolved schema.
    pub properties: indexmap::IndexMap<String, Value>,
    /// Names of required properties.
    pub required: Vec<String>,
}

/// A single declared response: description plus schema per content type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Human-readable description from the spec.
    pub description: String,
    /// MIME type → resolved schema.
    pub content: indexmap::IndexMap<String, Value>,
}

/// A normalized `(path, method)` operation.
///
/// Invariant: `path_params`, `query_params`, and `header_params` partition
/// `parameters` by [`Parameter::location`] (body parameters are excluded —
/// they're folded into `request_body` instead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// The templated path, e.g. `/pets/{id}`.
    pub path: String,
    /// Upper-cased HTTP method, e.g. `"GET"`.
    pub method: String,
    /// All declared parameters, in spec order.
    pub parameters: Vec<Parameter>,
    /// The normalized request body (from `application/json` content), if any.
    pub request_body: Option<RequestBodySchema>,
    /// Every content type declared under `requestBody.content` (v3 only;
    /// empty for v2, which always implies `application/json`).
    pub request_body_content_types: Vec<String>,
    /// Status code (as a string, matching the spec's own keys) → response.
    pub responses: indexmap::IndexMap<String, ResponseSpec>,
}

impl Endpoint {
    /// Parameters carried in the URL path.
    pub fn path_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
    }

    /// Parameters carried as query string entries.
    pub fn query_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
    }

    /// Parameters carried as HTTP headers.
    pub fn header_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Header)
    }
}
