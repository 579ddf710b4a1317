//! Transport-agnostic request/response types and the `RequestSender` and
//! `AuthProvider` collaborator traits.
//!
//! Everything in this module is inert data plus two trait boundaries. The
//! engine never speaks HTTP directly — it hands a [`FuzzRequest`] to
//! whatever [`RequestSender`] the host binary wired up (a `reqwest` client
//! in `apifuzz-cli`, a mock in tests) and gets a [`FuzzResponse`] back.

use indexmap::IndexMap;
use serde_json::Value;

use crate::spec::Parameter;

/// A single HTTP request, possibly still containing unresolved `{name}`
/// path placeholders.
///
/// After [`crate::dependency::resolve_dependencies`] runs, `url` is
/// guaranteed to contain no `{…}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    /// URL path, possibly with unresolved `{name}` placeholders.
    pub url: String,
    /// Header name → value. Header values may themselves be the literal
    /// string `"{name}"` prior to dependency resolution.
    pub headers: IndexMap<String, String>,
    /// The JSON request body, if any.
    pub body: Option<Value>,
    /// The owning endpoint's declared parameters, carried along so the
    /// dependency resolver can fall back to schema-derived dummies for
    /// unresolved placeholders.
    pub parameters: Vec<Parameter>,
}

impl FuzzRequest {
    /// The URL path with any query string stripped — used for path/operation
    /// coverage and signature computation.
    #[must_use]
    pub fn path_without_query(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// A single HTTP response, or a synthesized stand-in for a transport error.
///
/// `status` of `0` denotes a transport-level failure (timeout, connection
/// error); genuine HTTP responses always carry a valid status code.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzResponse {
    /// HTTP status code, or `0` for a synthesized transport error.
    pub status: u16,
    /// Raw response body text.
    pub body: String,
    /// Response headers.
    pub headers: IndexMap<String, String>,
}

impl FuzzResponse {
    /// Builds a synthesized error response for a transport failure:
    /// `{status: 0, body: "Error: …", headers: {}}`.
    #[must_use]
    pub fn transport_error(message: impl std::fmt::Display) -> Self {
        Self {
            status: 0,
            body: format!("Error: {message}"),
            headers: IndexMap::new(),
        }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// External collaborator that performs the actual HTTP request.
///
/// Implementations own retry-on-401/403 and per-request timeout policy
/// (a 5s timeout yielding a synthesized error response on expiry is the
/// expected behavior of a production sender).
#[async_trait::async_trait]
pub trait RequestSender: Send + Sync {
    /// Sends a single request against `base_url`, merging in `auth_header`
    /// if present, and returns the resulting response (or a synthesized
    /// transport-error response — this method must never propagate a
    /// transport error as an `Err`, since the feedback pipeline needs to
    /// score it like any other response).
    async fn send(
        &self,
        request: &FuzzRequest,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
    ) -> FuzzResponse;
}

/// External collaborator that performs the one-shot auth handshake.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Attempts to acquire an auth header. Returns `None` if no
    /// configuration was supplied or the handshake failed (a warning
    /// should be logged by the implementation; failure is not fatal to the
    /// fuzzing run).
    async fn acquire(&self) -> Option<(String, String)>;
}
