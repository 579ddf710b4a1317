//! Authentication header modeling, shared by whatever [`crate::sender::AuthProvider`]
//! the host binary wires up.
//!
//! This module is deliberately inert: it knows how to turn a resolved
//! credential into an `(header name, header value)` pair, and nothing about
//! *how* that credential was acquired (the login handshake itself is an
//! external collaborator — see [`crate::sender::AuthProvider`]).

use base64::Engine;
use serde::{Deserialize, Serialize};

/// A resolved authentication credential, ready to be turned into a header.
///
/// Mirrors the shape of the three schemes named in the spec's
/// `AuthProvider` contract (`http`/`basic`, `apiKey`, `bearer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `Authorization: Basic <base64(username:password)>`.
    Basic {
        /// Login username.
        username: String,
        /// Login password.
        password: String,
    },
    /// An arbitrary header carrying an API key, e.g. `X-API-Key: <key>`.
    ApiKey {
        /// Header name to send the key under.
        header_name: String,
        /// The key value.
        key: String,
    },
}

impl Authentication {
    /// Builds the `(header name, header value)` pair to merge into every
    /// outgoing request.
    #[must_use]
    pub fn to_header(&self) -> (String, String) {
        match self {
            Authentication::Bearer(token) => ("Authorization".to_string(), format!("Bearer {token}")),
            Authentication::Basic { username, password } => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                ("Authorization".to_string(), format!("Basic {credentials}"))
            }
            Authentication::ApiKey { header_name, key } => (header_name.clone(), key.clone()),
        }
    }
}

/// Pulls a token out of a login response body, trying the three field names
/// the spec's `AuthProvider` contract names, in order.
#[must_use]
pub fn extract_token(body: &serde_json::Value) -> Option<String> {
    for field in ["token", "access_token", "key"] {
        if let Some(value) = body.get(field).and_then(serde_json::Value::as_str) {
            return Some(value.to_string());
        }
    }
    None
}
