//! `FuzzConfig`: the optional `config.json` that supplies auth material and
//! base-URL overrides.
//!
//! A missing or malformed config file is never fatal — callers fall back to
//! [`FuzzConfig::default`] and log a warning, matching the prototype's bare
//! `except Exception: return {}`.

use serde::{Deserialize, Serialize};

/// Optional run configuration, loaded from `config.json`.
///
/// Every field is optional: an absent file, or one that sets none of these,
/// simply means the fuzzer runs without an auth header against the
/// CLI-supplied base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzConfig {
    /// Path (relative to `base_url`) of the login endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_path: Option<String>,
    /// Overrides the CLI's `--base-url` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Login username, sent to `auth_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password, sent to `auth_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Header name to use for an API-key scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// API-key value, used directly without a login handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value: Option<String>,
    /// A pre-acquired bearer token, used directly without a login handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl FuzzConfig {
    /// Parses a config document from its raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `text` is not valid JSON or does
    /// not match this shape; callers are expected to treat any error as
    /// "use the default config", not as fatal.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// True iff enough material is present to attempt any auth handshake at
    /// all (a pre-supplied token/key, or login credentials plus a path).
    #[must_use]
    pub fn has_auth_material(&self) -> bool {
        self.token.is_some()
            || self.key_value.is_some()
            || (self.username.is_some() && self.password.is_some() && self.auth_path.is_some())
    }
}
