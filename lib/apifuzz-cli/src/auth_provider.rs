//! One-shot login handshake [`AuthProvider`]: POSTs username/password to the
//! configured auth path and extracts a bearer token, or passes a
//! pre-supplied token/API key through untouched.

use apifuzz_core::auth::extract_token;
use apifuzz_core::config::FuzzConfig;
use apifuzz_core::sender::AuthProvider;
use async_trait::async_trait;
use tracing::warn;

/// Resolves one auth header per run, either from pre-supplied config
/// material or via a login POST.
pub struct LoginAuthProvider {
    client: reqwest::Client,
    base_url: String,
    config: FuzzConfig,
}

impl LoginAuthProvider {
    /// Builds a provider over `config`, using `client` for the login
    /// request if a handshake turns out to be needed.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: String, config: FuzzConfig) -> Self {
        Self { client, base_url, config }
    }

    async fn login(&self, auth_path: &str, username: &str, password: &str) -> Option<(String, String)> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), auth_path);
        let body = serde_json::json!({"username": username, "password": password});

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "auth handshake request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "auth handshake returned a non-success status");
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "auth handshake response was not JSON");
                return None;
            }
        };

        match extract_token(&body) {
            Some(token) => Some(("Authorization".to_string(), format!("Bearer {token}"))),
            None => {
                warn!("auth handshake response contained no recognizable token field");
                None
            }
        }
    }
}

#[async_trait]
impl AuthProvider for LoginAuthProvider {
    async fn acquire(&self) -> Option<(String, String)> {
        if let Some(token) = &self.config.token {
            return Some(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let (Some(name), Some(value)) = (&self.config.key_name, &self.config.key_value) {
            return Some((name.clone(), value.clone()));
        }

        let (Some(auth_path), Some(username), Some(password)) =
            (&self.config.auth_path, &self.config.username, &self.config.password)
        else {
            warn!("no auth material configured; fuzzing without an auth header");
            return None;
        };

        self.login(auth_path, username, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_returns_pre_supplied_token_without_network() {
        let config = FuzzConfig { token: Some("abc".to_string()), ..Default::default() };
        let provider = LoginAuthProvider::new(reqwest::Client::new(), "http://127.0.0.1:1".to_string(), config);
        let header = provider.acquire().await;
        assert_eq!(header, Some(("Authorization".to_string(), "Bearer abc".to_string())));
    }

    #[tokio::test]
    async fn test_acquire_returns_api_key_header_without_network() {
        let config = FuzzConfig {
            key_name: Some("X-API-Key".to_string()),
            key_value: Some("secret".to_string()),
            ..Default::default()
        };
        let provider = LoginAuthProvider::new(reqwest::Client::new(), "http://127.0.0.1:1".to_string(), config);
        let header = provider.acquire().await;
        assert_eq!(header, Some(("X-API-Key".to_string(), "secret".to_string())));
    }

    #[tokio::test]
    async fn test_acquire_none_without_material() {
        let provider =
            LoginAuthProvider::new(reqwest::Client::new(), "http://127.0.0.1:1".to_string(), FuzzConfig::default());
        assert_eq!(provider.acquire().await, None);
    }

    #[tokio::test]
    async fn test_token_takes_priority_over_api_key() {
        let config = FuzzConfig {
            token: Some("abc".to_string()),
            key_name: Some("X-API-Key".to_string()),
            key_value: Some("secret".to_string()),
            ..Default::default()
        };
        let provider = LoginAuthProvider::new(reqwest::Client::new(), "http://127.0.0.1:1".to_string(), config);
        let header = provider.acquire().await;
        assert_eq!(header, Some(("Authorization".to_string(), "Bearer abc".to_string())));
    }
}
