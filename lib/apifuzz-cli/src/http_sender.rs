//! `reqwest`-backed [`RequestSender`]: per-request timeout and a
//! retry-once-on-401/403 policy that reapplies the auth header explicitly.

use std::time::Duration;

use apifuzz_core::sender::{FuzzRequest, FuzzResponse, RequestSender};
use async_trait::async_trait;
use indexmap::IndexMap;

/// Per-request timeout before a request is treated as a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends requests over a shared `reqwest::Client`.
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn perform(
        &self,
        request: &FuzzRequest,
        base_url: &str,
        auth_header: Option<(&str, &str)>,
    ) -> Result<FuzzResponse, reqwest::Error> {
        let method = http::Method::from_bytes(request.method.as_bytes()).unwrap_or(http::Method::GET);
        let url = format!("{}{}", base_url.trim_end_matches('/'), request.url);

        let mut builder = self.client.request(method, url).timeout(REQUEST_TIMEOUT);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some((name, value)) = auth_header {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).unwrap_or_default();
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: IndexMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.text().await?;

        Ok(FuzzResponse { status, body, headers })
    }
}

#[async_trait]
impl RequestSender for ReqwestSender {
    async fn send(&self, request: &FuzzRequest, base_url: &str, auth_header: Option<(&str, &str)>) -> FuzzResponse {
        let first = self.perform(request, base_url, auth_header).await;

        let needs_retry = auth_header.is_some()
            && matches!(&first, Ok(response) if response.status == 401 || response.status == 403);

        let outcome = if needs_retry {
            self.perform(request, base_url, auth_header).await
        } else {
            first
        };

        match outcome {
            Ok(response) => response,
            Err(error) => FuzzResponse::transport_error(error),
        }
    }
}
