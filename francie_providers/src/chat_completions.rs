use std::time::Duration;

use francie_core::{ChatMessage, GatewayError};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

/// Client for `POST {base_url}/chat/completions` with bearer auth.
pub struct ChatCompletionsClient {
    client: Client,
    provider: &'static str,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl ChatCompletionsClient {
    pub fn new(
        provider: &'static str,
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: None,
        })
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn ensure_configured(&self) -> Result<(), GatewayError> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(format!(
                "no API key configured for provider '{}'",
                self.provider
            )));
        }
        Ok(())
    }

    /// Send `messages` and return the first choice's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        self.ensure_configured()?;

        let mut request = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            request["temperature"] = json!(temperature);
        }

        info!(
            "Sending request to {} API: model={}, messages={}",
            self.provider,
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(upstream_from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream(
                Some(status.as_u16()),
                if detail.is_empty() {
                    status.to_string()
                } else {
                    detail
                },
            ));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(upstream_from_transport)?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::upstream(
                    Some(status.as_u16()),
                    "Invalid response format: missing content",
                )
            })?
            .to_string();

        if content.trim().is_empty() {
            return Err(GatewayError::upstream(
                Some(status.as_u16()),
                "Empty completion from provider",
            ));
        }

        debug!("Received {} bytes from {} API", content.len(), self.provider);
        Ok(content)
    }
}

fn upstream_from_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::upstream(None, format!("request timed out: {err}"))
    } else {
        GatewayError::upstream(err.status().map(|s| s.as_u16()), err.to_string())
    }
}
