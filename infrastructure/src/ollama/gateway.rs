//! Ollama member gateway
//!
//! Wraps one Ollama-served model behind the `MemberGateway` port using
//! the `/api/generate` endpoint. The per-call timeout and retry budget
//! live in the application layer; this adapter only classifies the
//! failures it sees.

use async_trait::async_trait;
use council_application::ports::member_gateway::{GatewayError, MemberGateway};
use council_domain::MemberId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Gateway to one model served by a local or remote Ollama instance
pub struct OllamaGateway {
    member_id: MemberId,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaGateway {
    pub fn new(
        member_id: MemberId,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            member_id,
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify(status: reqwest::StatusCode, body: String) -> GatewayError {
        match status.as_u16() {
            401 | 403 => GatewayError::Authentication(body),
            429 => GatewayError::RateLimited(body),
            _ => GatewayError::Transport(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl MemberGateway for OllamaGateway {
    fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    async fn respond(&self, prompt: &str, context: Option<&str>) -> Result<String, GatewayError> {
        let full_prompt = match context {
            Some(ctx) => format!("{prompt}\n\n{ctx}"),
            None => prompt.to_string(),
        };

        debug!(member = %self.member_id, model = %self.model, "sending generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &full_prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify(status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(parsed.response)
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        matches!(result, Ok(resp) if resp.status().is_success())
    }
}
