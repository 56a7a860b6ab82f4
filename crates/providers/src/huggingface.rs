//! Hugging Face Inference API provider (text generation).
//!
//! Text-generation models take a single prompt string, so the whole message
//! history is serialized to JSON and sent as `inputs`. The reply is
//! `[{"generated_text": "..."}]`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use todobot_core::error::ProviderError;
use todobot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use tracing::{debug, warn};

use crate::map_send_error;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

pub struct HuggingFaceProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn build_body(request: &ProviderRequest) -> Result<serde_json::Value, ProviderError> {
        let prompt = serde_json::to_string(&request.messages)
            .map_err(|e| ProviderError::NotConfigured(format!("Cannot encode prompt: {e}")))?;

        let mut parameters = serde_json::json!({ "return_full_text": false });
        if let Some(max_tokens) = request.max_tokens {
            parameters["max_new_tokens"] = serde_json::json!(max_tokens);
        }
        // The API rejects a temperature of exactly zero.
        if request.temperature > 0.0 {
            parameters["temperature"] = serde_json::json!(request.temperature);
        }

        Ok(serde_json::json!({
            "inputs": prompt,
            "parameters": parameters,
            "options": { "wait_for_model": true },
        }))
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/models/{}", self.base_url, request.model);
        let body = Self::build_body(&request)?;

        if request.json_mode {
            debug!("JSON mode is not supported by text generation; relying on the prompt");
        }
        debug!(model = %request.model, messages = request.messages.len(), "Sending request to Hugging Face");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Hugging Face API key".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Hugging Face API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let generations: Vec<Generation> = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Unexpected Hugging Face response: {e}"))
        })?;

        let content = generations
            .into_iter()
            .next()
            .and_then(|g| g.generated_text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("Response has no generated_text".into())
            })?;

        Ok(ProviderResponse {
            content,
            model: request.model,
            usage: None,
        })
    }
}
