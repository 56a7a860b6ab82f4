//! Provider router: builds the configured inference client.

use std::sync::Arc;
use std::time::Duration;

use todobot_config::{AppConfig, ProviderKind};
use todobot_core::error::ProviderError;
use todobot_core::provider::Provider;
use tracing::info;

use crate::huggingface::{self, HuggingFaceProvider};
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `config.provider.kind`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("no API key".into()))?;
    let timeout = Duration::from_secs(config.agent.request_timeout_secs);
    let kind = config.provider.kind;
    let base_url = config
        .provider
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url(kind).to_string());

    let provider: Arc<dyn Provider> = match kind {
        ProviderKind::Huggingface => {
            Arc::new(HuggingFaceProvider::with_options(&base_url, api_key, timeout)?)
        }
        ProviderKind::Openai => Arc::new(
            OpenAiCompatProvider::with_timeout(kind.as_str(), &base_url, api_key, timeout)?
                .with_developer_role(true),
        ),
        ProviderKind::Openrouter | ProviderKind::Ollama => Arc::new(
            OpenAiCompatProvider::with_timeout(kind.as_str(), &base_url, api_key, timeout)?,
        ),
    };

    info!(
        provider = provider.name(),
        model = config.provider.effective_model(),
        "Inference provider ready"
    );
    Ok(provider)
}

/// Get the default base URL for a provider kind.
fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Huggingface => huggingface::DEFAULT_BASE_URL,
        ProviderKind::Openai => "https://api.openai.com/v1",
        ProviderKind::Openrouter => "https://openrouter.ai/api/v1",
        ProviderKind::Ollama => "http://localhost:11434/v1",
    }
}
