//! Inference provider implementations for todobot.
//!
//! All providers implement the `todobot_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod huggingface;
pub mod openai_compat;
pub mod router;

use todobot_core::error::ProviderError;

pub use huggingface::HuggingFaceProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;

/// Classify a failed `send()` as a timeout or a network error.
pub(crate) fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}
