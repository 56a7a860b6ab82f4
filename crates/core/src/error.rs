//! Error types for the todobot domain.
//!
//! One `thiserror` enum per boundary the agent loop crosses.

use thiserror::Error;

/// Failures talking to the inference endpoint.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// The reply shown to the user in place of a model answer.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout(_) => "AI request failed. Try again later.",
            Self::InvalidResponse(_) => "AI response error. Try again.",
            Self::ApiError { .. }
            | Self::RateLimited { .. }
            | Self::AuthenticationFailed(_)
            | Self::NotConfigured(_) => "The AI service returned an error. Try again later.",
        }
    }
}

/// Failures inside a todo store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Failures dispatching or executing a tool.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for {tool_name}: {reason}")]
    InvalidInput { tool_name: String, reason: String },

    #[error("Tool {tool_name} failed: {source}")]
    Store {
        tool_name: String,
        #[source]
        source: StoreError,
    },

    #[error("Tool {tool_name} could not encode its result: {reason}")]
    Encoding { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },
}

impl ToolError {
    pub fn invalid_input(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }

    pub fn store(tool_name: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            tool_name: tool_name.into(),
            source,
        }
    }
}
