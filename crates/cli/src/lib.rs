//! Wiring for the `todobot` binary: build a session from configuration and
//! drive it from a terminal channel.

use std::sync::Arc;

use thiserror::Error;
use todobot_agent::{AgentLoop, Session};
use todobot_channels::{ChannelError, CliChannel};
use todobot_config::{AppConfig, ConfigError};
use todobot_core::error::{ProviderError, StoreError};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

/// Printed once the session is ready.
pub const BANNER: &str = "AI To-Do List Assistant started";

/// Anything that stops the process before the first prompt.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Todo store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Inference provider unavailable: {0}")]
    Provider(#[from] ProviderError),
}

/// Check secrets, open the store, and assemble the agent.
pub async fn build_session(config: &AppConfig) -> Result<Session, StartupError> {
    config.require_api_key()?;
    config.require_database_url()?;

    let store = todobot_store::open(&config.store).await?;
    info!(store = store.name(), "Todo store ready");

    let tools = Arc::new(todobot_tools::todo_registry(store));
    let provider = todobot_providers::build_from_config(config)?;
    let agent = AgentLoop::from_config(config, provider, tools);

    info!(
        provider = config.provider.kind.as_str(),
        model = config.provider.effective_model(),
        max_steps = config.agent.max_steps,
        "Agent ready"
    );
    Ok(Session::new(agent))
}

/// Read lines until EOF or an exit word, printing one reply per line.
/// Returns how many lines were handled.
pub async fn repl<R, W>(
    session: &mut Session,
    channel: &mut CliChannel<R, W>,
) -> Result<usize, ChannelError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut turns = 0;
    while let Some(line) = channel.read_line().await? {
        let outcome = session.handle_line(&line).await;
        if !outcome.is_reply() {
            warn!(turn = turns + 1, "Turn ended without an answer");
        }
        channel.send(&outcome.render()).await?;
        turns += 1;
    }
    Ok(turns)
}
