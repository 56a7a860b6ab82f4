//! One interactive session: the agent plus the conversation it owns.

use todobot_core::message::Conversation;

use crate::loop_runner::{AgentLoop, TurnOutcome};
use crate::prompt::system_prompt;

/// Holds the only conversation for the process. It is seeded once with the
/// system prompt and never reset between lines.
pub struct Session {
    agent: AgentLoop,
    conversation: Conversation,
}

impl Session {
    pub fn new(agent: AgentLoop) -> Self {
        let conversation = Conversation::new(system_prompt(agent.tools()));
        Self {
            agent,
            conversation,
        }
    }

    /// Run one user line through the agent.
    pub async fn handle_line(&mut self, line: &str) -> TurnOutcome {
        self.agent.process(&mut self.conversation, line).await
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
