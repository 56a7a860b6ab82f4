//! The agent reasoning loop implementation.

use std::sync::Arc;
use std::time::Duration;

use todobot_config::AppConfig;
use todobot_core::envelope::Envelope;
use todobot_core::error::{ProviderError, ToolError};
use todobot_core::message::{Conversation, Message};
use todobot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use todobot_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// How a single user line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An `output` envelope: a model answer, a transport apology, or the
    /// step-limit notice.
    Reply(String),

    /// The model said something that is not a usable answer; carries the
    /// raw text.
    Diagnostic(String),

    /// A tool could not be resolved or failed.
    Failed(String),
}

impl TurnOutcome {
    /// The line printed for the user.
    pub fn render(&self) -> String {
        match self {
            Self::Reply(text) => format!("AI: {text}"),
            Self::Diagnostic(raw) => format!("AI (unparsed): {raw}"),
            Self::Failed(reason) => format!("Error: {reason}"),
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }
}

/// The core agent loop that orchestrates model calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// The model to use
    model: String,

    temperature: f32,

    max_tokens: Option<u32>,

    /// Maximum model calls per user line
    max_steps: u32,

    /// Ask the provider for a bare JSON object
    json_mode: bool,

    request_timeout: Duration,

    tool_timeout: Duration,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            max_steps: 10,
            json_mode: true,
            request_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
        }
    }

    /// Create an agent loop with every knob taken from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new(provider, tools, config.provider.effective_model())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_max_steps(config.agent.max_steps)
            .with_json_mode(config.agent.json_mode)
            .with_request_timeout(Duration::from_secs(config.agent.request_timeout_secs))
            .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default max tokens per model reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of model calls per user line. Clamped to 1.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Run one user line to completion.
    ///
    /// The line is appended as a `user` message, then the model is called
    /// until it produces an `output` envelope, something goes wrong, or
    /// `max_steps` calls have been made.
    pub async fn process(&self, conversation: &mut Conversation, line: &str) -> TurnOutcome {
        conversation.append(Message::user(line));
        info!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            "Processing user line"
        );

        for step in 1..=self.max_steps {
            debug!(conversation_id = %conversation.id, step, "Agent loop step");

            let raw = match self.call_model(conversation).await {
                Ok(response) => response.content,
                Err(e) => {
                    warn!(error = %e, "Inference request failed");
                    return Self::finish(conversation, e.user_message().to_string());
                }
            };
            debug!(raw = %raw, "Model reply");

            let envelope = match Envelope::parse(&raw) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(error = %e, "Could not interpret model reply");
                    return TurnOutcome::Diagnostic(raw);
                }
            };

            conversation.append(Message::assistant(&envelope));
            let kind = envelope.kind();

            match envelope {
                Envelope::Output { output } => return TurnOutcome::Reply(output),
                Envelope::Plan { plan } => {
                    debug!(plan = %plan, "Model plan");
                }
                Envelope::Action { function, input } => {
                    let observation = match self.run_tool(&function, input).await {
                        Ok(observation) => observation,
                        Err(e) => {
                            warn!(tool = %function, error = %e, "Tool call failed");
                            return TurnOutcome::Failed(e.to_string());
                        }
                    };
                    info!(tool = %function, "Function executed");
                    conversation.append(Message::observation(observation));
                }
                Envelope::User { .. } | Envelope::Observation { .. } => {
                    warn!(kind, "Model replied with a non-assistant envelope");
                    return TurnOutcome::Diagnostic(raw);
                }
            }
        }

        warn!(
            conversation_id = %conversation.id,
            max_steps = self.max_steps,
            "Step limit reached, forcing output"
        );
        Self::finish(
            conversation,
            format!(
                "I could not finish this request within {} steps. Please try again or rephrase it.",
                self.max_steps
            ),
        )
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.snapshot().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: self.json_mode,
        };

        match tokio::time::timeout(self.request_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "no reply from {} within {}s",
                self.provider.name(),
                self.request_timeout.as_secs()
            ))),
        }
    }

    async fn run_tool(
        &self,
        function: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        tokio::time::timeout(self.tool_timeout, self.tools.execute(function, input))
            .await
            .map_err(|_| ToolError::Timeout {
                tool_name: function.to_string(),
                timeout_secs: self.tool_timeout.as_secs(),
            })?
    }

    /// Append a synthetic `output` envelope and end the turn with it.
    fn finish(conversation: &mut Conversation, output: String) -> TurnOutcome {
        conversation.append(Message::assistant(&Envelope::Output {
            output: output.clone(),
        }));
        TurnOutcome::Reply(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use todobot_core::error::StoreError;
    use todobot_core::message::Role;
    use todobot_core::store::{TodoItem, TodoStore};
    use todobot_core::tool::{TodoOperation, Tool};
    use todobot_store::InMemoryStore;

    /// Replays canned replies in order and records how long each request's
    /// history was.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<&str, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(String::from))
                        .collect(),
                ),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn ok(replies: &[&str]) -> Arc<Self> {
            Self::new(replies.iter().map(|r| Ok(*r)).collect())
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request.messages.len());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(r#"{"type":"plan","plan":"thinking"}"#.into()))?;
            Ok(ProviderResponse {
                content: reply,
                model: request.model,
                usage: None,
            })
        }
    }

    /// Never answers.
    struct StalledProvider;

    #[async_trait::async_trait]
    impl Provider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Network("unreachable".into()))
        }
    }

    /// A getAllTodos stand-in that never finishes.
    struct StalledTool;

    #[async_trait::async_trait]
    impl Tool for StalledTool {
        fn operation(&self) -> TodoOperation {
            TodoOperation::GetAllTodos
        }
        fn signature(&self) -> &str {
            "getAllTodos(): Todo[]"
        }
        fn description(&self) -> &str {
            "never returns"
        }
        async fn execute(&self, _: serde_json::Value) -> Result<serde_json::Value, ToolError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(serde_json::Value::Null)
        }
    }

    /// A store whose database is down.
    #[derive(Default)]
    struct DownStore {
        attempts: AtomicUsize,
    }

    impl DownStore {
        fn refuse<T>(&self) -> Result<T, StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[async_trait::async_trait]
    impl TodoStore for DownStore {
        fn name(&self) -> &str {
            "down"
        }
        async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
            self.refuse()
        }
        async fn create(&self, _: &str) -> Result<i64, StoreError> {
            self.refuse()
        }
        async fn search(&self, _: &str) -> Result<Vec<TodoItem>, StoreError> {
            self.refuse()
        }
        async fn delete(&self, _: i64) -> Result<bool, StoreError> {
            self.refuse()
        }
    }

    fn agent(provider: Arc<dyn Provider>, store: Arc<InMemoryStore>) -> AgentLoop {
        let tools = Arc::new(todobot_tools::todo_registry(store));
        AgentLoop::new(provider, tools, "test-model")
    }

    fn conversation() -> Conversation {
        Conversation::new("system prompt")
    }

    #[tokio::test]
    async fn output_ends_the_turn() {
        let provider = ScriptedProvider::ok(&[r#"{"type":"output","output":"Hello!"}"#]);
        let agent = agent(provider.clone(), Arc::new(InMemoryStore::new()));
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "hi").await;

        assert_eq!(outcome, TurnOutcome::Reply("Hello!".into()));
        assert_eq!(provider.calls(), 1);
        // system + user + assistant
        assert_eq!(conv.len(), 3);
        assert_eq!(conv.snapshot()[2].role(), Role::Assistant);
    }

    #[tokio::test]
    async fn action_observation_then_output() {
        let provider = ScriptedProvider::ok(&[
            r#"{"type":"plan","plan":"create it"}"#,
            r#"{"type":"action","function":"createTodo","input":"buy milk"}"#,
            r#"{"type":"output","output":"Added."}"#,
        ]);
        let store = Arc::new(InMemoryStore::new());
        let agent = agent(provider.clone(), store.clone());
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "add buy milk").await;

        assert_eq!(outcome, TurnOutcome::Reply("Added.".into()));
        assert_eq!(store.list().await.unwrap()[0].todo, "buy milk");
        // Each call sees the full history so far.
        assert_eq!(*provider.seen.lock().unwrap(), vec![2, 3, 5]);

        let observation = &conv.snapshot()[4];
        assert_eq!(observation.role(), Role::Developer);
        assert_eq!(
            Envelope::parse(observation.content()).unwrap(),
            Envelope::Observation {
                observation: serde_json::json!(1)
            }
        );
    }

    #[tokio::test]
    async fn unknown_tool_touches_nothing() {
        let provider =
            ScriptedProvider::ok(&[r#"{"type":"action","function":"dropTable","input":null}"#]);
        let store = Arc::new(InMemoryStore::new());
        let agent = agent(provider.clone(), store.clone());
        let mut conv = conversation();
        let before = conv.len();

        let outcome = agent.process(&mut conv, "drop everything").await;

        assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.contains("dropTable")));
        assert_eq!(store.calls(), 0);
        // user + action only
        assert_eq!(conv.len(), before + 2);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_is_a_diagnostic_and_next_line_works() {
        let provider = ScriptedProvider::ok(&[
            "not json at all",
            r#"{"type":"output","output":"ok"}"#,
        ]);
        let agent = agent(provider, Arc::new(InMemoryStore::new()));
        let mut conv = conversation();

        let first = agent.process(&mut conv, "hello").await;
        assert_eq!(first, TurnOutcome::Diagnostic("not json at all".into()));
        // Only the user line was kept.
        assert_eq!(conv.len(), 2);

        let second = agent.process(&mut conv, "hello again").await;
        assert_eq!(second, TurnOutcome::Reply("ok".into()));
    }

    #[tokio::test]
    async fn invalid_tool_input_fails_before_store() {
        let provider =
            ScriptedProvider::ok(&[r#"{"type":"action","function":"createTodo","input":42}"#]);
        let store = Arc::new(InMemoryStore::new());
        let agent = agent(provider, store.clone());
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "add 42").await;

        assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.contains("Invalid input")));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_ends_turn_as_failed_action() {
        let provider = ScriptedProvider::ok(&[
            r#"{"type":"action","function":"createTodo","input":"buy milk"}"#,
            r#"{"type":"output","output":"Still here."}"#,
        ]);
        let store = Arc::new(DownStore::default());
        let tools = Arc::new(todobot_tools::todo_registry(store.clone()));
        let agent = AgentLoop::new(provider.clone(), tools, "test-model");
        let mut conv = conversation();
        let before = conv.len();

        let outcome = agent.process(&mut conv, "add buy milk").await;

        assert!(
            matches!(outcome, TurnOutcome::Failed(ref m) if m.contains("createTodo") && m.contains("connection refused")),
            "{outcome:?}"
        );
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        // user + action, no observation
        assert_eq!(conv.len(), before + 2);
        assert!(conv.snapshot().iter().all(|m| m.role() != Role::Developer));

        let next = agent.process(&mut conv, "are you there?").await;
        assert_eq!(next, TurnOutcome::Reply("Still here.".into()));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn model_echoing_observation_is_a_diagnostic() {
        let raw = r#"{"type":"observation","observation":[]}"#;
        let provider = ScriptedProvider::ok(&[raw]);
        let agent = agent(provider, Arc::new(InMemoryStore::new()));
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "hi").await;
        assert_eq!(outcome, TurnOutcome::Diagnostic(raw.into()));
    }

    #[tokio::test]
    async fn step_limit_forces_output() {
        // Always plans, never answers.
        let provider = ScriptedProvider::ok(&[]);
        let agent = agent(provider.clone(), Arc::new(InMemoryStore::new())).with_max_steps(3);
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "loop forever").await;

        assert!(matches!(outcome, TurnOutcome::Reply(ref m) if m.contains("3 steps")));
        assert_eq!(provider.calls(), 3);
        let last = conv.snapshot().last().unwrap();
        assert!(matches!(
            Envelope::parse(last.content()).unwrap(),
            Envelope::Output { .. }
        ));
    }

    #[tokio::test]
    async fn transport_error_becomes_synthetic_output() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::ApiError {
            status_code: 503,
            message: "loading".into(),
        })]);
        let agent = agent(provider, Arc::new(InMemoryStore::new()));
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Reply("The AI service returned an error. Try again later.".into())
        );
        assert_eq!(conv.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let agent = agent(Arc::new(StalledProvider), Arc::new(InMemoryStore::new()))
            .with_request_timeout(Duration::from_secs(5));
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "hi").await;
        assert_eq!(
            outcome,
            TurnOutcome::Reply("AI request failed. Try again later.".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let provider =
            ScriptedProvider::ok(&[r#"{"type":"action","function":"getAllTodos","input":null}"#]);
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StalledTool));
        let agent = AgentLoop::new(provider, Arc::new(registry), "test-model")
            .with_tool_timeout(Duration::from_secs(2));
        let mut conv = conversation();

        let outcome = agent.process(&mut conv, "list").await;
        assert!(matches!(outcome, TurnOutcome::Failed(ref m) if m.contains("timed out")));
    }

    #[test]
    fn max_steps_is_at_least_one() {
        let agent = agent(ScriptedProvider::ok(&[]), Arc::new(InMemoryStore::new()))
            .with_max_steps(0);
        assert_eq!(agent.max_steps(), 1);
    }

    #[test]
    fn render_prefixes() {
        assert_eq!(TurnOutcome::Reply("hi".into()).render(), "AI: hi");
        assert!(TurnOutcome::Failed("x".into()).render().starts_with("Error"));
        assert!(!TurnOutcome::Diagnostic("x".into()).is_reply());
    }
}
