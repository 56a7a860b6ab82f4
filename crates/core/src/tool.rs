//! Tool trait and registry: the closed set of operations the model may call.
//!
//! Tool names arriving from the model are free text. They are resolved to a
//! [`TodoOperation`] first; only then is a tool looked up. A name that does
//! not resolve never reaches a store.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ToolError;

/// Every operation the assistant can perform on the todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TodoOperation {
    GetAllTodos,
    CreateTodo,
    SearchTodo,
    DeleteTodoById,
}

impl TodoOperation {
    pub const ALL: [TodoOperation; 4] = [
        TodoOperation::GetAllTodos,
        TodoOperation::CreateTodo,
        TodoOperation::SearchTodo,
        TodoOperation::DeleteTodoById,
    ];

    /// The name the model uses in `action.function`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAllTodos => "getAllTodos",
            Self::CreateTodo => "createTodo",
            Self::SearchTodo => "searchTodo",
            Self::DeleteTodoById => "deleteTodoById",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl FromStr for TodoOperation {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

impl std::fmt::Display for TodoOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The core Tool trait. One implementation per [`TodoOperation`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which operation this tool performs.
    fn operation(&self) -> TodoOperation;

    /// Call signature shown to the model, e.g. `createTodo(todo: string): number`.
    fn signature(&self) -> &str;

    /// What the tool does (sent to the model).
    fn description(&self) -> &str;

    /// Run the tool. The returned value becomes the observation.
    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// A registry of available tools keyed by operation.
pub struct ToolRegistry {
    tools: HashMap<TodoOperation, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool for the same operation.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.operation(), tool);
    }

    pub fn get(&self, operation: TodoOperation) -> Option<&dyn Tool> {
        self.tools.get(&operation).map(|t| t.as_ref())
    }

    /// Resolve a model-supplied function name to a registered tool.
    pub fn lookup(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        let operation: TodoOperation = name.parse()?;
        self.get(operation)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Resolve and run a tool call.
    pub async fn execute(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self.lookup(name)?;
        debug!(tool = %name, input = %input, "Executing tool");
        tool.execute(input).await
    }

    /// Registered operations in canonical order.
    pub fn operations(&self) -> Vec<TodoOperation> {
        TodoOperation::ALL
            .into_iter()
            .filter(|op| self.tools.contains_key(op))
            .collect()
    }

    /// Operations with no registered tool.
    pub fn missing(&self) -> Vec<TodoOperation> {
        TodoOperation::ALL
            .into_iter()
            .filter(|op| !self.tools.contains_key(op))
            .collect()
    }

    /// `- signature: description` lines for the system prompt.
    pub fn describe(&self) -> String {
        self.operations()
            .into_iter()
            .filter_map(|op| self.get(op))
            .map(|t| format!("- {}: {}", t.signature(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
