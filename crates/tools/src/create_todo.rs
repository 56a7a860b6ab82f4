//! createTodo: insert one item and return its id.

use std::sync::Arc;

use async_trait::async_trait;
use todobot_core::error::ToolError;
use todobot_core::store::TodoStore;
use todobot_core::tool::{TodoOperation, Tool};
use tracing::info;

pub struct CreateTodoTool {
    store: Arc<dyn TodoStore>,
}

impl CreateTodoTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    fn todo_text(input: &serde_json::Value) -> Result<&str, ToolError> {
        let text = input.as_str().ok_or_else(|| {
            ToolError::invalid_input("createTodo", format!("expected a string, got {input}"))
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ToolError::invalid_input("createTodo", "todo text is empty"));
        }
        Ok(text)
    }
}

#[async_trait]
impl Tool for CreateTodoTool {
    fn operation(&self) -> TodoOperation {
        TodoOperation::CreateTodo
    }

    fn signature(&self) -> &str {
        "createTodo(todo: string): number"
    }

    fn description(&self) -> &str {
        "Creates a new todo from the given text and returns the id of the created todo."
    }

    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let text = Self::todo_text(&input)?;
        let id = self
            .store
            .create(text)
            .await
            .map_err(|e| ToolError::store(self.operation().name(), e))?;
        info!(id, "Created todo");
        Ok(serde_json::json!(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todobot_store::InMemoryStore;

    #[tokio::test]
    async fn returns_new_id() {
        let store = Arc::new(InMemoryStore::new());
        let tool = CreateTodoTool::new(store.clone());

        let out = tool.execute(serde_json::json!("  buy milk ")).await.unwrap();
        let id = out.as_i64().unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].todo, "buy milk");
    }

    #[tokio::test]
    async fn rejects_non_strings_without_writing() {
        let store = Arc::new(InMemoryStore::new());
        let tool = CreateTodoTool::new(store.clone());

        for bad in [
            serde_json::json!(42),
            serde_json::json!(null),
            serde_json::json!({"todo": "x"}),
            serde_json::json!(""),
            serde_json::json!("   "),
        ] {
            let err = tool.execute(bad.clone()).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidInput { ref tool_name, .. } if tool_name == "createTodo"),
                "{bad} gave {err:?}"
            );
        }
        assert_eq!(store.calls(), 0);
    }
}
