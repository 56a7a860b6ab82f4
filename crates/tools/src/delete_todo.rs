//! deleteTodoById: remove one item. Deleting a missing id is not an error.

use std::sync::Arc;

use async_trait::async_trait;
use todobot_core::error::ToolError;
use todobot_core::store::TodoStore;
use todobot_core::tool::{TodoOperation, Tool};
use tracing::{debug, info};

pub struct DeleteTodoByIdTool {
    store: Arc<dyn TodoStore>,
}

impl DeleteTodoByIdTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Accepts `7` or `"7"`.
    fn todo_id(input: &serde_json::Value) -> Result<i64, ToolError> {
        let id = match input {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        id.ok_or_else(|| {
            ToolError::invalid_input("deleteTodoById", format!("expected an integer id, got {input}"))
        })
    }
}

#[async_trait]
impl Tool for DeleteTodoByIdTool {
    fn operation(&self) -> TodoOperation {
        TodoOperation::DeleteTodoById
    }

    fn signature(&self) -> &str {
        "deleteTodoById(id: number): void"
    }

    fn description(&self) -> &str {
        "Deletes the todo with the given id. Deleting an id that does not exist does nothing."
    }

    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let id = Self::todo_id(&input)?;
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| ToolError::store(self.operation().name(), e))?;

        if deleted {
            info!(id, "Deleted todo");
        } else {
            debug!(id, "No todo to delete");
        }
        Ok(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todobot_store::InMemoryStore;

    #[tokio::test]
    async fn deleting_twice_never_fails() {
        let store = Arc::new(InMemoryStore::new());
        let id = store.create("temporary").await.unwrap();
        let tool = DeleteTodoByIdTool::new(store.clone());

        assert_eq!(tool.execute(serde_json::json!(id)).await.unwrap(), serde_json::Value::Null);
        assert_eq!(tool.execute(serde_json::json!(id)).await.unwrap(), serde_json::Value::Null);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn numeric_string_is_accepted() {
        let store = Arc::new(InMemoryStore::new());
        let id = store.create("temporary").await.unwrap();
        let tool = DeleteTodoByIdTool::new(store.clone());

        tool.execute(serde_json::json!(id.to_string())).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_id_is_invalid_input() {
        let store = Arc::new(InMemoryStore::new());
        let tool = DeleteTodoByIdTool::new(store.clone());

        for bad in [
            serde_json::json!("seven"),
            serde_json::json!(1.5),
            serde_json::json!(null),
            serde_json::json!({"id": 1}),
        ] {
            let err = tool.execute(bad.clone()).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidInput { .. }), "{bad} gave {err:?}");
        }
        assert_eq!(store.calls(), 0);
    }
}
