//! searchTodo: case-insensitive substring match.

use std::sync::Arc;

use async_trait::async_trait;
use todobot_core::error::ToolError;
use todobot_core::store::TodoStore;
use todobot_core::tool::{TodoOperation, Tool};

use crate::items_to_json;

pub struct SearchTodoTool {
    store: Arc<dyn TodoStore>,
}

impl SearchTodoTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SearchTodoTool {
    fn operation(&self) -> TodoOperation {
        TodoOperation::SearchTodo
    }

    fn signature(&self) -> &str {
        "searchTodo(search: string): Todo[]"
    }

    fn description(&self) -> &str {
        "Searches for all todos whose text contains the search string, ignoring case."
    }

    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let pattern = input.as_str().ok_or_else(|| {
            ToolError::invalid_input(self.operation().name(), format!("expected a string, got {input}"))
        })?;

        let items = self
            .store
            .search(pattern)
            .await
            .map_err(|e| ToolError::store(self.operation().name(), e))?;
        items_to_json(self.operation().name(), &items)
    }
}
