//! getAllTodos: list every item.

use std::sync::Arc;

use async_trait::async_trait;
use todobot_core::error::ToolError;
use todobot_core::store::TodoStore;
use todobot_core::tool::{TodoOperation, Tool};

use crate::items_to_json;

pub struct GetAllTodosTool {
    store: Arc<dyn TodoStore>,
}

impl GetAllTodosTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetAllTodosTool {
    fn operation(&self) -> TodoOperation {
        TodoOperation::GetAllTodos
    }

    fn signature(&self) -> &str {
        "getAllTodos(): Todo[]"
    }

    fn description(&self) -> &str {
        "Returns every todo in the database, ordered by id. Takes no input."
    }

    async fn execute(&self, _input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let items = self
            .store
            .list()
            .await
            .map_err(|e| ToolError::store(self.operation().name(), e))?;
        items_to_json(self.operation().name(), &items)
    }
}
