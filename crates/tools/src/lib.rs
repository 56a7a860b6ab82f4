//! Todo list tools for todobot.
//!
//! Each tool wraps one [`TodoOperation`] over a shared [`TodoStore`].
//! Input is validated here, before the store sees it.

pub mod create_todo;
pub mod delete_todo;
pub mod get_all_todos;
pub mod search_todo;

use std::sync::Arc;

use todobot_core::error::ToolError;
use todobot_core::store::{TodoItem, TodoStore};
use todobot_core::tool::ToolRegistry;

pub use create_todo::CreateTodoTool;
pub use delete_todo::DeleteTodoByIdTool;
pub use get_all_todos::GetAllTodosTool;
pub use search_todo::SearchTodoTool;

/// Build a registry holding every todo tool, all backed by `store`.
pub fn todo_registry(store: Arc<dyn TodoStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetAllTodosTool::new(store.clone())));
    registry.register(Box::new(CreateTodoTool::new(store.clone())));
    registry.register(Box::new(SearchTodoTool::new(store.clone())));
    registry.register(Box::new(DeleteTodoByIdTool::new(store)));
    registry
}

/// Items as the JSON array the model sees in an observation.
pub(crate) fn items_to_json(
    tool_name: &str,
    items: &[TodoItem],
) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(items).map_err(|e| ToolError::Encoding {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    })
}
