//! In-memory backend: useful for testing and throwaway sessions.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use todobot_core::error::StoreError;
use todobot_core::store::{TodoItem, TodoStore};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    last_id: i64,
    items: Vec<TodoItem>,
}

/// A store that keeps todos in a Vec, ordered by id.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many store operations have been issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TodoStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.record_call();
        Ok(self.state.read().await.items.clone())
    }

    async fn create(&self, todo: &str) -> Result<i64, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let item = TodoItem {
            id: state.last_id,
            todo: todo.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.items.push(item);
        Ok(state.last_id)
    }

    async fn search(&self, pattern: &str) -> Result<Vec<TodoItem>, StoreError> {
        self.record_call();
        let needle = pattern.to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.todo.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.record_call();
        let mut state = self.state.write().await;
        let len_before = state.items.len();
        state.items.retain(|item| item.id != id);
        Ok(state.items.len() < len_before)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.record_call();
        Ok(self.state.read().await.items.len())
    }
}
