//! Todo store trait: the persistence boundary behind the tools.
//!
//! Backends: PostgreSQL (production), SQLite (local), in-memory (tests).
//! The agent never talks to a store directly; only tools do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single row of the `todos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Generated primary key
    pub id: i64,

    /// The todo text
    pub todo: String,

    /// Set by the store on insert
    pub created_at: DateTime<Utc>,

    /// Set by the store on insert and update
    pub updated_at: DateTime<Utc>,
}

/// The core TodoStore trait.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Backend name (e.g., "postgres", "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// All items ordered by id.
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError>;

    /// Insert a new item and return its id.
    async fn create(&self, todo: &str) -> Result<i64, StoreError>;

    /// Items whose text contains `pattern`, ignoring case, ordered by id.
    async fn search(&self, pattern: &str) -> Result<Vec<TodoItem>, StoreError>;

    /// Delete by id. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Total number of items.
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }
}

/// Escape `%`, `_` and `\` so a user pattern matches literally inside
/// `LIKE '%' || ? || '%'`. Pair with `ESCAPE '\'`.
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
