//! SQLite todo backend.
//!
//! A single-file database for running without a PostgreSQL server. The
//! schema mirrors the PostgreSQL one; timestamps are stored as RFC 3339 text.
//! SQLite's `LIKE` and `lower()` fold ASCII only, so search lowercases in Rust.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use todobot_core::error::StoreError;
use todobot_core::store::{TodoItem, TodoStore};
use tracing::{debug, info};

use crate::map_sqlx_error;

/// SQLite todo backend.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn open(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            });

        // Every connection to `:memory:` is a separate database.
        let max_connections = if in_memory { 1 } else { max_connections };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        info!("SQLite todo store initialized at {url}");
        Ok(store)
    }

    /// Create the `todos` table.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                todo       TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("todos table: {e}")))?;

        Ok(())
    }

    fn row_to_item(row: &SqliteRow) -> Result<TodoItem, StoreError> {
        let column = |e: sqlx::Error| StoreError::QueryFailed(format!("Bad todos row: {e}"));
        let created_at: String = row.try_get("created_at").map_err(column)?;
        let updated_at: String = row.try_get("updated_at").map_err(column)?;

        Ok(TodoItem {
            id: row.try_get("id").map_err(column)?,
            todo: row.try_get("todo").map_err(column)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<Utc>, StoreError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("Bad timestamp '{raw}': {e}")))
}

#[async_trait]
impl TodoStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let rows = sqlx::query("SELECT id, todo, created_at, updated_at FROM todos ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list todos", e))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn create(&self, todo: &str) -> Result<i64, StoreError> {
        let now = Utc::now().to_rfc3339();
        let result =
            sqlx::query("INSERT INTO todos (todo, created_at, updated_at) VALUES (?1, ?2, ?3)")
                .bind(todo)
                .bind(&now)
                .bind(&now)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("insert todo", e))?;

        let id = result.last_insert_rowid();
        debug!(id, "Inserted todo");
        Ok(id)
    }

    async fn search(&self, pattern: &str) -> Result<Vec<TodoItem>, StoreError> {
        let needle = pattern.to_lowercase();
        let items = self.list().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.todo.to_lowercase().contains(&needle))
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete todo", e))?;

        let deleted = result.rows_affected() > 0;
        debug!(id, deleted, "Delete todo");
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM todos")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count todos", e))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("count column: {e}")))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::open("sqlite::memory:", 4).await.unwrap()
    }

    #[tokio::test]
    async fn create_then_list() {
        let store = memory_store().await;
        let id = store.create("buy milk").await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].todo, "buy milk");
        assert_eq!(items[0].created_at, items[0].updated_at);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let store = memory_store().await;
        let id = store.create("Buy Milk").await.unwrap();
        store.create("Call the plumber").await.unwrap();

        let lower = store.search("milk").await.unwrap();
        let upper = store.search("MILK").await.unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].id, id);
        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let store = memory_store().await;
        let id = store.create("Äpfel kaufen").await.unwrap();
        store.create("Brot backen").await.unwrap();

        let hits = store.search("äpfel").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
        assert_eq!(store.search("ÄPFEL KAUFEN").await.unwrap(), hits);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let store = memory_store().await;
        store.create("50% off coupon").await.unwrap();
        store.create("500 emails").await.unwrap();

        let hits = store.search("50%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].todo, "50% off coupon");

        let none = store.search("_").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = memory_store().await;
        let id = store.create("temporary").await.unwrap();
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("todos.db").display());

        {
            let store = SqliteStore::open(&url, 2).await.unwrap();
            store.create("survive restart").await.unwrap();
        }

        let store = SqliteStore::open(&url, 2).await.unwrap();
        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].todo, "survive restart");
    }
}
