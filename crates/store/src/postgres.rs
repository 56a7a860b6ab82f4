//! PostgreSQL todo backend.
//!
//! Implements [`TodoStore`] with:
//! - CRUD via `sqlx` (PostgreSQL driver)
//! - Case-insensitive substring search using `ILIKE`
//!
//! Run [`PostgresStore::migrate`] (or `migrations/001_create_todos.sql`) to
//! create the `todos` table.
//!
//! # Feature gate
//!
//! This module is behind the `postgres` feature flag.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use todobot_core::error::StoreError;
use todobot_core::store::{TodoItem, TodoStore, escape_like};
use tracing::{debug, info};

use crate::map_sqlx_error;

const SELECT_COLUMNS: &str = "SELECT id, todo, created_at, updated_at FROM todos";

/// PostgreSQL todo backend.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a pool that connects on first use.
    ///
    /// Only the URL is checked here, so an unreachable server surfaces as a
    /// [`StoreError::Unavailable`] from the first tool call, not at startup.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid PostgreSQL URL: {e}")))?;

        info!("PostgreSQL todo store configured");
        Ok(Self { pool })
    }

    /// Run the schema migration.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let migration_sql = include_str!("../migrations/001_create_todos.sql");

        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("todos table: {e}")))?;

        info!("Todo schema migration complete");
        Ok(())
    }
}

/// Convert a database row into a TodoItem.
fn row_to_item(row: &PgRow) -> Result<TodoItem, StoreError> {
    let column = |e: sqlx::Error| StoreError::QueryFailed(format!("Bad todos row: {e}"));
    Ok(TodoItem {
        id: row.try_get("id").map_err(column)?,
        todo: row.try_get("todo").map_err(column)?,
        created_at: row.try_get("created_at").map_err(column)?,
        updated_at: row.try_get("updated_at").map_err(column)?,
    })
}

#[async_trait]
impl TodoStore for PostgresStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list todos", e))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn create(&self, todo: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("INSERT INTO todos (todo) VALUES ($1) RETURNING id")
            .bind(todo)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert todo", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("Missing returned id: {e}")))?;
        debug!(id, "Inserted todo");
        Ok(id)
    }

    async fn search(&self, pattern: &str) -> Result<Vec<TodoItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE todo ILIKE '%' || $1 || '%' ESCAPE '\\' ORDER BY id"
        ))
        .bind(escape_like(pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search todos", e))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
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

// ── Unit tests (no DB required) ──────────────────────────────────────────
