//! # Schema Bootstrap
//!
//! Creates the `products` table when it is missing.
//!
//! ## Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new(config)                                                  │
//! │       │                                                                 │
//! │       ├── create_schema = false → table is someone else's job          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_schema(pool)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CREATE TABLE IF NOT EXISTS products (...)  ← idempotent               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is not a migration system: there is one table and one version of it.
//! Deployments that manage schema externally turn `create_schema` off.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

/// DDL for the products table. Column order matches every read statement.
pub const PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT    NOT NULL,
    type  TEXT    NOT NULL,
    count INTEGER NOT NULL,
    price REAL    NOT NULL
)
"#;

/// Creates the products table if it does not exist yet.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Leaves existing rows untouched
pub async fn ensure_schema(pool: &SqlitePool) -> DbResult<()> {
    info!("Ensuring products table exists");

    sqlx::query(PRODUCTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| DbError::SchemaFailed(e.to_string()))?;

    Ok(())
}

/// Returns whether the products table exists.
///
/// ## Usage
/// For diagnostics and health checks.
pub async fn products_table_exists(pool: &SqlitePool) -> DbResult<bool> {
    let found: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'",
    )
    .fetch_one(pool)
    .await?;

    Ok(found > 0)
}
