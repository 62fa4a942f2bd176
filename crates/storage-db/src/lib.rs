//! # storage-db: Database Layer for the Product Store
//!
//! This crate provides database access for products. It uses SQLite with
//! sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Data Flow                                │
//! │                                                                         │
//! │  Caller (API handler, seed tool)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   storage-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Statements  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs)  │    │ + schema.rs  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │───►│ select/insert│  │   │
//! │  │   │ DbConfig      │    │ MutationPolicy│    │ update/delete│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Products table bootstrap
//! - [`statements`] - SQL statement catalogue
//! - [`error`] - Database error types
//! - [`repository`] - Product repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storage_core::Product;
//! use storage_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env("./storage.db")).await?;
//!
//! let tv = db.products().create(&Product::new("TV", "Smart", 1, 10.0)).await?;
//! assert_eq!(db.products().find_by_id(tv.id).await?, Some(tv));
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod statements;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::{MutationPolicy, ProductRepository};

// Cancellation signal accepted by `ProductRepository::update_with_cancellation`
pub use tokio_util::sync::CancellationToken;
