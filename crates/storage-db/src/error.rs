//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides: retry, report, or shut down                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository operation returns these errors. Nothing in this crate
//! panics or exits the process on a database failure.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Strict mutation policy and the update/delete matched no row
    /// - `fetch_one` returned no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Any other constraint the store rejected (NOT NULL, CHECK, FOREIGN KEY).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store cannot be reached or a statement could not be prepared
    /// against it.
    ///
    /// ## When This Occurs
    /// - Pool closed (after `Database::close`)
    /// - Pool timed out waiting for a free connection
    /// - File permissions issue, disk full, bad connection options
    /// - Statement rejected at prepare time (missing table or column,
    ///   syntax error)
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row did not match the shape `(id, name, type, count, price)`.
    #[error("Failed to decode row: {0}")]
    RowDecode(String),

    /// Caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Caller deadline passed before the operation finished.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Schema bootstrap failed.
    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),

    /// Configuration rejected before connecting.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the store itself is unreachable.
    ///
    /// Callers use this to decide on shutdown; the repository never does.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::Unavailable(_))
    }

    /// True for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound       → DbError::NotFound
/// sqlx::Error::Database          → Analyze message for constraint type
///   or prepare-time rejection    → DbError::Unavailable
/// PoolTimedOut / PoolClosed / Io
///   / Tls / Configuration
///   / WorkerCrashed              → DbError::Unavailable
/// ColumnDecode / Decode
///   / ColumnNotFound / ...       → DbError::RowDecode
/// Other                          → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "NOT NULL constraint failed: <table>.<column>"
                // "CHECK constraint failed: <name>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::duplicate(field, "unknown")
                } else if msg.contains("constraint failed") {
                    DbError::ConstraintViolation(msg.to_string())
                } else if is_prepare_failure(msg) {
                    DbError::Unavailable(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),

            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::WorkerCrashed => DbError::Unavailable(err.to_string()),

            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => DbError::RowDecode(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLite messages raised while compiling a statement, before any row is
/// touched.
const PREPARE_FAILURES: &[&str] = &[
    "no such table",
    "no such column",
    "no such function",
    "syntax error",
    "incomplete input",
];

fn is_prepare_failure(msg: &str) -> bool {
    PREPARE_FAILURES.iter().any(|marker| msg.contains(marker))
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
