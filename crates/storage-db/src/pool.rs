//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Process startup (owned by the caller)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env(path) ← Defaults + STORAGE_* overrides             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + ensure schema             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ db.products() hands each caller a repository                   │
//! │       ▼                                                                 │
//! │  ProductRepository ──► pool (injected, never global)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::close().await ← Process shutdown                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers don't block
//! writers and writers don't block readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product::{MutationPolicy, ProductRepository};
use crate::schema;

/// Environment variable names read by [`DbConfig::from_env`].
pub const ENV_DB_PATH: &str = "STORAGE_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "STORAGE_DB_MAX_CONNECTIONS";
pub const ENV_MIN_CONNECTIONS: &str = "STORAGE_DB_MIN_CONNECTIONS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "STORAGE_DB_CONNECT_TIMEOUT_SECS";
pub const ENV_MUTATION_POLICY: &str = "STORAGE_MUTATION_POLICY";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/storage.db")
///     .max_connections(5)
///     .mutation_policy(MutationPolicy::Strict);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps idle
    /// connections open.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Maximum lifetime of a connection. `None` never recycles.
    /// Default: 30 minutes
    pub max_lifetime: Option<Duration>,

    /// Whether to create the products table on connect.
    /// Default: true
    pub create_schema: bool,

    /// What update/delete do when no row matches.
    /// Default: Lenient
    pub mutation_policy: MutationPolicy,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
            create_schema: true,
            mutation_policy: MutationPolicy::default(),
        }
    }

    /// Creates a configuration from defaults plus `STORAGE_*` environment
    /// overrides.
    ///
    /// ## Configuration Priority
    /// 1. Environment variables (highest)
    /// 2. `default_path` and built-in defaults
    pub fn from_env(default_path: impl Into<PathBuf>) -> Self {
        let mut config = DbConfig::new(default_path);
        config.apply_env_overrides();
        config
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to create the schema on connect.
    pub fn create_schema(mut self, create: bool) -> Self {
        self.create_schema = create;
        self
    }

    /// Sets the mutation policy handed to repositories.
    pub fn mutation_policy(mut self, policy: MutationPolicy) -> Self {
        self.mutation_policy = policy;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            // The in-memory database lives as long as its one connection.
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
            create_schema: true,
            mutation_policy: MutationPolicy::default(),
        }
    }

    /// Checks pool sizing before connecting.
    pub fn validate(&self) -> DbResult<()> {
        if self.max_connections == 0 {
            return Err(DbError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(DbError::InvalidConfig(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged
    /// and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid {}", ENV_MAX_CONNECTIONS),
            }
        }

        if let Some(min) = lookup(ENV_MIN_CONNECTIONS) {
            match min.parse::<u32>() {
                Ok(n) => self.min_connections = n,
                Err(_) => warn!(value = %min, "Ignoring invalid {}", ENV_MIN_CONNECTIONS),
            }
        }

        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            match secs.parse::<u64>() {
                Ok(s) => self.connect_timeout = Duration::from_secs(s),
                Err(_) => warn!(value = %secs, "Ignoring invalid {}", ENV_CONNECT_TIMEOUT_SECS),
            }
        }

        if let Some(policy) = lookup(ENV_MUTATION_POLICY) {
            match policy.parse::<MutationPolicy>() {
                Ok(p) => {
                    debug!(policy = %p, "Overriding mutation policy from environment");
                    self.mutation_policy = p;
                }
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_MUTATION_POLICY),
            }
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// The caller that builds a `Database` owns its lifecycle: it opens the pool
/// at startup and calls [`Database::close`] at shutdown. Repositories only
/// ever see the pool they are handed.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Policy passed to every repository this handle creates.
    mutation_policy: MutationPolicy,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Validates the configuration
    /// 2. Creates the database file if it doesn't exist
    /// 3. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys on
    /// 4. Creates the connection pool
    /// 5. Ensures the products table exists (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::Unavailable)` - Could not open the store
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        config.validate()?;

        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path creates file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::Unavailable(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            mutation_policy: config.mutation_policy,
        };

        if config.create_schema {
            schema::ensure_schema(&db.pool).await?;
        }

        Ok(db)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let tv = db.products().find_by_name("TV").await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone()).with_policy(self.mutation_policy)
    }

    /// Closes the database connection pool.
    ///
    /// ## Note
    /// After calling close, all repository operations fail with
    /// `DbError::Unavailable`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
