//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Result Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lookups                         Mutations                              │
//! │  ───────                         ─────────                              │
//! │  Ok(Some(product)) → found       Ok(product) → applied (or no match     │
//! │  Ok(None)          → no row                    under Lenient policy)    │
//! │  Err(DbError)      → failed      Err(NotFound) → no match, Strict       │
//! │                                  Err(DbError)  → failed                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Statement Lifetime
//! Statements are issued non-persistent: each one is prepared, executed and
//! finalized inside the call that uses it, and the pooled connection goes
//! back to the pool when the call returns, on success or error.

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};
use std::fmt;
use std::str::FromStr;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::statements;
use storage_core::Product;

// =============================================================================
// Mutation Policy
// =============================================================================

/// What `update` and `delete` do when the id matches no row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Report success anyway. Delete stays idempotent and update echoes
    /// its input.
    #[default]
    Lenient,

    /// Return `DbError::NotFound`.
    Strict,
}

impl fmt::Display for MutationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationPolicy::Lenient => write!(f, "lenient"),
            MutationPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for MutationPolicy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(MutationPolicy::Lenient),
            "strict" => Ok(MutationPolicy::Strict),
            other => Err(DbError::InvalidConfig(format!(
                "Unknown mutation policy: '{}'. Valid options: lenient, strict",
                other
            ))),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let tv = repo.create(&Product::new("TV", "Smart", 1, 10.0)).await?;
/// let found = repo.find_by_id(tv.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    policy: MutationPolicy,
}

/// Starts a statement that is finalized once the call completes.
fn statement(sql: &str) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    sqlx::query(sql).persistent(false)
}

/// Binds `name, type, count, price, id` to the update statement.
fn update_statement(product: &Product) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    statement(statements::UPDATE_PRODUCT)
        .bind(product.name.as_str())
        .bind(product.product_type.as_str())
        .bind(product.count)
        .bind(product.price)
        .bind(product.id)
}

impl ProductRepository {
    /// Creates a new ProductRepository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository {
            pool,
            policy: MutationPolicy::default(),
        }
    }

    /// Sets the policy for updates/deletes that match no row.
    pub fn with_policy(mut self, policy: MutationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active mutation policy.
    pub fn policy(&self) -> MutationPolicy {
        self.policy
    }

    /// Inserts a new product.
    ///
    /// The id of `product` is ignored; the store assigns one.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Copy of the input carrying the assigned id
    /// * `Err(DbError)` - Nothing was inserted
    pub async fn create(&self, product: &Product) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let result = statement(statements::INSERT_PRODUCT)
            .bind(product.name.as_str())
            .bind(product.product_type.as_str())
            .bind(product.count)
            .bind(product.price)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Product inserted");

        Ok(product.clone().with_id(id))
    }

    /// Finds a product by exact name.
    ///
    /// Names are not unique. When several rows match, the last one in store
    /// order is returned.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        debug!(name = %name, "Finding product by name");

        let mut products = sqlx::query_as::<_, Product>(statements::GET_BY_NAME)
            .persistent(false)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        if products.len() > 1 {
            debug!(name = %name, matches = products.len(), "Name matched several rows");
        }

        Ok(products.pop())
    }

    /// Finds a product by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        debug!(id, "Finding product by id");

        let product = sqlx::query_as::<_, Product>(statements::GET_BY_ID)
            .persistent(false)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Returns every product in store order.
    ///
    /// If any row fails to decode the whole call fails; rows decoded before
    /// the failure are discarded.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(statements::GET_ALL)
            .persistent(false)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Loaded all products");
        Ok(products)
    }

    /// Streams every product in store order, decoding rows as they arrive.
    ///
    /// A row that fails to decode is yielded as an `Err` item.
    pub fn stream_all(&self) -> BoxStream<'_, DbResult<Product>> {
        sqlx::query_as::<_, Product>(statements::GET_ALL)
            .persistent(false)
            .fetch(&self.pool)
            .map_err(DbError::from)
            .boxed()
    }

    /// Replaces name, type, count and price of the row with `product.id`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The input, unchanged
    /// * `Err(DbError::NotFound)` - No row matched and the policy is Strict
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = product.id, "Updating product");

        let result = update_statement(product).execute(&self.pool).await?;
        self.check_affected(result.rows_affected(), product.id)?;

        Ok(product.clone())
    }

    /// Same as [`update`](Self::update), abandoned when `cancel` fires.
    ///
    /// An already-cancelled token returns `DbError::Cancelled` without
    /// issuing the statement. The update runs in a transaction, so work
    /// abandoned mid-flight is rolled back.
    pub async fn update_with_cancellation(
        &self,
        cancel: &CancellationToken,
        product: &Product,
    ) -> DbResult<Product> {
        if cancel.is_cancelled() {
            debug!(id = product.id, "Update cancelled before execution");
            return Err(DbError::Cancelled);
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                warn!(id = product.id, "Update cancelled while in flight");
                Err(DbError::Cancelled)
            }

            result = self.update_in_transaction(product) => result,
        }
    }

    /// Same as [`update`](Self::update), abandoned once `deadline` passes.
    ///
    /// A deadline already in the past returns `DbError::DeadlineExceeded`
    /// without issuing the statement.
    pub async fn update_with_deadline(
        &self,
        deadline: Instant,
        product: &Product,
    ) -> DbResult<Product> {
        if Instant::now() >= deadline {
            debug!(id = product.id, "Deadline already passed, update skipped");
            return Err(DbError::DeadlineExceeded);
        }

        match tokio::time::timeout_at(deadline, self.update_in_transaction(product)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(id = product.id, "Update exceeded its deadline");
                Err(DbError::DeadlineExceeded)
            }
        }
    }

    async fn update_in_transaction(&self, product: &Product) -> DbResult<Product> {
        debug!(id = product.id, "Updating product in transaction");

        let mut tx = self.pool.begin().await?;
        let result = update_statement(product).execute(&mut *tx).await?;
        self.check_affected(result.rows_affected(), product.id)?;
        tx.commit().await?;

        Ok(product.clone())
    }

    /// Deletes the row with `id`.
    ///
    /// Under the Lenient policy deleting a missing id succeeds.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = statement(statements::DELETE_PRODUCT)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.check_affected(result.rows_affected(), id)
    }

    /// Counts stored products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(statements::COUNT_PRODUCTS)
            .persistent(false)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    fn check_affected(&self, rows_affected: u64, id: i64) -> DbResult<()> {
        if rows_affected > 0 {
            return Ok(());
        }

        match self.policy {
            MutationPolicy::Lenient => {
                debug!(id, "No product matched, nothing changed");
                Ok(())
            }
            MutationPolicy::Strict => {
                warn!(id, "No product matched");
                Err(DbError::not_found("Product", id.to_string()))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::time::Duration;

    async fn setup() -> (Database, ProductRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        (db, repo)
    }

    async fn setup_strict() -> (Database, ProductRepository) {
        let config = DbConfig::in_memory().mutation_policy(MutationPolicy::Strict);
        let db = Database::new(config).await.unwrap();
        let repo = db.products();
        (db, repo)
    }

    fn tv() -> Product {
        Product::new("TV", "Smart", 1, 10.0)
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let (_db, repo) = setup().await;

        let stored = repo.create(&tv()).await.unwrap();

        assert!(stored.is_persisted());
        assert_eq!(stored, tv().with_id(stored.id));
    }

    #[tokio::test]
    async fn test_create_then_find_by_name() {
        let (_db, repo) = setup().await;

        let stored = repo.create(&tv()).await.unwrap();
        let found = repo.find_by_name("TV").await.unwrap();

        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn test_create_ignores_client_id() {
        let (_db, repo) = setup().await;

        let stored = repo.create(&tv().with_id(99)).await.unwrap();

        assert_eq!(stored.id, 1);
        assert_eq!(repo.find_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        let (_db, repo) = setup().await;

        let pc = repo
            .create(&Product::new("PC", "Smart", 1, 30.0))
            .await
            .unwrap();
        let aire = repo
            .create(&Product::new("Aire", "Smart", 1, 20.0))
            .await
            .unwrap();

        assert_ne!(pc.id, aire.id);
        assert_eq!(repo.find_by_id(pc.id).await.unwrap(), Some(pc));
        assert_eq!(repo.find_by_id(aire.id).await.unwrap(), Some(aire));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let (_db, repo) = setup().await;
        repo.create(&tv()).await.unwrap();

        assert_eq!(repo.find_by_id(4242).await.unwrap(), None);
        assert_eq!(repo.find_by_name("Radio").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_name_returns_last_match() {
        let (_db, repo) = setup().await;

        repo.create(&Product::new("Lamp", "Home", 3, 15.0))
            .await
            .unwrap();
        let second = repo
            .create(&Product::new("Lamp", "Office", 7, 25.5))
            .await
            .unwrap();

        assert_eq!(repo.find_by_name("Lamp").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let (_db, repo) = setup().await;
        repo.create(&tv()).await.unwrap();

        assert_eq!(repo.find_by_name("T").await.unwrap(), None);
        assert_eq!(repo.find_by_name("TV ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all_empty() {
        let (_db, repo) = setup().await;

        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_reflects_inserts_and_deletes() {
        let (_db, repo) = setup().await;

        let mut created = Vec::new();
        for (name, count) in [("TV", 1), ("PC", 2), ("HH", 3), ("Aire", 4), ("Radio", 5)] {
            created.push(
                repo.create(&Product::new(name, "Smart", count, 10.0))
                    .await
                    .unwrap(),
            );
        }

        repo.delete(created[1].id).await.unwrap();
        let removed = created.remove(1);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all, created);
        assert!(!all.contains(&removed));
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_stream_all_matches_get_all() {
        let (_db, repo) = setup().await;
        for name in ["TV", "PC", "HH"] {
            repo.create(&Product::new(name, "Smart", 1, 20.0))
                .await
                .unwrap();
        }

        let streamed: Vec<Product> = repo.stream_all().try_collect().await.unwrap();

        assert_eq!(streamed, repo.get_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (_db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        let changed = Product {
            name: "TV 4K".to_string(),
            count: 5,
            price: 499.99,
            ..stored.clone()
        };
        let returned = repo.update(&changed).await.unwrap();

        assert_eq!(returned, changed);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_silent_when_lenient() {
        let (_db, repo) = setup().await;
        repo.create(&tv()).await.unwrap();

        let ghost = Product::new("Ghost", "None", 1, 1.0).with_id(404);
        let returned = repo.update(&ghost).await.unwrap();

        assert_eq!(returned, ghost);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_by_id(404).await.unwrap(), None);
        assert_eq!(repo.find_by_name("Ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_id_fails_when_strict() {
        let (_db, repo) = setup_strict().await;
        repo.create(&tv()).await.unwrap();

        let ghost = Product::new("Ghost", "None", 1, 1.0).with_id(404);
        let err = repo.update(&ghost).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_find_returns_none() {
        let (_db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        repo.delete(stored.id).await.unwrap();

        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_id() {
        let (_db, lenient) = setup().await;
        assert!(lenient.delete(77).await.is_ok());

        let (_db, strict) = setup_strict().await;
        assert!(strict.delete(77).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_with_expired_deadline_does_not_mutate() {
        let (_db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        let changed = Product {
            count: 50,
            ..stored.clone()
        };
        let deadline = Instant::now() - Duration::from_millis(1);
        let err = repo
            .update_with_deadline(deadline, &changed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::DeadlineExceeded));
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_update_with_deadline_in_time() {
        let (_db, repo) = setup().await;
        let stored = repo
            .create(&Product::new("PC", "Smart", 1, 30.0))
            .await
            .unwrap();

        let changed = Product {
            product_type: "Gaming".to_string(),
            ..stored.clone()
        };
        let deadline = Instant::now() + Duration::from_secs(5);
        let returned = repo.update_with_deadline(deadline, &changed).await.unwrap();

        assert_eq!(returned, changed);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_update_with_cancelled_token_does_not_mutate() {
        let (_db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let changed = Product {
            name: "Radio".to_string(),
            ..stored.clone()
        };
        let err = repo
            .update_with_cancellation(&cancel, &changed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Cancelled));
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_update_with_live_token() {
        let (_db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        let cancel = CancellationToken::new();
        let changed = Product {
            price: 12.5,
            ..stored.clone()
        };
        let returned = repo
            .update_with_cancellation(&cancel, &changed)
            .await
            .unwrap();

        assert_eq!(returned, changed);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_cancellable_update_honours_strict_policy() {
        let (_db, repo) = setup_strict().await;

        let ghost = Product::new("Ghost", "None", 1, 1.0).with_id(404);
        let err = repo
            .update_with_cancellation(&CancellationToken::new(), &ghost)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_undecodable_row_fails_reads() {
        let (db, repo) = setup().await;
        repo.create(&tv()).await.unwrap();

        // INTEGER affinity keeps non-numeric text as TEXT.
        let bad_id = sqlx::query(
            "insert into products(name, type, count, price) values ('Broken', 'Smart', 'many', 1.0)",
        )
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid();

        assert!(matches!(
            repo.get_all().await.unwrap_err(),
            DbError::RowDecode(_)
        ));
        assert!(matches!(
            repo.find_by_id(bad_id).await.unwrap_err(),
            DbError::RowDecode(_)
        ));

        let items: Vec<DbResult<Product>> = repo.stream_all().collect().await;
        assert!(items[0].is_ok());
        assert!(items
            .iter()
            .any(|item| matches!(item, Err(DbError::RowDecode(_)))));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let (db, repo) = setup().await;
        db.close().await;

        assert!(repo.create(&tv()).await.unwrap_err().is_unavailable());
        assert!(repo.find_by_id(1).await.unwrap_err().is_unavailable());
        assert!(repo.get_all().await.unwrap_err().is_unavailable());
        assert!(repo.delete(1).await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn test_missing_table_reports_unavailable() {
        let config = DbConfig::in_memory().create_schema(false);
        let db = Database::new(config).await.unwrap();
        let repo = db.products();

        assert!(repo.create(&tv()).await.unwrap_err().is_unavailable());
        assert!(repo.find_by_name("TV").await.unwrap_err().is_unavailable());
        assert!(repo.get_all().await.unwrap_err().is_unavailable());
        assert!(repo.update(&tv().with_id(1)).await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn test_deadline_fires_while_update_waits() {
        let (db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        // The in-memory pool has one connection; holding it stalls the update.
        let held = db.pool().acquire().await.unwrap();

        let changed = Product {
            count: 99,
            ..stored.clone()
        };
        let started = Instant::now();
        let deadline = started + Duration::from_millis(100);
        let err = repo
            .update_with_deadline(deadline, &changed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_secs(2));

        drop(held);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_cancel_fires_while_update_waits() {
        let (db, repo) = setup().await;
        let stored = repo.create(&tv()).await.unwrap();

        let held = db.pool().acquire().await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let changed = Product {
            name: "Radio".to_string(),
            ..stored.clone()
        };
        let started = Instant::now();
        let err = repo
            .update_with_cancellation(&cancel, &changed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));

        drop(held);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let (_db, repo) = setup().await;

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(&Product::new(format!("Item {i}"), "Bulk", i, 1.0))
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 10);
        assert_eq!(repo.count().await.unwrap(), 10);
    }

    #[test]
    fn test_mutation_policy_parsing() {
        assert_eq!("lenient".parse::<MutationPolicy>().unwrap(), MutationPolicy::Lenient);
        assert_eq!(" STRICT ".parse::<MutationPolicy>().unwrap(), MutationPolicy::Strict);
        assert!("sometimes".parse::<MutationPolicy>().is_err());
        assert_eq!(MutationPolicy::Strict.to_string(), "strict");
    }
}
