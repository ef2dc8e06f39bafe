//! # SQLite Repository
//!
//! One generic repository serves every [`StoredEntity`].
//!
//! ## Live Query Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Live Query Works                               │
//! │                                                                         │
//! │  query_by_text("pan")                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WatchStream(table revision)  ── yields current revision at once       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... ORDER BY pk                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  keep rows where Entity::matches("pan") ──► emit Vec<E>                │
//! │       ▲                                                                 │
//! │       │                                                                 │
//! │  bulk_import / insert commits ──► revision += 1 ──► query re-runs      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are filtered with [`Entity::matches`](tavola_core::Entity::matches),
//! not `LIKE`, which folds ASCII case only.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::StreamExt;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{EntityRepository, LiveQuery, StoredEntity};

/// Repository for one entity table.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.charges();
///
/// // First emission is the current list
/// let mut live = repo.query_by_text("pack");
/// let rows = live.next().await.unwrap()?;
///
/// // All-or-nothing upsert
/// repo.bulk_import(rows).await?;
/// ```
pub struct SqliteRepository<E> {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SqliteRepository<E> {
    fn clone(&self) -> Self {
        SqliteRepository {
            pool: self.pool.clone(),
            revision: Arc::clone(&self.revision),
            _entity: PhantomData,
        }
    }
}

impl<E: StoredEntity> SqliteRepository<E> {
    /// Creates a repository sharing `revision` with every other handle to the
    /// same table.
    pub fn new(pool: SqlitePool, revision: Arc<watch::Sender<u64>>) -> Self {
        SqliteRepository {
            pool,
            revision,
            _entity: PhantomData,
        }
    }

    /// Wakes every open live query on this table.
    fn notify_changed(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl<E: StoredEntity> EntityRepository<E> for SqliteRepository<E> {
    fn query_by_text(&self, query: &str) -> LiveQuery<E> {
        let pool = self.pool.clone();
        let query = query.trim().to_string();
        let sql = select_sql::<E>();

        WatchStream::new(self.revision.subscribe())
            .then(move |revision| {
                let pool = pool.clone();
                let sql = sql.clone();
                let query = query.clone();

                async move {
                    let mut rows = sqlx::query_as::<_, E>(&sql).fetch_all(&pool).await?;
                    rows.retain(|row| row.matches(&query));

                    debug!(
                        kind = E::KIND,
                        revision,
                        query = %query,
                        count = rows.len(),
                        "Live query emitted"
                    );
                    Ok(rows)
                }
            })
            .boxed()
    }

    async fn bulk_import(&self, items: Vec<E>) -> DbResult<usize> {
        if items.is_empty() {
            debug!(kind = E::KIND, "Nothing to import");
            return Ok(0);
        }

        let sql = upsert_sql::<E>();
        let mut tx = self.pool.begin().await?;

        for item in &items {
            if let Err(e) = item.bind_columns(sqlx::query(&sql)).execute(&mut *tx).await {
                warn!(
                    kind = E::KIND,
                    id = %item.record_id(),
                    error = %e,
                    "Bulk import row failed, rolling back"
                );
                // Dropping `tx` rolls back every row written so far.
                return Err(DbError::TransactionFailed(e.to_string()));
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.notify_changed();
        info!(kind = E::KIND, count = items.len(), "Bulk import committed");
        Ok(items.len())
    }

    async fn insert(&self, item: E) -> DbResult<()> {
        let sql = upsert_sql::<E>();
        item.bind_columns(sqlx::query(&sql))
            .execute(&self.pool)
            .await?;

        self.notify_changed();
        debug!(kind = E::KIND, id = %item.record_id(), "Row inserted");
        Ok(())
    }

    async fn count(&self) -> DbResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as usize)
    }
}

// =============================================================================
// SQL Builders
// =============================================================================

fn select_sql<E: StoredEntity>() -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        E::COLUMNS.join(", "),
        E::TABLE,
        E::ORDER_BY
    )
}

fn upsert_sql<E: StoredEntity>() -> String {
    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use crate::repository::MemoryRepository;
    use tavola_core::{Charges, Customer, Payment};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn first<E: StoredEntity>(repo: &SqliteRepository<E>, query: &str) -> Vec<E> {
        repo.query_by_text(query).next().await.unwrap().unwrap()
    }

    #[test]
    fn test_select_sql_shape() {
        let sql = select_sql::<Charges>();
        assert!(sql.starts_with("SELECT charges_id, charges_name"));
        assert!(sql.ends_with("FROM charges ORDER BY charges_id"));
    }

    #[tokio::test]
    async fn test_bulk_import_then_query() {
        let db = test_db().await;
        let repo = db.charges();

        let written = repo
            .bulk_import(vec![
                Charges::new(1, "Packing", 2000),
                Charges::new(2, "Delivery", 4000),
            ])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let all = first(&repo, "").await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].charges_name, "Packing");

        let filtered = first(&repo, "deliv").await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].charges_id, 2);
    }

    #[tokio::test]
    async fn test_bulk_import_replaces_existing_rows() {
        let db = test_db().await;
        let repo = db.charges();

        repo.insert(Charges::new(1, "Packing", 2000)).await.unwrap();
        repo.bulk_import(vec![Charges::new(1, "Packing", 2500)])
            .await
            .unwrap();

        let all = first(&repo, "").await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].charges_price, 2500);
    }

    #[tokio::test]
    async fn test_bulk_import_is_all_or_nothing() {
        let db = test_db().await;
        let repo = db.charges();

        sqlx::query("CREATE TRIGGER reject_bad BEFORE INSERT ON charges WHEN NEW.charges_id = 2 BEGIN SELECT RAISE(ABORT, 'rejected'); END")
            .execute(db.pool())
            .await
            .unwrap();

        let result = repo
            .bulk_import(vec![
                Charges::new(1, "Packing", 2000),
                Charges::new(2, "Delivery", 4000),
            ])
            .await;

        assert!(matches!(result, Err(DbError::TransactionFailed(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_live_query_reemits_after_write() {
        let db = test_db().await;
        let repo = db.customers();

        let mut live = repo.query_by_text("asha");
        assert!(live.next().await.unwrap().unwrap().is_empty());

        // A second handle to the same table shares the change feed
        db.customers()
            .insert(Customer::new(1, "Asha", "9876543210"))
            .await
            .unwrap();

        let rows = live.next().await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_name, "Asha");
    }

    #[tokio::test]
    async fn test_payments_round_trip_enums_and_dates() {
        let db = test_db().await;
        let repo = db.payments();

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut payment = Payment::new(10, 3, 1500, date);
        payment.payment_note = Some("May advance".to_string());
        repo.insert(payment.clone()).await.unwrap();

        let rows = first(&repo, "2024-05").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payment_type, payment.payment_type);
        assert_eq!(rows[0].payment_date, date);
        assert_eq!(rows[0].payment_note.as_deref(), Some("May advance"));
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case_like_memory() {
        let db = test_db().await;
        let sqlite = db.customers();
        let memory: MemoryRepository<Customer> = MemoryRepository::new();

        let rows = vec![
            Customer::new(1, "Émile Café", "9876543210"),
            Customer::new(2, "Zoë Brandt", "9123456780"),
            Customer::new(3, "Rahul Mehta", "9988776655"),
        ];
        sqlite.bulk_import(rows.clone()).await.unwrap();
        memory.bulk_import(rows).await.unwrap();

        for query in ["émile", "CAFÉ", "zoë", "10%", "mehta"] {
            let from_sqlite: Vec<i64> = first(&sqlite, query).await.iter().map(|c| c.customer_id).collect();
            let from_memory: Vec<i64> = memory
                .query_by_text(query)
                .next()
                .await
                .unwrap()
                .unwrap()
                .iter()
                .map(|c| c.customer_id)
                .collect();
            assert_eq!(from_sqlite, from_memory, "query {query:?}");
        }

        assert_eq!(first(&sqlite, "émile").await.len(), 1);
        assert_eq!(first(&sqlite, "CAFÉ").await[0].customer_id, 1);
    }
}
