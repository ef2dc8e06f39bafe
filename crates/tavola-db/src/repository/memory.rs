//! # In-Memory Repository
//!
//! A [`EntityRepository`] backed by a `Vec`, for tests and demos.
//!
//! Besides the storage contract it can simulate a slow query (to exercise
//! switch-to-latest search) and a failing import (to exercise error
//! reporting).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use tavola_core::Entity;

use crate::error::{DbError, DbResult};
use crate::repository::{EntityRepository, LiveQuery};

struct Inner<E> {
    rows: RwLock<Vec<E>>,
    revision: watch::Sender<u64>,
    fail_imports: AtomicBool,
    query_delays: Mutex<HashMap<String, Duration>>,
}

/// In-memory repository. Clones share the same rows.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MemoryRepository::with_rows(vec![Charges::new(1, "Packing", 2000)]);
/// repo.delay_query("a", Duration::from_millis(200));
/// repo.fail_imports(true);
/// ```
pub struct MemoryRepository<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        MemoryRepository {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Creates a repository pre-filled with `rows`.
    pub fn with_rows(mut rows: Vec<E>) -> Self {
        rows.sort_by_key(|row| row.record_id());
        let (revision, _) = watch::channel(0);

        MemoryRepository {
            inner: Arc::new(Inner {
                rows: RwLock::new(rows),
                revision,
                fail_imports: AtomicBool::new(false),
                query_delays: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Makes every later `bulk_import` fail without writing anything.
    pub fn fail_imports(&self, fail: bool) {
        self.inner.fail_imports.store(fail, Ordering::SeqCst);
    }

    /// Delays every emission of the live query for exactly `query`.
    pub fn delay_query(&self, query: impl Into<String>, delay: Duration) {
        self.inner
            .query_delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(query.into(), delay);
    }

    /// Returns a copy of every stored row, ordered by record id.
    pub async fn snapshot(&self) -> Vec<E> {
        self.inner.rows.read().await.clone()
    }

    fn delay_for(&self, query: &str) -> Option<Duration> {
        self.inner
            .query_delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(query)
            .copied()
    }

    async fn upsert_all(&self, items: Vec<E>) -> usize {
        let count = items.len();
        {
            let mut rows = self.inner.rows.write().await;
            for item in items {
                let id = item.record_id();
                match rows.binary_search_by_key(&id, |row| row.record_id()) {
                    Ok(pos) => rows[pos] = item,
                    Err(pos) => rows.insert(pos, item),
                }
            }
        }
        self.inner.revision.send_modify(|rev| *rev += 1);
        count
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityRepository<E> for MemoryRepository<E> {
    fn query_by_text(&self, query: &str) -> LiveQuery<E> {
        let inner = Arc::clone(&self.inner);
        let delay = self.delay_for(query);
        let query = query.trim().to_string();

        WatchStream::new(self.inner.revision.subscribe())
            .then(move |revision| {
                let inner = Arc::clone(&inner);
                let query = query.clone();

                async move {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }

                    let rows: Vec<E> = inner
                        .rows
                        .read()
                        .await
                        .iter()
                        .filter(|row| row.matches(&query))
                        .cloned()
                        .collect();

                    debug!(kind = E::KIND, revision, query = %query, count = rows.len(), "Memory query emitted");
                    Ok(rows)
                }
            })
            .boxed()
    }

    async fn bulk_import(&self, items: Vec<E>) -> DbResult<usize> {
        if self.inner.fail_imports.load(Ordering::SeqCst) {
            return Err(DbError::TransactionFailed("import rejected".to_string()));
        }
        if items.is_empty() {
            return Ok(0);
        }

        Ok(self.upsert_all(items).await)
    }

    async fn insert(&self, item: E) -> DbResult<()> {
        self.upsert_all(vec![item]).await;
        Ok(())
    }

    async fn count(&self) -> DbResult<usize> {
        Ok(self.inner.rows.read().await.len())
    }
}
