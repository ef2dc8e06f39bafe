//! # Repository Module
//!
//! The storage contract every settings screen talks to, plus its two
//! implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Entity Repository                                    │
//! │                                                                         │
//! │  SettingsController<E, R: EntityRepository<E>>                         │
//! │       │                                                                 │
//! │       │  repo.query_by_text("pan")   → live stream of Vec<E>           │
//! │       │  repo.bulk_import(rows)      → all-or-nothing upsert           │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐      ┌──────────────────────┐               │
//! │  │ SqliteRepository<E>  │      │ MemoryRepository<E>  │               │
//! │  │ (sqlite.rs)          │      │ (memory.rs)          │               │
//! │  │ Entity::matches + tx │      │ Vec + RwLock, test   │               │
//! │  │ change feed per table│      │ latency + failures   │               │
//! │  └──────────────────────┘      └──────────────────────┘               │
//! │                                                                         │
//! │  Live queries: every successful write bumps the table's revision;     │
//! │  every open query stream re-runs and emits the fresh result.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Implementations
//!
//! - [`SqliteRepository`] - Generic SQLite repository over a [`StoredEntity`]
//! - [`MemoryRepository`] - In-process repository for tests and demos

pub mod memory;
pub mod sqlite;
pub mod tables;

use std::future::Future;

use futures_util::stream::BoxStream;
use tavola_core::Entity;

use crate::error::DbResult;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
pub use tables::StoredEntity;

/// A live, restartable result stream.
///
/// Emits the current result immediately, then again after every change to
/// the underlying table, until dropped.
pub type LiveQuery<E> = BoxStream<'static, DbResult<Vec<E>>>;

/// Storage operations a settings screen needs for one entity kind.
pub trait EntityRepository<E: Entity>: Send + Sync + 'static {
    /// Opens a live query for entities matching `query`.
    ///
    /// An empty (or whitespace) query yields every entity. Dropping the
    /// stream cancels the query.
    fn query_by_text(&self, query: &str) -> LiveQuery<E>;

    /// Inserts or updates every row of `items` as one unit.
    ///
    /// Rows are keyed by [`Entity::record_id`]; an existing row with the same
    /// key is replaced. Either every row is written or none is.
    ///
    /// ## Returns
    /// The number of rows written.
    fn bulk_import(&self, items: Vec<E>) -> impl Future<Output = DbResult<usize>> + Send;

    /// Inserts (or replaces) a single row.
    fn insert(&self, item: E) -> impl Future<Output = DbResult<()>> + Send;

    /// Returns the number of stored rows.
    fn count(&self) -> impl Future<Output = DbResult<usize>> + Send;
}
