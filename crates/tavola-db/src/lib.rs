//! # tavola-db: Database Layer for Tavola
//!
//! This crate provides storage for the Tavola settings screens.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tavola Data Flow                                 │
//! │                                                                         │
//! │  SettingsController (tavola-settings)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tavola-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐  ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories    │  │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (repository/)   │  │  (embedded)  │  │   │
//! │  │   │               │    │                  │  │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SqliteRepository │  │ 001_settings │  │   │
//! │  │   │ Change feeds  │    │ MemoryRepository │  │ _entities    │  │   │
//! │  │   └───────────────┘    └──────────────────┘  └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (tavola.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and change feeds
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The [`EntityRepository`] contract and its implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//! use tavola_db::{Database, DbConfig, EntityRepository};
//!
//! let db = Database::new(DbConfig::new("path/to/tavola.db")).await?;
//!
//! let mut live = db.charges().query_by_text("pack");
//! while let Some(rows) = live.next().await {
//!     println!("{} charges", rows?.len());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{EntityRepository, LiveQuery, MemoryRepository, SqliteRepository, StoredEntity};
