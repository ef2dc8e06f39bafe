//! # tavola-settings: Settings Screen Controllers for Tavola
//!
//! Every back-office settings screen (charges, customers, employees,
//! absences, payments, market items) drives one [`SettingsController`]: it
//! filters the list live as the user types, keeps the selection, and moves
//! rows in and out through JSON files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tavola Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Screen (CLI / UI shell)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &mut controller                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ tavola-settings (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐ │   │
//! │  │   │ controller │  │   events   │  │  transfer  │  │ config  │ │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘  └─────────┘ │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌──────────────────┐  ┌───────▼──────────┐                            │
//! │  │   tavola-core    │  │    tavola-db     │                            │
//! │  │ (pure rules)     │  │ (repositories)   │                            │
//! │  └──────────────────┘  └──────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`controller`] - The per-screen controller and its published state
//! - [`events`] - Screen notifications with an explicit replay policy
//! - [`transfer`] - JSON import sources and export sinks
//! - [`config`] - Controller configuration (TOML + environment)
//! - [`error`] - Settings error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tavola_core::Charges;
//! use tavola_settings::{ControllerConfig, JsonFile, SettingsController};
//!
//! let config = ControllerConfig::load_or_default(None);
//! let mut screen = SettingsController::<Charges, _>::for_database(&db, &config);
//!
//! screen.import_from_source(&JsonFile::new("charges.json")).await;
//! screen.select_item(3);
//! screen.import_items_to_database().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod transfer;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::ControllerConfig;
pub use controller::{ExportOutcome, ImportOutcome, ItemsSnapshot, SettingsController};
pub use error::{SettingsError, SettingsResult};
pub use events::{EventChannel, EventReceiver, ReplayPolicy, SettingsEvent};
pub use transfer::{ExportSink, ImportSource, JsonFile};
