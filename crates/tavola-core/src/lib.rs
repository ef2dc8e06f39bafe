//! # tavola-core: Pure Settings Logic for Tavola
//!
//! This crate holds the rules shared by every back-office settings screen
//! (charges, customers, employees, absences, payments, market items) as pure
//! data structures with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tavola Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              tavola-settings (SettingsController)               │   │
//! │  │    search ──► select ──► export / import ──► events             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tavola-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ selection │  │  staging  │  │ validation│  │   │
//! │  │   │  Charges  │  │  Ledger   │  │  Export   │  │   rules   │  │   │
//! │  │   │  Employee │  │  search   │  │  Import   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TASKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tavola-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and the [`Entity`] identity contract
//! - [`selection`] - The selection ledger
//! - [`search`] - Search bar state
//! - [`staging`] - Export/import staging buffers
//! - [`validation`] - Field validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tavola_core::selection::SelectionLedger;
//! use tavola_core::staging::export_items;
//! use tavola_core::Charges;
//!
//! let items = vec![
//!     Charges::new(1, "Packing", 2000),
//!     Charges::new(2, "Delivery", 4000),
//!     Charges::new(3, "Service", 1000),
//! ];
//!
//! let mut ledger = SelectionLedger::new();
//! ledger.select_item(1);
//! ledger.select_item(3);
//!
//! let exported = export_items(&items, &ledger);
//! assert_eq!(exported.len(), 2);
//! assert_eq!(exported[1].charges_name, "Service");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod search;
pub mod selection;
pub mod staging;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use search::SearchState;
pub use selection::SelectionLedger;
pub use staging::{ExportBuffer, ImportBuffer};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a search query typed into a settings screen.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// Maximum length of any entity name (charges, customer, employee, item).
pub const MAX_NAME_LEN: usize = 100;

/// Number of digits in a valid phone number.
pub const PHONE_DIGITS: usize = 10;
