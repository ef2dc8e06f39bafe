//! # Selection Ledger
//!
//! Tracks which entity ids the user has marked on a settings screen.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Selection Ledger Operations                          │
//! │                                                                         │
//! │  User Action              Ledger Method           Ledger Change         │
//! │  ───────────              ─────────────           ─────────────         │
//! │                                                                         │
//! │  Tap row ────────────────► select_item(id) ─────► toggle id            │
//! │                                                                         │
//! │  "Select all" ───────────► select_all(ids) ─────► ids of current list  │
//! │                                                                         │
//! │  "Deselect" / back ──────► deselect_all() ──────► {}                   │
//! │                                                                         │
//! │  NOTE: ids are never validated against the backing list. A search     │
//! │        change can leave stale ids behind; consumers skip them.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

/// Set of selected entity ids.
///
/// ## Invariants
/// - No duplicates (set semantics)
/// - Order is irrelevant; iteration is ascending for stable output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionLedger<Id: Ord> {
    ids: BTreeSet<Id>,
}

impl<Id: Ord + Copy> SelectionLedger<Id> {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        SelectionLedger {
            ids: BTreeSet::new(),
        }
    }

    /// Toggles membership of `id`.
    ///
    /// Returns `true` if the id is selected after the call.
    pub fn select_item(&mut self, id: Id) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Replaces the ledger with exactly the given ids.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.ids = ids.into_iter().collect();
    }

    /// Clears the ledger.
    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    /// Returns true if `id` is selected.
    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }

    /// Returns the selected ids as a vector.
    pub fn to_vec(&self) -> Vec<Id> {
        self.ids.iter().copied().collect()
    }
}

impl<Id: Ord + Copy> Default for SelectionLedger<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Ord + Copy> FromIterator<Id> for SelectionLedger<Id> {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        SelectionLedger {
            ids: iter.into_iter().collect(),
        }
    }
}
