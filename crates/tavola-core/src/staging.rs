//! # Export / Import Staging
//!
//! Transient snapshots of entities waiting to be written to a file or merged
//! into the repository. Nothing here is persisted.
//!
//! ## Staging Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Staging Rules                                   │
//! │                                                                         │
//! │  EXPORT                                                                 │
//! │  ──────                                                                 │
//! │  ledger empty  → export = full list                                    │
//! │  ledger {1,3}  → export = rows of full list with id ∈ {1,3}            │
//! │                  (list order kept, stale ids skipped)                   │
//! │                                                                         │
//! │  IMPORT                                                                 │
//! │  ──────                                                                 │
//! │  load(file)    → buffer cleared, then replaced by parsed rows          │
//! │  ledger empty  → merge set = whole buffer                              │
//! │  ledger {1}    → merge set = EVERY buffer row with id 1                │
//! │                  (one-to-many: payments/absences per employee)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::selection::SelectionLedger;
use crate::types::Entity;

/// Rows of `items` that belong to the selection, in list order.
///
/// An empty selection selects everything.
fn filter_selected<E: Entity>(items: &[E], selection: &SelectionLedger<E::Id>) -> Vec<E> {
    if selection.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| selection.contains(&item.entity_id()))
        .cloned()
        .collect()
}

// =============================================================================
// Export
// =============================================================================

/// Computes the export snapshot for the currently loaded list.
///
/// Never mutates the list or the ledger. Selected ids missing from `items`
/// are skipped silently.
pub fn export_items<E: Entity>(items: &[E], selection: &SelectionLedger<E::Id>) -> Vec<E> {
    filter_selected(items, selection)
}

/// An immutable export snapshot.
pub type ExportBuffer<E> = Vec<E>;

// =============================================================================
// Import
// =============================================================================

/// Entities parsed from an external file, waiting for the user to confirm
/// the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBuffer<E> {
    items: Vec<E>,
}

impl<E: Entity> ImportBuffer<E> {
    pub fn new() -> Self {
        ImportBuffer { items: Vec::new() }
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the contents with `parsed`.
    ///
    /// Never appends: the previous contents are dropped even when `parsed`
    /// is empty.
    pub fn replace(&mut self, parsed: Vec<E>) {
        self.clear();
        self.items = parsed;
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows to hand to the repository's bulk import.
    ///
    /// Every row whose id is selected is included, so several rows may be
    /// merged for one selected id.
    pub fn merge_set(&self, selection: &SelectionLedger<E::Id>) -> Vec<E> {
        filter_selected(&self.items, selection)
    }
}

impl<E: Entity> Default for ImportBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> From<Vec<E>> for ImportBuffer<E> {
    fn from(items: Vec<E>) -> Self {
        ImportBuffer { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Charges, Payment};
    use chrono::NaiveDate;

    fn charges() -> Vec<Charges> {
        vec![
            Charges::new(1, "Packing", 2000),
            Charges::new(2, "Delivery", 4000),
            Charges::new(3, "Service", 1000),
        ]
    }

    fn payment(id: i64, employee_id: i64) -> Payment {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Payment::new(id, employee_id, 1000 * id, date)
    }

    #[test]
    fn test_export_without_selection_is_full_list() {
        let items = charges();
        let ledger = SelectionLedger::new();

        assert_eq!(export_items(&items, &ledger), items);
    }

    #[test]
    fn test_export_with_selection_keeps_list_order() {
        let items = charges();
        let ledger: SelectionLedger<i64> = [3, 1].into_iter().collect();

        let exported = export_items(&items, &ledger);
        let ids: Vec<i64> = exported.iter().map(|c| c.charges_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_export_skips_stale_ids_and_leaves_inputs_untouched() {
        let items = charges();
        let ledger: SelectionLedger<i64> = [2, 42].into_iter().collect();

        let exported = export_items(&items, &ledger);
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].charges_id, 2);

        assert_eq!(items.len(), 3);
        assert_eq!(ledger.to_vec(), vec![2, 42]);
    }

    #[test]
    fn test_replace_with_empty_clears_buffer() {
        let mut buffer = ImportBuffer::from(charges());
        buffer.replace(Vec::new());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_merge_set_includes_every_row_of_selected_id() {
        let buffer = ImportBuffer::from(vec![payment(1, 1), payment(2, 2), payment(3, 1)]);
        let ledger: SelectionLedger<i64> = [1].into_iter().collect();

        let merge: Vec<i64> = buffer.merge_set(&ledger).iter().map(|p| p.payment_id).collect();
        assert_eq!(merge, vec![1, 3]);
    }

    #[test]
    fn test_merge_set_without_selection_is_whole_buffer() {
        let buffer = ImportBuffer::from(vec![payment(1, 1), payment(2, 2)]);
        assert_eq!(buffer.merge_set(&SelectionLedger::new()).len(), 2);
    }
}
