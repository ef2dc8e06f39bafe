//! # Settings Controller
//!
//! The per-screen orchestrator: search, selection, export and import over
//! one entity repository.
//!
//! ## Controller Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SettingsController<E, R>                             │
//! │                                                                         │
//! │  search_text_changed("ab")                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SearchState ──changed?──► resubscribe()                               │
//! │                               │  generation += 1                        │
//! │                               │  abort previous task                    │
//! │                               ▼                                         │
//! │                  ┌────────────────────────────┐                        │
//! │                  │ subscription task          │                        │
//! │                  │ repo.query_by_text("ab")   │                        │
//! │                  │ publish only while its     │                        │
//! │                  │ generation is current      │                        │
//! │                  └─────────────┬──────────────┘                        │
//! │                                ▼                                        │
//! │                        ItemsSnapshot (watch)                            │
//! │                                │                                        │
//! │        ┌───────────────────────┼──────────────────────────┐            │
//! │        ▼                       ▼                          ▼            │
//! │  select_all_items()     get_exported_items()     import_items_to_db()  │
//! │  SelectionLedger ─────────────┴──────────────────────────┘            │
//! │                                                                         │
//! │  Outcomes go to the screen through EventChannel<SettingsEvent>.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The controller is owned by one task (the screen). Every mutating
//! operation takes `&mut self`, so selection toggles and buffer
//! replacements are applied strictly in call order. Only the live query
//! runs on a separate task, and it writes nothing but the items snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tavola_core::{staging, validation};
use tavola_core::{Entity, ExportBuffer, ImportBuffer, SearchState, SelectionLedger};
use tavola_db::{Database, EntityRepository, SqliteRepository, StoredEntity};

use crate::config::ControllerConfig;
use crate::events::{EventChannel, EventReceiver, SettingsEvent};
use crate::transfer::{ExportSink, ImportSource};

// =============================================================================
// Published State
// =============================================================================

/// The latest list published by the live query.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsSnapshot<E> {
    /// Query generation that produced `items` (0 before the first result).
    pub generation: u64,

    /// Trimmed query text that produced `items`.
    pub query: String,

    pub items: Vec<E>,
}

impl<E> Default for ItemsSnapshot<E> {
    fn default() -> Self {
        ItemsSnapshot {
            generation: 0,
            query: String::new(),
            items: Vec::new(),
        }
    }
}

/// Result of [`SettingsController::import_items_to_database`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported { count: usize },
    Failed { message: String },
}

/// Result of [`SettingsController::export_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported { count: usize },
    Failed { message: String },
}

// =============================================================================
// Controller
// =============================================================================

/// Selectable collection controller for one settings screen.
///
/// Must be created inside a Tokio runtime: construction starts the live
/// query for the empty search.
///
/// ## Usage
/// ```rust,ignore
/// let mut screen = SettingsController::new(db.charges(), &config);
///
/// screen.search_text_changed("pack");
/// screen.select_all_items();
/// let outcome = screen.export_items(&JsonFile::new("charges.json")).await;
/// ```
pub struct SettingsController<E: Entity, R> {
    repo: Arc<R>,
    config: ControllerConfig,

    search: watch::Sender<SearchState>,
    selection: watch::Sender<SelectionLedger<E::Id>>,
    items: Arc<watch::Sender<ItemsSnapshot<E>>>,
    exported: watch::Sender<ExportBuffer<E>>,
    import_buffer: watch::Sender<ImportBuffer<E>>,
    events: EventChannel<SettingsEvent>,

    /// Generation of the most recently issued query.
    generation: Arc<AtomicU64>,
    subscription: Option<JoinHandle<()>>,
}

impl<E: Entity, R: EntityRepository<E>> SettingsController<E, R> {
    /// Creates a controller over `repo` and starts loading the full list.
    pub fn new(repo: R, config: &ControllerConfig) -> Self {
        Self::with_shared_repository(Arc::new(repo), config)
    }

    /// Creates a controller over a repository shared with other screens.
    pub fn with_shared_repository(repo: Arc<R>, config: &ControllerConfig) -> Self {
        let mut controller = SettingsController {
            repo,
            config: config.clone(),
            search: watch::Sender::new(SearchState::new()),
            selection: watch::Sender::new(SelectionLedger::new()),
            items: Arc::new(watch::Sender::new(ItemsSnapshot::default())),
            exported: watch::Sender::new(Vec::new()),
            import_buffer: watch::Sender::new(ImportBuffer::new()),
            events: EventChannel::with_capacity(
                config.replay_policy(),
                config.events.capacity,
            ),
            generation: Arc::new(AtomicU64::new(0)),
            subscription: None,
        };

        debug!(kind = E::KIND, "Settings controller created");
        controller.resubscribe();
        controller
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Shows the search bar.
    pub fn open_search_bar(&mut self) {
        self.search.send_if_modified(|state| {
            let was_visible = state.bar_visible;
            state.open_bar();
            !was_visible
        });
    }

    /// Hides the search bar.
    ///
    /// Clears the query as well when `search.clear_on_close` is set, which
    /// re-requests the full list.
    pub fn close_search_bar(&mut self) {
        let clear = self.config.clear_search_on_close();
        let mut text_changed = false;

        self.search.send_if_modified(|state| {
            let was_visible = state.bar_visible;
            text_changed = state.close_bar(clear);
            was_visible || text_changed
        });

        if text_changed {
            self.resubscribe();
        }
    }

    /// Updates the query text and re-issues the live query if it changed.
    ///
    /// Text longer than the search limit is rejected with a
    /// `SettingsEvent::Failed`; the previous query stays in effect.
    pub fn search_text_changed(&mut self, text: impl Into<String>) {
        let text = text.into();

        if let Err(e) = validation::validate_search_query(&text) {
            warn!(kind = E::KIND, error = %e, "Search text rejected");
            self.events.send(SettingsEvent::Failed {
                message: e.to_string(),
            });
            return;
        }

        if self.search.send_if_modified(|state| state.set_text(text)) {
            self.resubscribe();
        }
    }

    /// Resets the query text to empty.
    pub fn clear_search_text(&mut self) {
        if self.search.send_if_modified(SearchState::clear_text) {
            self.resubscribe();
        }
    }

    /// Replaces the live query with one for the current search text.
    ///
    /// The previous query task is aborted. A task that is still running
    /// anyway (abort takes effect at its next await) cannot publish: its
    /// generation is no longer current.
    fn resubscribe(&mut self) {
        if let Some(task) = self.subscription.take() {
            task.abort();
        }

        // Bumped while holding the snapshot lock, so no older task can
        // publish after this point.
        let mut generation = 0;
        self.items.send_if_modified(|_| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            false
        });

        let query = self.search.borrow().effective_query().to_string();
        let mut stream = self.repo.query_by_text(&query);
        let items = Arc::clone(&self.items);
        let current = Arc::clone(&self.generation);
        let events = self.events.clone();

        debug!(kind = E::KIND, generation, query = %query, "Live query issued");

        self.subscription = Some(tokio::spawn(async move {
            while let Some(result) = stream.next().await {
                match result {
                    Ok(rows) => {
                        let count = rows.len();
                        let published = items.send_if_modified(|snapshot| {
                            if current.load(Ordering::SeqCst) != generation {
                                return false;
                            }
                            *snapshot = ItemsSnapshot {
                                generation,
                                query: query.clone(),
                                items: rows,
                            };
                            true
                        });

                        if !published {
                            debug!(kind = E::KIND, generation, "Stale live query result dropped");
                            break;
                        }
                        debug!(kind = E::KIND, generation, count, "Items published");
                    }
                    Err(e) => {
                        warn!(kind = E::KIND, generation, error = %e, "Live query failed");
                        events.send(SettingsEvent::Failed {
                            message: e.to_string(),
                        });
                    }
                }
            }
        }));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles `id` in the selection.
    ///
    /// Returns `true` if `id` is now selected. The id is not checked against
    /// the loaded list.
    pub fn select_item(&mut self, id: E::Id) -> bool {
        let mut selected = false;
        self.selection.send_modify(|ledger| selected = ledger.select_item(id));
        debug!(kind = E::KIND, %id, selected, "Selection toggled");
        selected
    }

    /// Selects exactly the ids of the currently loaded list.
    pub fn select_all_items(&mut self) {
        let ids: Vec<E::Id> = self
            .items
            .borrow()
            .items
            .iter()
            .map(Entity::entity_id)
            .collect();

        debug!(kind = E::KIND, count = ids.len(), "Selecting all items");
        self.selection.send_modify(|ledger| ledger.select_all(ids));
    }

    /// Clears the selection.
    pub fn deselect_items(&mut self) {
        self.selection.send_if_modified(|ledger| {
            let had_any = !ledger.is_empty();
            ledger.deselect_all();
            had_any
        });
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Computes and publishes the export buffer.
    ///
    /// The whole loaded list if nothing is selected, otherwise the selected
    /// rows in list order. Selected ids missing from the list are skipped.
    pub fn get_exported_items(&mut self) -> ExportBuffer<E> {
        let buffer = {
            let snapshot = self.items.borrow();
            let selection = self.selection.borrow();
            staging::export_items(&snapshot.items, &selection)
        };

        debug!(kind = E::KIND, count = buffer.len(), "Export buffer computed");
        self.exported.send_replace(buffer.clone());
        buffer
    }

    /// Computes the export buffer and writes it to `sink`.
    pub async fn export_items<S: ExportSink<E>>(&mut self, sink: &S) -> ExportOutcome {
        let buffer = self.get_exported_items();

        match sink.save(&buffer).await {
            Ok(()) => {
                info!(kind = E::KIND, count = buffer.len(), "Items exported");
                self.events.send(SettingsEvent::Exported {
                    kind: E::KIND.to_string(),
                    count: buffer.len(),
                });
                ExportOutcome::Exported {
                    count: buffer.len(),
                }
            }
            Err(e) => {
                let message = self.failure_message(&e.to_string());
                warn!(kind = E::KIND, error = %e, "Export failed");
                self.events.send(SettingsEvent::Failed {
                    message: message.clone(),
                });
                ExportOutcome::Failed { message }
            }
        }
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Replaces the import buffer with `parsed`.
    ///
    /// Observers see the buffer empty first, then the new contents. An empty
    /// `parsed` leaves the buffer empty.
    pub fn on_import_items_from_file(&mut self, parsed: Vec<E>) {
        self.import_buffer.send_modify(ImportBuffer::clear);

        if parsed.is_empty() {
            debug!(kind = E::KIND, "Import file was empty");
            return;
        }

        debug!(kind = E::KIND, count = parsed.len(), "Import buffer loaded");
        self.import_buffer.send_modify(|buffer| buffer.replace(parsed));
    }

    /// Loads the import buffer from `source`.
    ///
    /// A source that cannot be read or parsed counts as an empty file.
    /// Returns the number of buffered entities.
    pub async fn import_from_source<S: ImportSource<E>>(&mut self, source: &S) -> usize {
        let parsed = match source.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!(kind = E::KIND, error = %e, "Import source unreadable, treating as empty");
                Vec::new()
            }
        };

        self.on_import_items_from_file(parsed);
        self.import_buffer.borrow().len()
    }

    /// Merges the import buffer into the repository.
    ///
    /// With a selection, every buffered row whose id is selected is merged
    /// (several rows may share one id); without one, the whole buffer is.
    /// The buffer is kept after a successful merge.
    pub async fn import_items_to_database(&mut self) -> ImportOutcome {
        let merge = {
            let buffer = self.import_buffer.borrow();
            let selection = self.selection.borrow();
            buffer.merge_set(&selection)
        };

        debug!(kind = E::KIND, count = merge.len(), "Merging import buffer");

        match self.repo.bulk_import(merge).await {
            Ok(count) => {
                info!(kind = E::KIND, count, "Items imported");
                self.events.send(SettingsEvent::Imported {
                    kind: E::KIND.to_string(),
                    count,
                });
                ImportOutcome::Imported { count }
            }
            Err(e) => {
                let message = self.failure_message(&e.to_string());
                warn!(kind = E::KIND, error = %e, "Import failed");
                self.events.send(SettingsEvent::Failed {
                    message: message.clone(),
                });
                ImportOutcome::Failed { message }
            }
        }
    }

    fn failure_message(&self, reason: &str) -> String {
        if reason.trim().is_empty() {
            self.config.failure_message().to_string()
        } else {
            reason.to_string()
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn search_state(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    pub fn selection(&self) -> watch::Receiver<SelectionLedger<E::Id>> {
        self.selection.subscribe()
    }

    pub fn items(&self) -> watch::Receiver<ItemsSnapshot<E>> {
        self.items.subscribe()
    }

    pub fn exported_items(&self) -> watch::Receiver<ExportBuffer<E>> {
        self.exported.subscribe()
    }

    pub fn import_buffer(&self) -> watch::Receiver<ImportBuffer<E>> {
        self.import_buffer.subscribe()
    }

    pub fn events(&self) -> EventReceiver<SettingsEvent> {
        self.events.subscribe()
    }

    /// Waits until the list for the latest query has been published.
    ///
    /// Does not return while the live query keeps failing.
    pub async fn settled(&self) -> ItemsSnapshot<E> {
        let target = self.generation.load(Ordering::SeqCst);
        let mut rx = self.items.subscribe();
        let snapshot = match rx.wait_for(|s| s.generation >= target).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.items.borrow().clone(),
        };
        snapshot
    }

    /// Copy of the currently loaded list.
    pub fn current_items(&self) -> Vec<E> {
        self.items.borrow().items.clone()
    }

    /// Currently selected ids, ascending.
    pub fn selected_ids(&self) -> Vec<E::Id> {
        self.selection.borrow().to_vec()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<E: StoredEntity> SettingsController<E, SqliteRepository<E>> {
    /// Creates a controller over the SQLite table for `E`.
    pub fn for_database(db: &Database, config: &ControllerConfig) -> Self {
        Self::new(db.repository::<E>(), config)
    }
}

impl<E: Entity, R> Drop for SettingsController<E, R> {
    fn drop(&mut self) {
        if let Some(task) = self.subscription.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SettingsError, SettingsResult};
    use crate::events::ReplayPolicy;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tavola_core::{Charges, Payment};
    use std::sync::atomic::AtomicBool;
    use tavola_db::{DbConfig, DbResult, LiveQuery, MemoryRepository};
    use tokio::sync::Mutex;

    type Controller<E> = SettingsController<E, MemoryRepository<E>>;

    const WAIT: Duration = Duration::from_secs(2);

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

    async fn settled<E: Entity, R: EntityRepository<E>>(
        controller: &SettingsController<E, R>,
    ) -> ItemsSnapshot<E> {
        tokio::time::timeout(WAIT, controller.settled())
            .await
            .expect("live query did not publish")
    }

    async fn loaded(rows: Vec<Charges>) -> Controller<Charges> {
        let controller = Controller::new(MemoryRepository::with_rows(rows), &ControllerConfig::default());
        settled(&controller).await;
        controller
    }

    struct RecordingSink<E> {
        saved: Mutex<Vec<E>>,
        fail: bool,
    }

    impl<E: Clone + Send + Sync> ExportSink<E> for RecordingSink<E> {
        async fn save(&self, items: &[E]) -> SettingsResult<()> {
            if self.fail {
                return Err(SettingsError::WriteFailed {
                    path: "/readonly/out.json".into(),
                    reason: "permission denied".into(),
                });
            }
            *self.saved.lock().await = items.to_vec();
            Ok(())
        }
    }

    /// Memory-backed repository whose query for `blocked` holds its worker
    /// thread while producing the one result, so aborting the subscription
    /// cannot stop that result from reaching the controller.
    struct BlockingQuery {
        rows: MemoryRepository<Charges>,
        blocked: &'static str,
        started: Arc<AtomicBool>,
    }

    impl EntityRepository<Charges> for BlockingQuery {
        fn query_by_text(&self, query: &str) -> LiveQuery<Charges> {
            if query != self.blocked {
                return self.rows.query_by_text(query);
            }

            let rows = self.rows.clone();
            let started = Arc::clone(&self.started);
            futures_util::stream::once(async move {
                let all = rows.snapshot().await;
                started.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(300));
                Ok(all)
            })
            .boxed()
        }

        async fn bulk_import(&self, items: Vec<Charges>) -> DbResult<usize> {
            self.rows.bulk_import(items).await
        }

        async fn insert(&self, item: Charges) -> DbResult<()> {
            self.rows.insert(item).await
        }

        async fn count(&self) -> DbResult<usize> {
            self.rows.count().await
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let mut controller = loaded(charges()).await;

        assert!(controller.select_item(2));
        assert!(!controller.select_item(2));
        assert!(controller.selected_ids().is_empty());

        controller.select_item(1);
        controller.select_item(3);
        controller.select_item(3);
        assert_eq!(controller.selected_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_select_all_matches_loaded_list() {
        let mut controller = loaded(charges()).await;

        controller.select_item(42);
        controller.select_all_items();
        assert_eq!(controller.selected_ids(), vec![1, 2, 3]);

        // Select-all uses the filtered list
        controller.search_text_changed("pack");
        settled(&controller).await;
        controller.select_all_items();
        assert_eq!(controller.selected_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_deselect_clears_everything() {
        let mut controller = loaded(charges()).await;
        controller.select_all_items();
        controller.select_item(99);

        controller.deselect_items();
        assert!(controller.selection().borrow().is_empty());
    }

    #[tokio::test]
    async fn test_selection_survives_query_change() {
        let mut controller = loaded(charges()).await;
        controller.select_item(3);

        controller.search_text_changed("pack");
        settled(&controller).await;

        assert_eq!(controller.selected_ids(), vec![3]);
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_export_without_selection_is_full_list() {
        let rows = charges();
        let mut controller = loaded(rows.clone()).await;

        assert_eq!(controller.get_exported_items(), rows);
        assert_eq!(*controller.exported_items().borrow(), rows);
    }

    #[tokio::test]
    async fn test_export_with_selection_keeps_list_order() {
        let mut controller = loaded(charges()).await;
        controller.select_item(3);
        controller.select_item(1);
        controller.select_item(77);

        let exported: Vec<i64> = controller
            .get_exported_items()
            .iter()
            .map(|c| c.charges_id)
            .collect();
        assert_eq!(exported, vec![1, 3]);
        assert_eq!(controller.selected_ids(), vec![1, 3, 77]);
        assert_eq!(controller.current_items().len(), 3);
    }

    #[tokio::test]
    async fn test_export_to_sink_reports_count() {
        let mut controller = loaded(charges()).await;
        let mut events = controller.events();
        let sink = RecordingSink {
            saved: Mutex::new(Vec::new()),
            fail: false,
        };

        controller.select_item(2);
        let outcome = controller.export_items(&sink).await;

        assert_eq!(outcome, ExportOutcome::Exported { count: 1 });
        assert_eq!(sink.saved.lock().await.len(), 1);
        assert_eq!(
            events.recv().await,
            Some(SettingsEvent::Exported {
                kind: "Charges".into(),
                count: 1
            })
        );
    }

    #[tokio::test]
    async fn test_export_failure_is_an_event() {
        let mut controller = loaded(charges()).await;
        let mut events = controller.events();
        let sink = RecordingSink {
            saved: Mutex::new(Vec::new()),
            fail: true,
        };

        let outcome = controller.export_items(&sink).await;

        assert!(matches!(outcome, ExportOutcome::Failed { ref message } if message.contains("permission denied")));
        assert!(events.recv().await.unwrap().is_failure());
    }

    // -------------------------------------------------------------------------
    // Import
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_import_clears_buffer() {
        let mut controller = loaded(Vec::new()).await;
        controller.on_import_items_from_file(charges());
        assert_eq!(controller.import_buffer().borrow().len(), 3);

        controller.on_import_items_from_file(Vec::new());
        assert!(controller.import_buffer().borrow().is_empty());
    }

    #[tokio::test]
    async fn test_import_replaces_buffer_and_notifies_observers() {
        let mut controller = loaded(Vec::new()).await;
        controller.on_import_items_from_file(charges());

        let mut rx = controller.import_buffer();
        rx.borrow_and_update();

        controller.on_import_items_from_file(vec![Charges::new(9, "Tips", 500)]);
        assert!(rx.has_changed().unwrap());

        let ids: Vec<i64> = rx.borrow_and_update().items().iter().map(|c| c.charges_id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[tokio::test]
    async fn test_import_with_selection_merges_every_matching_row() {
        let repo = MemoryRepository::new();
        let mut controller: Controller<Payment> =
            SettingsController::new(repo.clone(), &ControllerConfig::default());

        controller.on_import_items_from_file(vec![payment(1, 1), payment(2, 2), payment(3, 1)]);
        controller.select_item(1);

        let outcome = controller.import_items_to_database().await;
        assert_eq!(outcome, ImportOutcome::Imported { count: 2 });

        let stored: Vec<i64> = repo.snapshot().await.iter().map(|p| p.payment_id).collect();
        assert_eq!(stored, vec![1, 3]);

        // Buffer is kept after a successful merge
        assert_eq!(controller.import_buffer().borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_import_without_selection_merges_whole_buffer() {
        let repo = MemoryRepository::new();
        let mut controller: Controller<Charges> =
            SettingsController::new(repo.clone(), &ControllerConfig::default());

        let rows = charges();
        controller.on_import_items_from_file(rows.clone());
        controller.import_items_to_database().await;

        assert_eq!(repo.count().await.unwrap(), 3);

        // The live query picks up the merged rows
        let mut rx = controller.items();
        let snapshot = tokio::time::timeout(WAIT, rx.wait_for(|s| s.items.len() == 3))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(snapshot.items, rows);
    }

    #[tokio::test]
    async fn test_import_failure_reports_and_keeps_screen_usable() {
        let repo = MemoryRepository::new();
        repo.fail_imports(true);
        let mut controller: Controller<Charges> =
            SettingsController::new(repo.clone(), &ControllerConfig::default());
        let mut events = controller.events();

        controller.on_import_items_from_file(charges());
        let outcome = controller.import_items_to_database().await;

        assert!(matches!(outcome, ImportOutcome::Failed { .. }));
        assert!(events.recv().await.unwrap().is_failure());
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.fail_imports(false);
        assert_eq!(
            controller.import_items_to_database().await,
            ImportOutcome::Imported { count: 3 }
        );
    }

    #[tokio::test]
    async fn test_unreadable_source_is_empty_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = loaded(Vec::new()).await;
        controller.on_import_items_from_file(charges());

        let missing = crate::transfer::JsonFile::new(dir.path().join("missing.json"));
        assert_eq!(controller.import_from_source(&missing).await, 0);
        assert!(controller.import_buffer().borrow().is_empty());

        assert_eq!(controller.import_from_source(&charges()).await, 3);
    }

    #[tokio::test]
    async fn test_replayed_event_reaches_late_screen() {
        let mut config = ControllerConfig::default();
        config.events.replay = ReplayPolicy::Latest;

        let mut controller: Controller<Charges> =
            SettingsController::new(MemoryRepository::new(), &config);
        controller.on_import_items_from_file(charges());
        controller.import_items_to_database().await;

        let mut late = controller.events();
        assert!(matches!(
            late.try_recv(),
            Some(SettingsEvent::Imported { count: 3, .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_latest_query_wins_over_slow_one() {
        let repo = MemoryRepository::with_rows(vec![
            Charges::new(1, "Apple", 100),
            Charges::new(2, "Abacus", 200),
            Charges::new(3, "Banana", 300),
        ]);
        repo.delay_query("a", Duration::from_millis(200));

        let mut controller = Controller::new(repo, &ControllerConfig::default());
        settled(&controller).await;

        controller.search_text_changed("a");
        controller.search_text_changed("ab");

        let snapshot = settled(&controller).await;
        assert_eq!(snapshot.query, "ab");
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].charges_name, "Abacus");

        // Give the slow "a" query time to finish; it must not be applied
        tokio::time::sleep(Duration::from_millis(400)).await;
        let after = controller.items().borrow().clone();
        assert_eq!(after, snapshot);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_result_finishing_after_newer_query_is_dropped() {
        let started = Arc::new(AtomicBool::new(false));
        let repo = BlockingQuery {
            rows: MemoryRepository::with_rows(vec![
                Charges::new(1, "Apple", 100),
                Charges::new(2, "Abacus", 200),
                Charges::new(3, "Banana", 300),
            ]),
            blocked: "a",
            started: Arc::clone(&started),
        };

        let mut controller = SettingsController::new(repo, &ControllerConfig::default());
        settled(&controller).await;

        controller.search_text_changed("a");
        tokio::time::timeout(WAIT, async {
            while !started.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("query for \"a\" never started");

        // The "a" task is mid-poll: the abort cannot land before it yields
        controller.search_text_changed("ab");
        let snapshot = settled(&controller).await;
        assert_eq!(snapshot.query, "ab");

        tokio::time::sleep(Duration::from_millis(500)).await;
        let after = controller.items().borrow().clone();
        assert_eq!(after.query, "ab");
        assert_eq!(after.generation, snapshot.generation);
        let names: Vec<String> = after.items.iter().map(|c| c.charges_name.clone()).collect();
        assert_eq!(names, vec!["Abacus"]);
    }

    #[tokio::test]
    async fn test_overlong_search_text_is_rejected() {
        let mut controller = loaded(charges()).await;
        let mut events = controller.events();
        controller.search_text_changed("pack");
        let filtered = settled(&controller).await;

        controller.search_text_changed("x".repeat(tavola_core::MAX_SEARCH_QUERY_LEN + 1));

        assert_eq!(controller.search_state().borrow().query_text, "pack");
        assert!(matches!(
            events.try_recv(),
            Some(SettingsEvent::Failed { ref message }) if message.contains("search query")
        ));
        assert_eq!(settled(&controller).await, filtered);

        // Exactly at the limit is fine
        controller.search_text_changed("y".repeat(tavola_core::MAX_SEARCH_QUERY_LEN));
        assert!(settled(&controller).await.items.is_empty());
    }

    #[tokio::test]
    async fn test_close_keeps_text_by_default() {
        let mut controller = loaded(charges()).await;
        controller.open_search_bar();
        controller.search_text_changed("serv");
        let filtered = settled(&controller).await;

        controller.close_search_bar();
        let state = controller.search_state().borrow().clone();
        assert!(!state.bar_visible);
        assert_eq!(state.query_text, "serv");
        assert_eq!(settled(&controller).await, filtered);
    }

    #[tokio::test]
    async fn test_close_with_clear_reloads_full_list() {
        let mut config = ControllerConfig::default();
        config.search.clear_on_close = true;

        let mut controller =
            Controller::new(MemoryRepository::with_rows(charges()), &config);
        controller.open_search_bar();
        controller.search_text_changed("serv");
        assert_eq!(settled(&controller).await.items.len(), 1);

        controller.close_search_bar();
        assert!(controller.search_state().borrow().query_text.is_empty());
        assert_eq!(settled(&controller).await.items.len(), 3);
    }

    #[tokio::test]
    async fn test_clear_search_text_reloads_full_list() {
        let mut controller = loaded(charges()).await;
        controller.search_text_changed("deliv");
        assert_eq!(settled(&controller).await.items.len(), 1);

        controller.clear_search_text();
        let snapshot = settled(&controller).await;
        assert_eq!(snapshot.query, "");
        assert_eq!(snapshot.items.len(), 3);
    }

    #[tokio::test]
    async fn test_drop_aborts_live_query() {
        let controller = loaded(charges()).await;
        let mut rx = controller.items();
        drop(controller);

        // Every sender is gone once the task is aborted
        let closed = tokio::time::timeout(WAIT, async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    // -------------------------------------------------------------------------
    // SQLite
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sqlite_backed_screen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut screen: SettingsController<Charges, _> =
            SettingsController::for_database(&db, &ControllerConfig::default());

        screen.on_import_items_from_file(charges());
        assert_eq!(
            screen.import_items_to_database().await,
            ImportOutcome::Imported { count: 3 }
        );

        let mut rx = screen.items();
        tokio::time::timeout(WAIT, rx.wait_for(|s| s.items.len() == 3))
            .await
            .unwrap()
            .unwrap();

        screen.search_text_changed("serv");
        let snapshot = settled(&screen).await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].charges_id, 3);
    }
}
