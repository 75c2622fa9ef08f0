use crate::debounce::Debouncer;
use crate::metrics::{op, FILTER_SECONDS};
use churchmap_core::{
    ApplySummary, Bounds, Feature, FeatureId, FilterField, FilterSession, MapCommand, Profile,
    RecordingMap, Result,
};
use churchmap_storage::SharedStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// The mutable half of a session: filter state plus the mirrored map.
pub struct SessionEntry {
    pub session: FilterSession,
    pub map: RecordingMap,
}

/// One browser page. Each trigger that the page debounces gets its own slot.
pub struct SessionHandle {
    pub id: String,
    entry: Arc<Mutex<SessionEntry>>,
    filter_input: Debouncer,
    map_move: Debouncer,
    list_search: Debouncer,
    popup: Debouncer,
}

impl SessionHandle {
    pub fn new(id: String, profile: Profile, viewport: Option<Bounds>) -> Self {
        let map = match viewport {
            Some(b) => RecordingMap::with_viewport(b),
            None => RecordingMap::new(),
        };
        Self {
            id,
            entry: Arc::new(Mutex::new(SessionEntry {
                session: FilterSession::new(profile),
                map,
            })),
            filter_input: Debouncer::new(),
            map_move: Debouncer::new(),
            list_search: Debouncer::new(),
            popup: Debouncer::new(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.entry.lock().session.profile()
    }

    pub fn with_entry<T>(&self, f: impl FnOnce(&mut SessionEntry) -> T) -> T {
        f(&mut self.entry.lock())
    }

    /// Text typed into a filter input. The value shows at once; filtering
    /// waits for the input debounce window.
    pub fn input_changed(&self, store: &SharedStore, field: FilterField, text: &str) {
        let delay = {
            let mut e = self.entry.lock();
            e.session.set_input(field, text);
            e.session.profile().timings().filter_input
        };
        let entry = self.entry.clone();
        let store = store.clone();
        self.filter_input.schedule(delay, async move {
            filter_pass(&entry, &store, |s, f, m| Some(s.apply(f, m, true))).await;
        });
    }

    /// An autocomplete choice: applied straight away as a manual change.
    pub async fn suggestion_selected(
        &self,
        store: &SharedStore,
        field: FilterField,
        value: &str,
    ) -> Option<ApplySummary> {
        self.filter_input.cancel();
        self.entry.lock().session.set_input(field, value);
        filter_pass(&self.entry, store, |s, f, m| Some(s.apply(f, m, true))).await
    }

    /// The client's map moved. Re-filters after the move window, and only
    /// when no predicate is active.
    pub fn viewport_changed(&self, store: &SharedStore, bounds: Bounds) {
        let delay = {
            let mut e = self.entry.lock();
            e.map.set_viewport(bounds);
            e.session.profile().timings().map_move
        };
        let entry = self.entry.clone();
        let store = store.clone();
        self.map_move.schedule(delay, async move {
            let active = entry.lock().session.is_filter_active();
            if active {
                return;
            }
            filter_pass(&entry, &store, |s, f, m| s.on_viewport_changed(f, m)).await;
        });
    }

    pub fn list_search_changed(&self, query: &str) {
        let delay = self.profile().timings().list_search;
        let entry = self.entry.clone();
        let query = query.to_string();
        self.list_search.schedule(delay, async move {
            entry.lock().session.set_list_search(&query);
            op("list_search");
        });
    }

    pub async fn reset(&self, store: &SharedStore) -> Option<ApplySummary> {
        self.filter_input.cancel();
        self.list_search.cancel();
        self.entry.lock().session.clear_filters();
        filter_pass(&self.entry, store, |s, f, m| Some(s.apply(f, m, false))).await
    }

    /// Runs an immediate, non-manual pass (data load, first render).
    pub async fn refresh(&self, store: &SharedStore) -> Option<ApplySummary> {
        filter_pass(&self.entry, store, |s, f, m| Some(s.apply(f, m, false))).await
    }

    pub fn zoom_to_filter(&self) -> bool {
        let mut e = self.entry.lock();
        let SessionEntry { session, map } = &mut *e;
        session.zoom_to_filtered(map)
    }

    /// Selects a row; the marker popup opens once the map has settled.
    pub fn select(&self, store: &SharedStore, id: FeatureId) -> Result<()> {
        let snapshot = store.snapshot();
        let popup = {
            let mut e = self.entry.lock();
            let SessionEntry { session, map } = &mut *e;
            session.select(snapshot.features(), id, map)?
        };
        let entry = self.entry.clone();
        self.popup.schedule(popup.delay, async move {
            let mut e = entry.lock();
            popup.fire(&mut e.map);
        });
        Ok(())
    }

    pub fn drain_commands(&self) -> Vec<MapCommand> {
        self.entry.lock().map.drain()
    }

    pub fn cancel_all(&self) {
        self.filter_input.cancel();
        self.map_move.cancel();
        self.list_search.cancel();
        self.popup.cancel();
    }
}

/// Shows the filtering status for one processing tick, then runs `op`
/// against the current store snapshot.
///
/// While chunks are still loading the pass is skipped and the session shows
/// load progress instead; inputs set so far are rendered by the refresh that
/// follows the load.
async fn filter_pass<F>(
    entry: &Arc<Mutex<SessionEntry>>,
    store: &SharedStore,
    op_fn: F,
) -> Option<ApplySummary>
where
    F: FnOnce(&mut FilterSession, &[Feature], &mut RecordingMap) -> Option<ApplySummary>,
{
    if !store.is_loaded() {
        entry.lock().session.set_status(store.loading_message());
        tracing::debug!("filter pass deferred until data is loaded");
        return None;
    }
    let (previous, processing) = {
        let mut e = entry.lock();
        let previous = e.session.begin_filtering();
        (previous, e.session.profile().timings().processing)
    };
    tokio::time::sleep(processing).await;

    let snapshot = store.snapshot();
    let started = Instant::now();
    let summary = {
        let mut e = entry.lock();
        let SessionEntry { session, map } = &mut *e;
        let summary = op_fn(session, snapshot.features(), map);
        if summary.is_none() {
            session.restore_status(previous);
        }
        summary
    };
    if let Some(s) = &summary {
        FILTER_SECONDS
            .with_label_values(&[s.mode.as_str()])
            .observe(started.elapsed().as_secs_f64());
        op("filter");
    }
    summary
}
