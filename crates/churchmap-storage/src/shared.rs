use crate::loader::{LoadProgress, LoadReport};
use crate::store::FeatureStore;
use parking_lot::RwLock;
use std::sync::Arc;

pub const STATUS_LOADING: &str = "Loading church data...";

/// The store as seen by concurrent readers while loading happens in the
/// background. Readers take a cheap `Arc` snapshot; loading swaps it once.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    store: Arc<FeatureStore>,
    progress: Option<LoadProgress>,
    report: Option<LoadReport>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: FeatureStore) -> Self {
        let s = Self::new();
        s.inner.write().store = Arc::new(store);
        s
    }

    pub fn snapshot(&self) -> Arc<FeatureStore> {
        self.inner.read().store.clone()
    }

    pub fn set_progress(&self, p: LoadProgress) {
        self.inner.write().progress = Some(p);
    }

    pub fn progress(&self) -> Option<LoadProgress> {
        self.inner.read().progress
    }

    pub fn finish(&self, store: FeatureStore, report: LoadReport) {
        let mut inner = self.inner.write();
        inner.store = Arc::new(store);
        inner.report = Some(report);
    }

    pub fn report(&self) -> Option<LoadReport> {
        self.inner.read().report.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().report.is_some()
    }

    /// Status text while chunks are still arriving.
    pub fn loading_message(&self) -> String {
        match self.progress() {
            Some(p) => p.message(),
            None => STATUS_LOADING.to_string(),
        }
    }
}
