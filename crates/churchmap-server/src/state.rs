use crate::metrics::{ACTIVE_SESSIONS, FEATURES_LOADED};
use crate::session::SessionHandle;
use churchmap_core::session::STATUS_NO_DATA;
use churchmap_core::{Bounds, MapError, Profile, Result};
use churchmap_storage::{ChunkLoader, ChunkSource, SharedStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct AppState {
    pub store: SharedStore,
    sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            sessions: Arc::default(),
        }
    }

    pub fn create_session(&self, profile: Profile, viewport: Option<Bounds>) -> Arc<SessionHandle> {
        let id = ulid::Ulid::new().to_string();
        let handle = Arc::new(SessionHandle::new(id.clone(), profile, viewport));
        let mut sessions = self.sessions.write();
        sessions.insert(id, handle.clone());
        ACTIVE_SESSIONS.set(sessions.len() as i64);
        handle
    }

    pub fn session(&self, id: &str) -> Result<Arc<SessionHandle>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or(MapError::SessionNotFound)
    }

    pub fn remove_session(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let handle = sessions.remove(id).ok_or(MapError::SessionNotFound)?;
        handle.cancel_all();
        ACTIVE_SESSIONS.set(sessions.len() as i64);
        Ok(())
    }

    pub fn sessions(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.read().values().cloned().collect()
    }

    /// Loads all chunks into the shared store, then re-renders every open
    /// session against the fresh data.
    pub async fn load_from<S>(&self, source: &S)
    where
        S: ChunkSource + ?Sized,
    {
        let progress_sink = self.store.clone();
        let (store, report) = ChunkLoader::load(source, move |p| {
            tracing::info!(progress = %p.message(), "loading");
            progress_sink.set_progress(p);
        })
        .await;
        FEATURES_LOADED.set(store.len() as i64);
        self.store.finish(store, report);
        for s in self.sessions() {
            s.refresh(&self.store).await;
        }
    }

    /// The page-level status line.
    pub fn status_message(&self) -> String {
        if !self.store.is_loaded() {
            return self.store.loading_message();
        }
        let n = self.store.snapshot().len();
        if n == 0 {
            STATUS_NO_DATA.to_string()
        } else {
            format!("Loaded {} churches.", n)
        }
    }
}
