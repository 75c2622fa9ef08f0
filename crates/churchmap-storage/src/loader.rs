use crate::store::FeatureStore;
use crate::traits::ChunkSource;
use crate::worker::prepare_batch_blocking;
use chrono::{DateTime, Utc};
use churchmap_core::Feature;
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use serde::Serialize;
use std::time::Instant;

static CHUNK_LOAD_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!("chunk_load_seconds", "Time to fetch and parse one chunk")
        .expect("chunk_load_seconds registers once")
});

static CHUNKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("chunks_total", "Chunk loads by result", &["result"])
        .expect("chunks_total registers once")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
    pub percent: u32,
}

impl LoadProgress {
    pub fn new(loaded: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((loaded as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            loaded,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }

    pub fn message(&self) -> String {
        format!(
            "{} of {} chunks loaded ({}%)",
            self.loaded, self.total, self.percent
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkOutcome {
    pub label: String,
    pub features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub chunks: Vec<ChunkOutcome>,
    pub features: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn failed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.error.is_some()).count()
    }
}

/// Loads every chunk of a source, strictly one after another.
pub struct ChunkLoader;

impl ChunkLoader {
    /// Fetches chunks in order and concatenates their features.
    ///
    /// A failed chunk is logged and contributes nothing; loading carries on.
    /// `on_progress` fires after each chunk resolves. Preparation (ids, city)
    /// runs only once all chunks have resolved.
    pub async fn load<S, F>(source: &S, mut on_progress: F) -> (FeatureStore, LoadReport)
    where
        S: ChunkSource + ?Sized,
        F: FnMut(LoadProgress) + Send,
    {
        let started_at = Utc::now();
        let total = source.chunk_count();
        let mut features: Vec<Feature> = Vec::new();
        let mut chunks = Vec::with_capacity(total);

        for index in 0..total {
            let label = source.label(index);
            let fetch_started = Instant::now();
            let outcome = match source.fetch(index).await {
                Ok(collection) => {
                    let n = collection.features.len();
                    tracing::info!(chunk = %label, features = n, "chunk loaded");
                    CHUNKS_TOTAL.with_label_values(&["ok"]).inc();
                    features.extend(collection.features);
                    ChunkOutcome {
                        label,
                        features: n,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!(chunk = %label, error = %e, "failed to load chunk");
                    CHUNKS_TOTAL.with_label_values(&["error"]).inc();
                    ChunkOutcome {
                        label,
                        features: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            CHUNK_LOAD_SECONDS.observe(fetch_started.elapsed().as_secs_f64());
            chunks.push(outcome);
            on_progress(LoadProgress::new(index + 1, total));
        }

        let prepared = prepare_batch_blocking(features).await;
        let store = FeatureStore::from_features(prepared);
        if store.is_empty() {
            tracing::error!("no features loaded from any chunk");
        } else {
            tracing::info!(features = store.len(), "combined features from all chunks");
        }
        let report = LoadReport {
            chunks,
            features: store.len(),
            started_at,
            finished_at: Utc::now(),
        };
        (store, report)
    }
}
