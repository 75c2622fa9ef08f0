use churchmap_core::{FeatureCollection, Result};

/// A fixed, ordered sequence of data chunks.
#[async_trait::async_trait]
pub trait ChunkSource: Send + Sync {
    fn chunk_count(&self) -> usize;
    /// Human readable name of chunk `index` (0-based) for logs and reports.
    fn label(&self, index: usize) -> String;
    async fn fetch(&self, index: usize) -> Result<FeatureCollection>;
}
