use crate::traits::ChunkSource;
use churchmap_core::{FeatureCollection, MapError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "json_complete_parish_data_1_part";
pub const DEFAULT_CHUNKS: usize = 5;

/// Parses a chunk file.
///
/// Accepts plain GeoJSON or the script form the page loads,
/// `var json_complete_parish_data_1_part1 = { ... };`.
pub fn parse_chunk(text: &str) -> Result<FeatureCollection> {
    let body = text.trim_start_matches('\u{feff}').trim();
    let json = if body.starts_with('{') {
        body
    } else {
        let eq = body
            .find('=')
            .ok_or_else(|| MapError::Invalid("chunk is neither JSON nor an assignment".into()))?;
        body[eq + 1..].trim().trim_end_matches(';').trim_end()
    };
    serde_json::from_str(json).map_err(|e| MapError::Invalid(format!("chunk json: {}", e)))
}

/// Chunks stored as `<dir>/<prefix><n>.js`, numbered from 1.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    prefix: String,
    count: usize,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            count: DEFAULT_CHUNKS,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.join(self.label(index))
    }
}

#[async_trait::async_trait]
impl ChunkSource for DirSource {
    fn chunk_count(&self) -> usize {
        self.count
    }

    fn label(&self, index: usize) -> String {
        format!("{}{}.js", self.prefix, index + 1)
    }

    async fn fetch(&self, index: usize) -> Result<FeatureCollection> {
        let path = self.path(index);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MapError::Chunk {
                index,
                reason: format!("{}: {}", path.display(), e),
            })?;
        parse_chunk(&text).map_err(|e| MapError::Chunk {
            index,
            reason: e.to_string(),
        })
    }
}

/// In-memory chunks; `None` entries fail to load.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    chunks: Vec<Option<FeatureCollection>>,
}

impl MemorySource {
    pub fn new(chunks: Vec<Option<FeatureCollection>>) -> Self {
        Self { chunks }
    }
}

#[async_trait::async_trait]
impl ChunkSource for MemorySource {
    fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn label(&self, index: usize) -> String {
        format!("memory#{}", index + 1)
    }

    async fn fetch(&self, index: usize) -> Result<FeatureCollection> {
        match self.chunks.get(index) {
            Some(Some(c)) => Ok(c.clone()),
            _ => Err(MapError::Chunk {
                index,
                reason: "missing".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE: &str = r#"{"type":"Feature","properties":{"Title":"St. Paul"},"geometry":{"type":"Point","coordinates":[14.5,35.9]}}"#;

    #[test]
    fn parses_script_assignment() {
        let text = format!(
            "var json_complete_parish_data_1_part2 = {{\"type\":\"FeatureCollection\",\"features\":[{}]}};\n",
            FEATURE
        );
        let c = parse_chunk(&text).unwrap();
        assert_eq!(c.features.len(), 1);
        assert_eq!(c.features[0].properties.title.as_deref(), Some("St. Paul"));
    }

    #[test]
    fn parses_plain_geojson() {
        let text = format!("{{\"type\":\"FeatureCollection\",\"name\":\"x\",\"features\":[{}]}}", FEATURE);
        let c = parse_chunk(&text).unwrap();
        assert_eq!(c.name.as_deref(), Some("x"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_chunk("console.log(1)"), Err(MapError::Invalid(_))));
        assert!(matches!(parse_chunk("var x = {"), Err(MapError::Invalid(_))));
    }

    #[test]
    fn dir_source_labels_are_one_based() {
        let s = DirSource::new("data").with_count(3);
        assert_eq!(s.label(0), "json_complete_parish_data_1_part1.js");
        assert_eq!(s.path(2), PathBuf::from("data/json_complete_parish_data_1_part3.js"));
    }
}
