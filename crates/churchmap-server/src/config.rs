use churchmap_storage::source::{DEFAULT_CHUNKS, DEFAULT_PREFIX};
use churchmap_storage::DirSource;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub chunk_count: usize,
    pub chunk_prefix: String,
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            chunk_count: DEFAULT_CHUNKS,
            chunk_prefix: DEFAULT_PREFIX.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl Config {
    /// Reads `DATA_DIR`, `CHUNK_COUNT`, `CHUNK_PREFIX` and `BIND_ADDR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(dir) = get("DATA_DIR").filter(|s| !s.is_empty()) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(n) = get("CHUNK_COUNT") {
            match n.parse::<usize>() {
                Ok(n) => cfg.chunk_count = n,
                Err(_) => tracing::warn!(value = %n, "ignoring unparsable CHUNK_COUNT"),
            }
        }
        if let Some(p) = get("CHUNK_PREFIX").filter(|s| !s.is_empty()) {
            cfg.chunk_prefix = p;
        }
        if let Some(addr) = get("BIND_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(a) => cfg.bind_addr = a,
                Err(_) => tracing::warn!(value = %addr, "ignoring unparsable BIND_ADDR"),
            }
        }
        cfg
    }

    pub fn source(&self) -> DirSource {
        DirSource::new(self.data_dir.clone())
            .with_prefix(self.chunk_prefix.clone())
            .with_count(self.chunk_count)
    }
}
