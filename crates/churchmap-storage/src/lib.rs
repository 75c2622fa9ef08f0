pub mod loader;
pub mod shared;
pub mod source;
pub mod store;
pub mod traits;
pub mod worker;

pub use loader::{ChunkLoader, ChunkOutcome, LoadProgress, LoadReport};
pub use shared::{SharedStore, STATUS_LOADING};
pub use source::{parse_chunk, DirSource, MemorySource};
pub use store::FeatureStore;
pub use traits::*;
