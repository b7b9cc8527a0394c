pub mod file;
pub mod memory;
pub mod trait_def;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use trait_def::{StorageError, StorageResult, VisitorStore};

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

/// Construct the configured backing store
pub fn open_store(config: &StorageConfig) -> Arc<dyn VisitorStore> {
    match config.backend {
        StorageBackend::File => Arc::new(JsonFileStore::new(&config.counter_file)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
