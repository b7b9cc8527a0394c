use crate::models::VisitorRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("visitor record not found")]
    NotFound,
    #[error("visitor record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable slot holding the single visitor record
///
/// Implementations make no attempt to serialize a load/save pair across
/// callers: two overlapping read-modify-write cycles may lose an update.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Load and parse the persisted record
    async fn load(&self) -> StorageResult<VisitorRecord>;

    /// Overwrite the persisted record
    async fn save(&self, record: &VisitorRecord) -> StorageResult<()>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}
