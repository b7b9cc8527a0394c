use crate::models::VisitorRecord;
use crate::storage::{StorageError, StorageResult, VisitorStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process slot holding the serialized record
///
/// The document goes through the same JSON form as [`super::JsonFileStore`],
/// so corrupt contents and field defaults behave identically. The lock is
/// held for a single load or save only.
#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing raw document
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }

    /// Raw document as last written
    pub async fn document(&self) -> Option<String> {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl VisitorStore for MemoryStore {
    async fn load(&self) -> StorageResult<VisitorRecord> {
        let guard = self.document.read().await;
        let text = guard.as_deref().ok_or(StorageError::NotFound)?;
        Ok(VisitorRecord::from_json(text)?)
    }

    async fn save(&self, record: &VisitorRecord) -> StorageResult<()> {
        let text = record.to_json()?;
        *self.document.write().await = Some(text);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
