use crate::models::VisitorRecord;
use crate::storage::{StorageError, StorageResult, VisitorStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON document on the local filesystem
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VisitorStore for JsonFileStore {
    async fn load(&self) -> StorageResult<VisitorRecord> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(e.into()),
        };
        Ok(VisitorRecord::from_json(&text)?)
    }

    async fn save(&self, record: &VisitorRecord) -> StorageResult<()> {
        let text = record.to_json()?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(total: u64, visitors: &[&str], ts: &str) -> VisitorRecord {
        VisitorRecord {
            total_visits: total,
            unique_visitors: visitors.iter().map(|v| v.to_string()).collect(),
            last_updated: ts.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("visitor-count.json"));

        assert!(matches!(store.load().await, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("visitor-count.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load().await, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("visitor-count.json"));
        let written = record(7, &["a", "b"], "2024-05-06T07:08:09.010Z");

        store.save(&written).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, written);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("visitor-count.json");
        std::fs::write(&path, "x".repeat(4096)).unwrap();
        let store = JsonFileStore::new(&path);

        store
            .save(&record(1, &[], "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.starts_with('{'));
        assert!(on_disk.ends_with('}'));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("visitor-count.json"));

        let result = store.save(&record(1, &[], "2024-01-01T00:00:00.000Z")).await;
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
