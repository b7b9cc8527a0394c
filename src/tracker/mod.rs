//! Visit counting over a [`VisitorStore`]
//!
//! Every public operation is total: storage failures are logged and turned
//! into a fallback [`VisitorStats`] rather than surfaced to the caller.

pub mod fingerprint;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::{now_timestamp, RequestMetadata, VisitorRecord, VisitorStats};
use crate::storage::{StorageError, StorageResult, VisitorStore};

pub use fingerprint::{fingerprint, fingerprint_parts};

#[derive(Debug, Error)]
enum TrackerError {
    #[error("total visit counter is saturated at {0}")]
    CounterOverflow(u64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct VisitorTracker {
    store: Arc<dyn VisitorStore>,
}

impl VisitorTracker {
    pub fn new(store: Arc<dyn VisitorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn VisitorStore> {
        &self.store
    }

    /// Load the persisted record, or a fresh one if it is missing or unreadable
    pub async fn read(&self) -> VisitorRecord {
        match self.store.load().await {
            Ok(record) => record,
            Err(StorageError::NotFound) => {
                debug!("No visitor record at {}, starting fresh", self.store.describe());
                VisitorRecord::fresh()
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable visitor record at {}: {}",
                    self.store.describe(),
                    e
                );
                VisitorRecord::fresh()
            }
        }
    }

    /// Overwrite the persisted record
    pub async fn write(&self, record: &VisitorRecord) -> StorageResult<()> {
        self.store.save(record).await
    }

    pub fn fingerprint(&self, metadata: &RequestMetadata) -> String {
        fingerprint(metadata)
    }

    /// Count one visit, deduplicating the visitor when metadata is supplied
    ///
    /// Returns [`VisitorStats::INCREMENT_FALLBACK`] if the record cannot be
    /// persisted or the total cannot grow any further.
    pub async fn increment_visitor_count(&self, metadata: Option<&RequestMetadata>) -> VisitorStats {
        match self.try_increment(metadata).await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Error updating visitor count: {}", e);
                VisitorStats::INCREMENT_FALLBACK
            }
        }
    }

    async fn try_increment(
        &self,
        metadata: Option<&RequestMetadata>,
    ) -> Result<VisitorStats, TrackerError> {
        let mut record = self.read().await;

        record.total_visits = record
            .total_visits
            .checked_add(1)
            .ok_or(TrackerError::CounterOverflow(record.total_visits))?;
        if let Some(metadata) = metadata {
            record.unique_visitors.insert(self.fingerprint(metadata));
        }
        record.last_updated = now_timestamp();

        self.write(&record).await?;
        Ok(record.stats())
    }

    /// Current counts
    ///
    /// Load failures are absorbed by [`Self::read`], so an unreadable store
    /// reports the fresh record's counts, [`VisitorStats::READ_FALLBACK`].
    pub async fn get_visitor_count(&self) -> VisitorStats {
        self.read().await.stats()
    }
}
