use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::repo::dedup_repo::{DedupRecord, DedupStore, DedupStoreError, InsertOutcome};

/// Mutex-guarded map implementation of [`DedupStore`] for single-instance
/// deployments and tests. The whole insert-or-detect step runs under one
/// lock acquisition, which gives the same atomicity the Postgres adapter
/// gets from its uniqueness constraint.
#[derive(Clone, Default)]
pub struct InMemoryDedupStore {
    entries: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn insert_if_absent(
        &self,
        fingerprint: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, DedupStoreError> {
        let mut entries = self.entries.lock().await;
        if let Some(last_seen_at) = entries.get(fingerprint) {
            return Ok(InsertOutcome::ConflictExisting(DedupRecord {
                fingerprint: fingerprint.to_string(),
                last_seen_at: *last_seen_at,
            }));
        }
        entries.insert(fingerprint.to_string(), seen_at);
        Ok(InsertOutcome::Inserted)
    }

    async fn touch(&self, fingerprint: &str, seen_at: DateTime<Utc>) -> Result<(), DedupStoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(fingerprint) {
            Some(last_seen_at) => {
                *last_seen_at = seen_at;
                Ok(())
            }
            None => Err(DedupStoreError::Backend(anyhow!(
                "touch on unknown fingerprint {}",
                fingerprint
            ))),
        }
    }
}
