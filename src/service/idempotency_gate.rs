use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::callback::CallbackFingerprint;
use crate::repo::dedup_repo::{DedupStore, DedupStoreError, InsertOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    FirstSeen,
    Duplicate,
    LateRetry,
}

/// Decides whether an inbound fingerprint is a first-time event, a duplicate
/// delivery, or a legitimate late retry from the gateway.
///
/// The decision rides entirely on the store's atomic insert-or-conflict
/// primitive: of two concurrent observers of one fingerprint, exactly one
/// wins the insert and sees `FirstSeen`; every other caller is forced into
/// the conflict branch and evaluates the retry window against the persisted
/// `last_seen_at`. There is no separate read-then-write step to race.
#[derive(Clone)]
pub struct IdempotencyGate {
    store: Arc<dyn DedupStore>,
    retry_window: Duration,
}

impl IdempotencyGate {
    pub fn new(store: Arc<dyn DedupStore>, retry_window_seconds: i64) -> Self {
        Self {
            store,
            retry_window: Duration::seconds(retry_window_seconds),
        }
    }

    pub async fn observe(
        &self,
        fingerprint: &CallbackFingerprint,
    ) -> Result<Classification, DedupStoreError> {
        let now = Utc::now();
        match self.store.insert_if_absent(fingerprint.as_str(), now).await? {
            InsertOutcome::Inserted => Ok(Classification::FirstSeen),
            InsertOutcome::ConflictExisting(record) => {
                if now - record.last_seen_at <= self.retry_window {
                    // Near-simultaneous delivery: double form submission, or
                    // the gateway's redirect and notify firing together.
                    Ok(Classification::Duplicate)
                } else {
                    // Gateways re-notify minutes later after a transient
                    // failure; accept it and restart the window.
                    self.store.touch(fingerprint.as_str(), now).await?;
                    Ok(Classification::LateRetry)
                }
            }
        }
    }
}
