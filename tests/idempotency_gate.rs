use std::sync::Arc;

use chrono::{Duration, Utc};
use gateway_callbacks::domain::callback::CallbackFingerprint;
use gateway_callbacks::repo::dedup_mem::InMemoryDedupStore;
use gateway_callbacks::repo::dedup_repo::{DedupStore, DedupStoreError, InsertOutcome};
use gateway_callbacks::service::idempotency_gate::{Classification, IdempotencyGate};

const WINDOW_SECONDS: i64 = 60;

fn gate_over(store: Arc<dyn DedupStore>) -> IdempotencyGate {
    IdempotencyGate::new(store, WINDOW_SECONDS)
}

#[tokio::test]
async fn first_observation_is_first_seen_then_duplicate() {
    let gate = gate_over(Arc::new(InMemoryDedupStore::new()));
    let fp = CallbackFingerprint::new("ABC123", "complete");

    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::FirstSeen);
    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::Duplicate);
}

#[tokio::test]
async fn distinct_outcomes_are_independent_events() {
    let gate = gate_over(Arc::new(InMemoryDedupStore::new()));

    let complete = CallbackFingerprint::new("ABC123", "complete");
    let notify = CallbackFingerprint::new("ABC123", "notify");

    assert_eq!(gate.observe(&complete).await.unwrap(), Classification::FirstSeen);
    assert_eq!(gate.observe(&notify).await.unwrap(), Classification::FirstSeen);
}

#[tokio::test]
async fn stale_record_is_accepted_as_late_retry() {
    let store = Arc::new(InMemoryDedupStore::new());
    let gate = gate_over(store.clone());
    let fp = CallbackFingerprint::new("ABC123", "complete");

    let stale = Utc::now() - Duration::seconds(WINDOW_SECONDS + 10);
    let outcome = store.insert_if_absent(fp.as_str(), stale).await.unwrap();
    assert!(matches!(outcome, InsertOutcome::Inserted));

    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::LateRetry);
}

#[tokio::test]
async fn late_retry_restarts_the_window() {
    let store = Arc::new(InMemoryDedupStore::new());
    let gate = gate_over(store.clone());
    let fp = CallbackFingerprint::new("ABC123", "complete");

    let stale = Utc::now() - Duration::seconds(WINDOW_SECONDS * 3);
    store.insert_if_absent(fp.as_str(), stale).await.unwrap();

    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::LateRetry);
    // The retry bumped last_seen_at, so an immediate repeat is a duplicate
    // again, exactly as a fresh first sighting would behave.
    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::Duplicate);
}

#[tokio::test]
async fn record_well_inside_the_window_is_a_duplicate() {
    let store = Arc::new(InMemoryDedupStore::new());
    let gate = gate_over(store.clone());
    let fp = CallbackFingerprint::new("ABC123", "complete");

    let recent = Utc::now() - Duration::seconds(WINDOW_SECONDS / 2);
    store.insert_if_absent(fp.as_str(), recent).await.unwrap();

    assert_eq!(gate.observe(&fp).await.unwrap(), Classification::Duplicate);
}

#[tokio::test]
async fn concurrent_observers_yield_exactly_one_first_seen() {
    let gate = gate_over(Arc::new(InMemoryDedupStore::new()));
    let fp = CallbackFingerprint::new("ABC123", "complete");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let gate = gate.clone();
        let fp = fp.clone();
        handles.push(tokio::spawn(async move { gate.observe(&fp).await.unwrap() }));
    }

    let mut first_seen = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Classification::FirstSeen => first_seen += 1,
            Classification::Duplicate | Classification::LateRetry => {}
        }
    }

    assert_eq!(first_seen, 1);
}

struct FailingStore;

#[async_trait::async_trait]
impl DedupStore for FailingStore {
    async fn insert_if_absent(
        &self,
        _fingerprint: &str,
        _seen_at: chrono::DateTime<Utc>,
    ) -> Result<InsertOutcome, DedupStoreError> {
        Err(DedupStoreError::Backend(anyhow::anyhow!("connection refused")))
    }

    async fn touch(
        &self,
        _fingerprint: &str,
        _seen_at: chrono::DateTime<Utc>,
    ) -> Result<(), DedupStoreError> {
        Err(DedupStoreError::Backend(anyhow::anyhow!("connection refused")))
    }
}

#[tokio::test]
async fn backend_fault_propagates_instead_of_classifying() {
    let gate = gate_over(Arc::new(FailingStore));
    let fp = CallbackFingerprint::new("ABC123", "complete");

    let err = gate.observe(&fp).await.unwrap_err();
    assert!(matches!(err, DedupStoreError::Backend(_)));
}
