use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// One observed callback fingerprint. `last_seen_at` is bumped whenever a
/// later delivery is accepted as a retry.
#[derive(Debug, Clone)]
pub struct DedupRecord {
    pub fingerprint: String,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted,
    ConflictExisting(DedupRecord),
}

#[derive(Debug, thiserror::Error)]
pub enum DedupStoreError {
    /// The store failed for a reason other than the fingerprint uniqueness
    /// rule. Must never be classified as a duplicate or first sighting.
    #[error("dedup store failure: {0}")]
    Backend(#[from] anyhow::Error),
    /// The insert lost the uniqueness race but the winning record could not
    /// be read back.
    #[error("conflicting dedup record for {fingerprint} disappeared during classification")]
    MissingConflict { fingerprint: String },
}

/// Storage seam for the idempotency gate. `insert_if_absent` must be atomic
/// under concurrent callers: of two simultaneous inserts for one fingerprint,
/// exactly one observes `Inserted`.
#[async_trait::async_trait]
pub trait DedupStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        fingerprint: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, DedupStoreError>;

    async fn touch(&self, fingerprint: &str, seen_at: DateTime<Utc>) -> Result<(), DedupStoreError>;
}

#[derive(Clone)]
pub struct DedupRepo {
    pub pool: PgPool,
}

impl DedupRepo {
    /// Retention hook for the inventory sweeper. The gate and dispatcher
    /// never delete records.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM gateway_response_inventory WHERE last_seen_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl DedupStore for DedupRepo {
    async fn insert_if_absent(
        &self,
        fingerprint: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, DedupStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO gateway_response_inventory (fingerprint, first_seen_at, last_seen_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (fingerprint) DO NOTHING
            "#,
        )
        .bind(fingerprint)
        .bind(seen_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DedupStoreError::Backend(e.into()))?;

        if result.rows_affected() == 1 {
            return Ok(InsertOutcome::Inserted);
        }

        let row = sqlx::query(
            "SELECT fingerprint, last_seen_at FROM gateway_response_inventory WHERE fingerprint = $1",
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DedupStoreError::Backend(e.into()))?;

        match row {
            Some(row) => Ok(InsertOutcome::ConflictExisting(DedupRecord {
                fingerprint: row.get("fingerprint"),
                last_seen_at: row.get("last_seen_at"),
            })),
            None => Err(DedupStoreError::MissingConflict {
                fingerprint: fingerprint.to_string(),
            }),
        }
    }

    async fn touch(&self, fingerprint: &str, seen_at: DateTime<Utc>) -> Result<(), DedupStoreError> {
        let result = sqlx::query(
            "UPDATE gateway_response_inventory SET last_seen_at = $2 WHERE fingerprint = $1",
        )
        .bind(fingerprint)
        .bind(seen_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DedupStoreError::Backend(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(DedupStoreError::Backend(anyhow!(
                "touch on unknown fingerprint {}",
                fingerprint
            )));
        }

        Ok(())
    }
}
