use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::payment::{PaymentHandle, STATUS_COMPLETE};

/// Lookup seam the dispatcher consumes. The payment data model itself is
/// owned elsewhere; this only resolves the opaque callback identifier.
#[async_trait::async_trait]
pub trait PaymentLookup: Send + Sync {
    async fn find_by_callback_identifier(&self, identifier: &str) -> Result<Option<PaymentHandle>>;
}

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

impl PaymentsRepo {
    /// Used by the completion service once the gateway confirms the
    /// purchase. Not part of the lookup seam.
    pub async fn mark_complete(&self, payment_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE payments SET status = $2, updated_at = now() WHERE payment_id = $1")
            .bind(payment_id)
            .bind(STATUS_COMPLETE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PaymentLookup for PaymentsRepo {
    async fn find_by_callback_identifier(&self, identifier: &str) -> Result<Option<PaymentHandle>> {
        let row = sqlx::query(
            r#"
            SELECT payment_id, callback_identifier, status, success_url, failure_url
            FROM payments
            WHERE callback_identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PaymentHandle {
            payment_id: r.get("payment_id"),
            callback_identifier: r.get("callback_identifier"),
            status: r.get("status"),
            success_url: r.get("success_url"),
            failure_url: r.get("failure_url"),
        }))
    }
}
