use std::sync::Arc;

use anyhow::Result;

use crate::domain::payment::{CompletionStatus, PaymentHandle};
use crate::gateways::{GatewayStatus, PaymentGateway};
use crate::repo::payments_repo::PaymentsRepo;

/// Completion seam the dispatcher consumes. Implementations own all payment
/// mutation; calling this on an already-complete payment must be safe.
#[async_trait::async_trait]
pub trait PaymentCompletionService: Send + Sync {
    async fn complete_payment(&self, payment: &PaymentHandle) -> Result<CompletionStatus>;
}

/// Confirms the purchase with the offsite gateway, then records the result
/// on the payment row.
#[derive(Clone)]
pub struct GatewayCompletionService {
    pub payments_repo: PaymentsRepo,
    pub gateway: Arc<dyn PaymentGateway>,
}

#[async_trait::async_trait]
impl PaymentCompletionService for GatewayCompletionService {
    async fn complete_payment(&self, payment: &PaymentHandle) -> Result<CompletionStatus> {
        let result = self.gateway.complete_purchase(payment).await?;
        match result.response.status {
            GatewayStatus::Success => {
                self.payments_repo.mark_complete(payment.payment_id).await?;
                tracing::info!(
                    "payment {} completed via {}",
                    payment.payment_id,
                    result.gateway_used
                );
                Ok(CompletionStatus::Successful)
            }
            GatewayStatus::Failure => {
                tracing::warn!(
                    "gateway declined completion of payment {}: {:?}",
                    payment.payment_id,
                    result.response.error_code
                );
                Ok(CompletionStatus::Failed)
            }
        }
    }
}
