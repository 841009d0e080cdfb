use std::sync::Arc;

use crate::domain::callback::{CallbackOutcome, CallbackResolution, GatewayCallback};
use crate::domain::payment::{CompletionStatus, PaymentHandle};
use crate::repo::dedup_repo::DedupStoreError;
use crate::repo::payments_repo::PaymentLookup;
use crate::service::completion::PaymentCompletionService;
use crate::service::idempotency_gate::{Classification, IdempotencyGate};

/// Infrastructure faults that cannot be expressed as a terminal resolution.
/// The transport layer maps these to a 500; everything the gateway or the
/// user can cause comes back as a [`CallbackResolution`] instead.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Dedup(#[from] DedupStoreError),
    #[error("payment lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
}

#[derive(Clone)]
pub struct CallbackDispatcher {
    pub gate: IdempotencyGate,
    pub payments: Arc<dyn PaymentLookup>,
    pub completion: Arc<dyn PaymentCompletionService>,
    pub base_url: String,
}

impl CallbackDispatcher {
    pub async fn dispatch(
        &self,
        callback: &GatewayCallback,
    ) -> Result<CallbackResolution, DispatchError> {
        let fingerprint = callback.fingerprint();
        match self.gate.observe(&fingerprint).await? {
            Classification::Duplicate => {
                tracing::warn!("duplicated response from payment gateway: {}", fingerprint);
                return Ok(CallbackResolution::DuplicateRejected);
            }
            Classification::FirstSeen => {}
            Classification::LateRetry => {
                tracing::info!("accepted late gateway retry: {}", fingerprint);
            }
        }

        let payment = self
            .payments
            .find_by_callback_identifier(&callback.identifier)
            .await
            .map_err(DispatchError::Lookup)?;
        let Some(payment) = payment else {
            tracing::warn!("callback for unknown payment identifier {}", callback.identifier);
            return Ok(CallbackResolution::PaymentNotFound);
        };

        // A finished transaction is never reprocessed, whatever the gateway
        // says this callback is about.
        if payment.is_complete() {
            return Ok(CallbackResolution::RedirectSuccess {
                url: self.success_url(&payment),
            });
        }

        match callback.outcome() {
            CallbackOutcome::Complete => match self.complete(&payment).await {
                CompletionStatus::Successful => Ok(CallbackResolution::RedirectSuccess {
                    url: self.success_url(&payment),
                }),
                CompletionStatus::Failed => Ok(CallbackResolution::RedirectFailure {
                    url: self.failure_url(&payment),
                }),
            },
            CallbackOutcome::Notify => {
                // Server-to-server failsafe callbacks expect a bare 2xx; the
                // completion result does not change the acknowledgement.
                if self.complete(&payment).await == CompletionStatus::Failed {
                    tracing::warn!(
                        "completion failed on notify callback for payment {}",
                        payment.payment_id
                    );
                }
                Ok(CallbackResolution::Acknowledged)
            }
            CallbackOutcome::Cancel => {
                tracing::info!("gateway cancelled payment {}", payment.payment_id);
                Ok(CallbackResolution::RedirectFailure {
                    url: self.failure_url(&payment),
                })
            }
            CallbackOutcome::Unrecognized => {
                tracing::warn!("invalid payment callback url status {:?}", callback.status);
                Ok(CallbackResolution::InvalidOutcome)
            }
        }
    }

    async fn complete(&self, payment: &PaymentHandle) -> CompletionStatus {
        match self.completion.complete_payment(payment).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(
                    "completion service error for payment {}: {:#}",
                    payment.payment_id,
                    err
                );
                CompletionStatus::Failed
            }
        }
    }

    fn success_url(&self, payment: &PaymentHandle) -> String {
        payment
            .success_url
            .clone()
            .unwrap_or_else(|| self.base_url.clone())
    }

    fn failure_url(&self, payment: &PaymentHandle) -> String {
        payment
            .failure_url
            .clone()
            .unwrap_or_else(|| self.base_url.clone())
    }
}
