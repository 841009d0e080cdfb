use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentHandle;

pub mod mock;
pub mod offsite;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedGatewayResponse {
    pub status: GatewayStatus,
    pub transaction_ref: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayResult {
    pub gateway_used: String,
    pub response: NormalizedGatewayResponse,
}

/// Offsite gateway seam: confirm a redirected purchase server-to-server.
/// Gateways treat this call as idempotent, so invoking it for a payment the
/// gateway already settled is safe.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete_purchase(&self, payment: &PaymentHandle) -> Result<GatewayResult>;
}
