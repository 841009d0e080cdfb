use anyhow::Result;

use crate::domain::payment::PaymentHandle;
use crate::gateways::{GatewayResult, GatewayStatus, NormalizedGatewayResponse, PaymentGateway};

pub struct MockGateway {
    pub gateway_name: String,
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete_purchase(&self, payment: &PaymentHandle) -> Result<GatewayResult> {
        let response = match self.behavior.as_str() {
            "ALWAYS_FAILURE" => NormalizedGatewayResponse {
                status: GatewayStatus::Failure,
                transaction_ref: None,
                error_code: Some("MOCK_DECLINED".to_string()),
                error_message: Some("mock decline".to_string()),
            },
            _ => NormalizedGatewayResponse {
                status: GatewayStatus::Success,
                transaction_ref: Some(format!("mock_txn_{}", payment.callback_identifier)),
                error_code: None,
                error_message: None,
            },
        };

        Ok(GatewayResult {
            gateway_used: self.gateway_name.clone(),
            response,
        })
    }
}
