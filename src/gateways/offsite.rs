use anyhow::Result;
use serde_json::json;

use crate::domain::payment::PaymentHandle;
use crate::gateways::{GatewayResult, GatewayStatus, NormalizedGatewayResponse, PaymentGateway};

/// Generic offsite gateway adapter: posts a complete-purchase request to the
/// gateway's confirmation endpoint and normalizes the response. Network and
/// HTTP failures normalize to a failed completion rather than erroring, so
/// the dispatcher's redirect decision stays deterministic.
pub struct OffsiteGateway {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl PaymentGateway for OffsiteGateway {
    fn name(&self) -> &'static str {
        "offsite"
    }

    async fn complete_purchase(&self, payment: &PaymentHandle) -> Result<GatewayResult> {
        let url = format!("{}/v1/purchases/complete", self.base_url);
        let body = json!({
            "reference": payment.callback_identifier,
        });

        let resp = self
            .client
            .post(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;

        let response = match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                NormalizedGatewayResponse {
                    status: GatewayStatus::Success,
                    transaction_ref: v
                        .get("transaction_id")
                        .and_then(|id| id.as_str())
                        .map(ToString::to_string),
                    error_code: None,
                    error_message: None,
                }
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                NormalizedGatewayResponse {
                    status: GatewayStatus::Failure,
                    transaction_ref: None,
                    error_code: Some(format!("HTTP_{}", status.as_u16())),
                    error_message: Some(body.chars().take(200).collect()),
                }
            }
            Err(e) if e.is_timeout() => NormalizedGatewayResponse {
                status: GatewayStatus::Failure,
                transaction_ref: None,
                error_code: Some("TIMEOUT".to_string()),
                error_message: Some("gateway timeout".to_string()),
            },
            Err(e) => NormalizedGatewayResponse {
                status: GatewayStatus::Failure,
                transaction_ref: None,
                error_code: Some("NETWORK_ERROR".to_string()),
                error_message: Some(e.to_string()),
            },
        };

        Ok(GatewayResult {
            gateway_used: "offsite".to_string(),
            response,
        })
    }
}
