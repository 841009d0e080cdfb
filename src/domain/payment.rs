use serde::Serialize;
use uuid::Uuid;

/// Read-only projection of a payment row. Ownership of payment state stays
/// with the completion service; the dispatcher only reads existence,
/// completion status and the stored redirect urls.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentHandle {
    pub payment_id: Uuid,
    pub callback_identifier: String,
    pub status: String,
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
}

pub const STATUS_COMPLETE: &str = "COMPLETE";

impl PaymentHandle {
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }
}

/// Outcome of asking the completion service to complete a payment. A failed
/// completion is a business result, not a system error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Successful,
    Failed,
}
