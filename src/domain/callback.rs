use serde::{Deserialize, Serialize};

/// Dedup key for one (transaction identifier, status) pair. The gateway may
/// deliver the same logical event several times; every delivery of that event
/// hashes to the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackFingerprint(String);

impl CallbackFingerprint {
    pub fn new(identifier: &str, status: &str) -> Self {
        Self(format!("{}-{}", identifier, status))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallbackFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inbound notification from the gateway. `status` is kept raw because
/// the fingerprint is built from the token as delivered, recognized or not.
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub identifier: String,
    pub status: String,
    pub payload: Option<String>,
}

impl GatewayCallback {
    pub fn fingerprint(&self) -> CallbackFingerprint {
        CallbackFingerprint::new(&self.identifier, &self.status)
    }

    pub fn outcome(&self) -> CallbackOutcome {
        match self.status.as_str() {
            "complete" => CallbackOutcome::Complete,
            "notify" => CallbackOutcome::Notify,
            "cancel" => CallbackOutcome::Cancel,
            _ => CallbackOutcome::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Complete,
    Notify,
    Cancel,
    Unrecognized,
}

/// Terminal result of dispatching one callback. The transport layer maps
/// these to status codes and redirects; none of them is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResolution {
    DuplicateRejected,
    PaymentNotFound,
    RedirectSuccess { url: String },
    RedirectFailure { url: String },
    Acknowledged,
    InvalidOutcome,
}

/// Absolute endpoint url for gateways to redirect or send requests to,
/// e.g. embedded as the return/notify target of an outbound purchase request.
pub fn return_url(public_base_url: &str, identifier: &str, status: &str) -> String {
    format!(
        "{}/paymentendpoint/{}/{}",
        public_base_url.trim_end_matches('/'),
        identifier,
        status
    )
}
