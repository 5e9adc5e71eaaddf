use thiserror::Error;

/// Result type alias for billing operations
pub type Result<T, E = BillingError> = std::result::Result<T, E>;

/// Errors that can occur while talking to the billing provider
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("billing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("billing API returned {status} for {endpoint}: {detail}")]
    Api {
        endpoint: String,
        status: u16,
        detail: String,
    },
}

impl BillingError {
    /// Whether the provider answered with "this record does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::Api { status: 404, .. })
    }
}
