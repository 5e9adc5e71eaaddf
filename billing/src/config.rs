use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Environment variable overriding the configured secret key.
pub const SECRET_KEY_ENV: &str = "MESA_BILLING_SECRET_KEY";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("billing secret key is not set (config or {SECRET_KEY_ENV})")]
    MissingSecretKey,
}

/// Billing provider configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BillingConfig {
    /// Base URL of the billing provider's REST API
    pub api_base: Url,
    /// Secret API key; normally supplied via the environment, not the file
    #[serde(default)]
    pub secret_key: String,
}

impl BillingConfig {
    /// Replaces file-sourced secrets with their environment counterparts.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(SECRET_KEY_ENV) {
            self.secret_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secret_key.is_empty() {
            return Err(ValidationError::MissingSecretKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_key_rejected() {
        let config = BillingConfig {
            api_base: Url::parse("https://api.billing.example").unwrap(),
            secret_key: String::new(),
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::MissingSecretKey
        ));
    }

    #[test]
    fn test_parse_with_secret() {
        let config: BillingConfig = serde_json::from_value(serde_json::json!({
            "api_base": "https://api.billing.example",
            "secret_key": "sk_test_123",
        }))
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
