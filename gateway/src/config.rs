use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Environment variables that override file-sourced secrets.
pub const SERVICE_ROLE_KEY_ENV: &str = "MESA_SERVICE_ROLE_KEY";
pub const ALERT_BOT_TOKEN_ENV: &str = "MESA_ALERT_BOT_TOKEN";
pub const ALERT_CHAT_ID_ENV: &str = "MESA_ALERT_CHAT_ID";

const DEFAULT_ALERT_API_BASE: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Directory anon key is empty")]
    EmptyAnonKey,

    #[error("Directory service role key is not set (config or {SERVICE_ROLE_KEY_ENV})")]
    EmptyServiceRoleKey,

    #[error("Menu cache capacity cannot be 0")]
    ZeroCacheCapacity,
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// Main listener for incoming API requests
    pub listener: Listener,
    /// Admin listener for health/readiness endpoints
    pub admin_listener: Listener,
    /// Auth/data collaborator
    pub directory: DirectoryConfig,
    /// Push-delivery collaborator
    pub push: PushConfig,
    /// Operator alert channel; optional, degrades gracefully when absent
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub menu_cache: MenuCacheConfig,
}

impl GatewayConfig {
    /// Validates the gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.directory.anon_key.is_empty() {
            return Err(ValidationError::EmptyAnonKey);
        }
        if self.directory.service_role_key.is_empty() {
            return Err(ValidationError::EmptyServiceRoleKey);
        }
        if self.menu_cache.capacity == 0 {
            return Err(ValidationError::ZeroCacheCapacity);
        }

        Ok(())
    }

    /// Replaces file-sourced secrets with their environment counterparts.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(SERVICE_ROLE_KEY_ENV) {
            self.directory.service_role_key = key;
        }
        if let Ok(token) = std::env::var(ALERT_BOT_TOKEN_ENV) {
            self.alerts.bot_token = Some(token);
        }
        if let Ok(chat_id) = std::env::var(ALERT_CHAT_ID_ENV) {
            self.alerts.chat_id = Some(chat_id);
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Auth/data collaborator configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DirectoryConfig {
    /// Public project URL; safe to expose to clients
    pub url: Url,
    /// Client-safe API key sent with session lookups
    pub anon_key: String,
    /// Privileged key for tenant settings and admin listings; server-only,
    /// normally supplied via the environment
    #[serde(default)]
    pub service_role_key: String,
}

/// Push-delivery collaborator configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PushConfig {
    /// Dispatch endpoint of the push collaborator
    pub dispatch_url: Url,
}

/// Operator alert channel configuration (instant-messaging bot)
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    pub api_base: Url,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_ALERT_API_BASE)
                .expect("default alert API base is a valid URL"),
            bot_token: None,
            chat_id: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuCacheConfig {
    /// Maximum cached artifacts across all tenants
    pub capacity: u64,
    /// Artifacts expire on their own after this long; invalidation usually
    /// comes first
    pub ttl_secs: u64,
}

impl Default for MenuCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_secs: 300,
        }
    }
}
