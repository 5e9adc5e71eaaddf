use crate::config::DirectoryConfig;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("directory API returned {status} for {endpoint}")]
    Api { endpoint: String, status: u16 },
}

/// The authenticated user behind a session token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tenant-facing settings used to render the public menu surface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TenantSettings {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub public_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Capability over the auth/data collaborator.
///
/// Handlers take this trait instead of the REST client so tests can run
/// against in-memory fakes.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolves a bearer token to its user. Absent or invalid tokens resolve
    /// to `None`, not an error.
    async fn user_from_token(&self, token: &str) -> Result<Option<AuthedUser>, DirectoryError>;

    async fn settings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TenantSettings>, DirectoryError>;

    async fn settings_by_slug(&self, slug: &str)
    -> Result<Option<TenantSettings>, DirectoryError>;

    /// Privileged listing of every user account. Service-role only.
    async fn list_users(&self) -> Result<Vec<UserRecord>, DirectoryError>;
}

const SETTINGS_COLUMNS: &str = "app_name,logo_url,primary_color,public_slug";

/// REST client for the auth/data collaborator.
pub struct RestDirectory {
    client: reqwest::Client,
    base: String,
    anon_key: String,
    service_role_key: String,
}

impl RestDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.url.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Settings rows matching one column filter, privileged access.
    async fn settings_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<TenantSettings>, DirectoryError> {
        let endpoint = self.endpoint("/rest/v1/user_settings");
        let response = self
            .client
            .get(&endpoint)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .query(&[
                (column, format!("eq.{value}")),
                ("select", SETTINGS_COLUMNS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Api {
                endpoint,
                status: status.as_u16(),
            });
        }

        let mut rows = response.json::<Vec<TenantSettings>>().await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }
}

#[async_trait]
impl Directory for RestDirectory {
    async fn user_from_token(&self, token: &str) -> Result<Option<AuthedUser>, DirectoryError> {
        let endpoint = self.endpoint("/auth/v1/user");
        let response = self
            .client
            .get(&endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(Some(response.json::<AuthedUser>().await?));
        }
        // Expired/forged tokens are a normal outcome, not a failure
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        Err(DirectoryError::Api {
            endpoint,
            status: status.as_u16(),
        })
    }

    async fn settings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TenantSettings>, DirectoryError> {
        self.settings_where("user_id", user_id).await
    }

    async fn settings_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<TenantSettings>, DirectoryError> {
        self.settings_where("public_slug", slug).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        #[derive(Deserialize)]
        struct UsersPage {
            users: Vec<UserRecord>,
        }

        let endpoint = self.endpoint("/auth/v1/admin/users");
        let response = self
            .client
            .get(&endpoint)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Api {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(response.json::<UsersPage>().await?.users)
    }
}
