use crate::config::PushConfig;
use crate::errors::GatewayError;
use crate::metrics_defs::PUSH_DISPATCH;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::counter;
use thiserror::Error;

const DEFAULT_ICON: &str = "/icon-192x192.png";
const DEFAULT_TARGET_URL: &str = "/pedidos";
const DEFAULT_TAG: &str = "default";

#[derive(Error, Debug)]
pub enum PushError {
    #[error("push dispatch failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push dispatcher returned {status}: {detail}")]
    Api { status: u16, detail: String },
}

/// Notification content delivered to every registered device of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub url: String,
    pub tag: String,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_ICON.to_string(),
            url: url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string()),
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

/// Per-device delivery tallies reported by the push collaborator.
///
/// `cleaned` counts stale subscriptions the collaborator dropped while
/// delivering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PushOutcome {
    pub sent: u32,
    pub failed: u32,
    pub cleaned: u32,
}

/// Capability exposed by the push collaborator.
///
/// Subscriptions are owned by the collaborator and opaque here; the gateway
/// only needs the dispatch-to-user entry point.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn send_to_user(
        &self,
        user_id: &str,
        payload: PushPayload,
    ) -> Result<PushOutcome, PushError>;
}

/// Rejects the dispatch before any network call when a required field is
/// missing. The message names the wire-level fields.
pub fn validate_send_request(user_id: &str, title: &str, body: &str) -> Result<(), GatewayError> {
    if user_id.is_empty() || title.is_empty() || body.is_empty() {
        return Err(GatewayError::Validation(
            "Missing required fields: userId, title, message".to_string(),
        ));
    }
    Ok(())
}

/// REST client for the push collaborator's dispatch endpoint.
pub struct RestPushGateway {
    client: reqwest::Client,
    dispatch_url: String,
}

impl RestPushGateway {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            dispatch_url: config.dispatch_url.to_string(),
        }
    }
}

#[derive(Serialize)]
struct DispatchRequest<'a> {
    user_id: &'a str,
    payload: &'a PushPayload,
}

#[async_trait]
impl PushDelivery for RestPushGateway {
    async fn send_to_user(
        &self,
        user_id: &str,
        payload: PushPayload,
    ) -> Result<PushOutcome, PushError> {
        counter!(PUSH_DISPATCH).increment(1);

        let response = self
            .client
            .post(&self.dispatch_url)
            .json(&DispatchRequest {
                user_id,
                payload: &payload,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PushError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let outcome = response.json::<PushOutcome>().await?;
        tracing::info!(
            user_id,
            sent = outcome.sent,
            failed = outcome.failed,
            cleaned = outcome.cleaned,
            "push dispatched"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_payload_defaults() {
        let payload = PushPayload::new("New order", "Table 4 ordered", None);
        assert_eq!(payload.icon, DEFAULT_ICON);
        assert_eq!(payload.badge, DEFAULT_ICON);
        assert_eq!(payload.url, DEFAULT_TARGET_URL);
        assert_eq!(payload.tag, DEFAULT_TAG);

        let payload = PushPayload::new("t", "b", Some("/dashboard".to_string()));
        assert_eq!(payload.url, "/dashboard");
    }

    #[test]
    fn test_validation_rejects_missing_fields() {
        assert!(validate_send_request("", "t", "b").is_err());
        assert!(validate_send_request("u", "", "b").is_err());
        assert!(validate_send_request("u", "t", "").is_err());
        assert!(validate_send_request("u", "t", "b").is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_posts_user_and_payload() {
        let server = MockServer::start().await;
        let payload = PushPayload::new("New order", "Table 4 ordered", None);
        let expected = serde_json::json!({
            "user_id": "user-1",
            "payload": {
                "title": "New order",
                "body": "Table 4 ordered",
                "icon": DEFAULT_ICON,
                "badge": DEFAULT_ICON,
                "url": DEFAULT_TARGET_URL,
                "tag": DEFAULT_TAG,
            }
        });

        Mock::given(method("POST"))
            .and(path("/dispatch"))
            .and(body_json_string(expected.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"sent":2,"failed":1,"cleaned":1}"#),
            )
            .mount(&server)
            .await;

        let push = RestPushGateway::new(&PushConfig {
            dispatch_url: Url::parse(&format!("{}/dispatch", server.uri())).unwrap(),
        });
        let outcome = push.send_to_user("user-1", payload).await.unwrap();
        assert_eq!(
            outcome,
            PushOutcome {
                sent: 2,
                failed: 1,
                cleaned: 1
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_surfaces_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dispatch"))
            .respond_with(ResponseTemplate::new(502).set_body_string("relay down"))
            .mount(&server)
            .await;

        let push = RestPushGateway::new(&PushConfig {
            dispatch_url: Url::parse(&format!("{}/dispatch", server.uri())).unwrap(),
        });
        let err = push
            .send_to_user("user-1", PushPayload::new("t", "b", None))
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::Api { status: 502, .. }));
    }
}
