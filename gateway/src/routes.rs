use crate::alerts::{OperatorAlerts, PaymentAlert, format_payment_alert, manual_subscription_ref};
use crate::directory::Directory;
use crate::errors::GatewayError;
use crate::manifest::{MANIFEST_CONTENT_TYPE, build_manifest};
use crate::menu_cache::{CachedArtifact, MenuCache, menu_tag};
use crate::push::{PushDelivery, PushPayload, PushOutcome, validate_send_request};
use crate::revalidate::{RevalidateOutcome, revalidate_tenant_menu};
use crate::session::{bearer_token, resolve_session};
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use billing::CustomerApi;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MANIFEST_CACHE_CONTROL: &str = "public, max-age=300, must-revalidate";

/// Collaborator capabilities injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub push: Arc<dyn PushDelivery>,
    pub alerts: Arc<OperatorAlerts>,
    pub billing: Arc<dyn CustomerApi>,
    pub menu_cache: Arc<MenuCache>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/manifest/{slug}", get(get_manifest))
        .route("/api/pix/notify-payment", post(notify_payment))
        .route("/api/push/send", post(push_send))
        .route("/api/push/test", get(push_test))
        .route("/api/billing/customer", post(resolve_billing_customer))
        .route("/api/menu/revalidate", post(revalidate_menu))
        .with_state(state)
}

fn artifact_response(artifact: &CachedArtifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type),
            (header::CACHE_CONTROL, MANIFEST_CACHE_CONTROL),
        ],
        artifact.body.clone(),
    )
        .into_response()
}

/// Installable-app descriptor for a tenant's public menu. Cached under the
/// tenant's menu tag until revalidated.
async fn get_manifest(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, GatewayError> {
    let tag = menu_tag(&slug);
    if let Some(artifact) = state.menu_cache.get(&tag) {
        return Ok(artifact_response(&artifact));
    }

    let Some(settings) = state.directory.settings_by_slug(&slug).await? else {
        return Err(GatewayError::NotFound("Store not found".to_string()));
    };

    let manifest = build_manifest(&slug, &settings);
    let body = serde_json::to_string(&manifest)
        .map_err(|err| GatewayError::Internal(err.to_string()))?;
    let artifact = CachedArtifact {
        content_type: MANIFEST_CONTENT_TYPE,
        body,
    };
    let response = artifact_response(&artifact);
    state.menu_cache.insert(&tag, artifact);
    Ok(response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotifyPaymentRequest {
    #[serde(default)]
    plan_type: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    billing_period: Option<String>,
}

#[derive(Serialize)]
struct NotifyPaymentResponse {
    success: bool,
    message: &'static str,
}

/// Manual payment confirmation: formats an operator alert for a payment the
/// tenant reports having made out of band.
///
/// Status responses here are plain text, matching the public contract.
async fn notify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NotifyPaymentRequest>,
) -> Response {
    let plan_type = request.plan_type.filter(|p| !p.is_empty());
    let (Some(plan_type), Some(amount)) = (plan_type, request.amount) else {
        return (StatusCode::BAD_REQUEST, "Missing planType or amount").into_response();
    };

    let session = match resolve_session(state.directory.as_ref(), bearer_token(&headers)).await {
        Ok(session) => session,
        Err(err) => return GatewayError::from(err).into_response(),
    };
    let Some(user) = session else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };
    let Some(email) = user.email.clone().filter(|e| !e.is_empty()) else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    tracing::info!(user_id = %user.id, plan_type = %plan_type, "manual payment notification");

    let subscription_ref = manual_subscription_ref(&user.id);
    let text = format_payment_alert(&PaymentAlert {
        plan_type: &plan_type,
        billing_period: request.billing_period.as_deref(),
        amount,
        customer_email: &email,
        subscription_ref: &subscription_ref,
    });

    let result = state.alerts.send(&text).await;
    if result.success {
        (
            StatusCode::OK,
            Json(NotifyPaymentResponse {
                success: true,
                message: "Notification sent to the operator.",
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(NotifyPaymentResponse {
                success: false,
                message: "Failed to send notification.",
            }),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushSendRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Serialize)]
struct PushSendResponse {
    success: bool,
    #[serde(flatten)]
    outcome: PushOutcome,
}

/// Push dispatch on behalf of the system. The provider outcome is returned
/// unmodified alongside the success flag.
async fn push_send(
    State(state): State<AppState>,
    Json(request): Json<PushSendRequest>,
) -> Result<Json<PushSendResponse>, GatewayError> {
    validate_send_request(&request.user_id, &request.title, &request.message)?;

    let payload = PushPayload::new(request.title, request.message, request.url);
    let outcome = state
        .push
        .send_to_user(&request.user_id, payload)
        .await
        .map_err(|err| GatewayError::Upstream(err.to_string()))?;

    Ok(Json(PushSendResponse {
        success: true,
        outcome,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushTestParams {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Serialize)]
struct PushTestResponse {
    success: bool,
    message: &'static str,
    #[serde(flatten)]
    outcome: PushOutcome,
}

/// Sends a fixed test notification so an operator can verify a user's
/// subscription end to end.
async fn push_test(
    State(state): State<AppState>,
    Query(params): Query<PushTestParams>,
) -> Result<Json<PushTestResponse>, GatewayError> {
    let Some(user_id) = params.user_id.filter(|id| !id.is_empty()) else {
        return Err(GatewayError::Validation(
            "Missing userId parameter".to_string(),
        ));
    };

    tracing::info!(%user_id, "sending test push notification");

    let payload = PushPayload::new(
        "\u{1f514} Test notification!",
        "If you can see this, push notifications are working!",
        Some("/dashboard".to_string()),
    );
    let outcome = state
        .push
        .send_to_user(&user_id, payload)
        .await
        .map_err(|err| GatewayError::Upstream(err.to_string()))?;

    Ok(Json(PushTestResponse {
        success: true,
        message: "Test notification sent!",
        outcome,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingCustomerResponse {
    customer_id: String,
    email: Option<String>,
}

/// Resolves the authenticated tenant's billing customer, creating one only
/// when none is resolvable.
async fn resolve_billing_customer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BillingCustomerResponse>, GatewayError> {
    let user = resolve_session(state.directory.as_ref(), bearer_token(&headers))
        .await?
        .ok_or(GatewayError::Unauthorized)?;
    let email = user
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or(GatewayError::Unauthorized)?;

    let customer =
        billing::resolve_customer(state.billing.as_ref(), &user.id, &email, None).await?;

    Ok(Json(BillingCustomerResponse {
        customer_id: customer.id,
        email: customer.email,
    }))
}

/// Invalidates the caller's public-menu artifacts. Equivalent of the
/// settings-save revalidation action.
async fn revalidate_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RevalidateOutcome>, GatewayError> {
    let outcome = revalidate_tenant_menu(
        state.directory.as_ref(),
        &state.menu_cache,
        bearer_token(&headers),
    )
    .await?;
    Ok(Json(outcome))
}
