//! Tenant-facing HTTP gateway: public menu manifest, payment notifications,
//! push dispatch, billing customer resolution, and tenant-scoped cache
//! revalidation.

pub mod actions;
pub mod alerts;
pub mod config;
pub mod directory;
pub mod errors;
pub mod manifest;
pub mod menu_cache;
pub mod metrics_defs;
pub mod push;
pub mod revalidate;
pub mod routes;
pub mod session;

use crate::alerts::OperatorAlerts;
use crate::config::GatewayConfig;
use crate::directory::RestDirectory;
use crate::menu_cache::MenuCache;
use crate::push::RestPushGateway;
use crate::routes::AppState;
use billing::CustomerApi;
use shared::admin_service::AdminService;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("gateway listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves the API listener plus the admin listener until either fails.
///
/// The billing client is injected so the binary can share one client between
/// the gateway and the operator CLI.
pub async fn run(config: GatewayConfig, billing_api: Arc<dyn CustomerApi>) -> Result<(), RunError> {
    let state = AppState {
        directory: Arc::new(RestDirectory::new(&config.directory)),
        push: Arc::new(RestPushGateway::new(&config.push)),
        alerts: Arc::new(OperatorAlerts::new(&config.alerts)),
        billing: billing_api,
        menu_cache: Arc::new(MenuCache::new(
            config.menu_cache.capacity,
            Duration::from_secs(config.menu_cache.ttl_secs),
        )),
    };

    // Readiness flips once the API listener is bound; /health answers as soon
    // as the admin listener is up.
    let ready = Arc::new(AtomicBool::new(false));
    let admin = config.admin_listener.clone();
    let ready_probe = ready.clone();
    tokio::spawn(async move {
        let service =
            AdminService::<_, std::io::Error>::new(move || ready_probe.load(Ordering::Relaxed));
        if let Err(err) = shared::http::run_http_service(&admin.host, admin.port, service).await {
            tracing::error!("admin listener failed: {err}");
        }
    });

    let app = routes::router(state);
    let listener =
        TcpListener::bind(format!("{}:{}", config.listener.host, config.listener.port)).await?;
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "gateway listening"
    );
    ready.store(true, Ordering::Relaxed);

    axum::serve(listener, app).await?;
    Ok(())
}
