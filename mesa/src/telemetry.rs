use crate::config::CommonConfig;
use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::EnvFilter;

/// Keeps error reporting alive for the lifetime of the process.
pub struct Telemetry {
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Initializes tracing, optional error reporting, and optional metrics
/// export. Telemetry failures degrade to warnings; they never stop the
/// process from serving.
pub fn init(common: &CommonConfig) -> Telemetry {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sentry_guard = common.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Some(metrics_config) = &common.metrics {
        match StatsdBuilder::from(metrics_config.statsd_host.as_str(), metrics_config.statsd_port)
            .build(Some("mesa"))
        {
            Ok(recorder) => {
                if let Err(err) = metrics::set_global_recorder(recorder) {
                    tracing::warn!("metrics recorder already installed: {err}");
                }
            }
            Err(err) => tracing::warn!("could not start statsd exporter: {err}"),
        }
    }

    Telemetry {
        _sentry: sentry_guard,
    }
}
