use billing::config::BillingConfig;
use gateway::config::GatewayConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub gateway: Option<GatewayConfig>,
    pub billing: Option<BillingConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Secrets normally arrive via the environment rather than the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(gateway) = &mut self.gateway {
            gateway.apply_env_overrides();
        }
        if let Some(billing) = &mut self.billing {
            billing.apply_env_overrides();
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
            logging:
                sentry_dsn: https://key@sentry.example/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            gateway:
                listener:
                    host: 0.0.0.0
                    port: 3000
                admin_listener:
                    host: 127.0.0.1
                    port: 3001
                directory:
                    url: https://project.directory.example
                    anon_key: anon-key
                    service_role_key: service-role-key
                push:
                    dispatch_url: https://push.internal/dispatch
            billing:
                api_base: https://api.billing.example
                secret_key: sk_test_123
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(
            config.common.logging.expect("logging config").sentry_dsn,
            "https://key@sentry.example/1"
        );
        assert_eq!(config.common.metrics.expect("metrics config").statsd_port, 8125);

        let gateway_config = config.gateway.expect("gateway config");
        assert!(gateway_config.validate().is_ok());
        assert_eq!(gateway_config.listener.port, 3000);

        let billing_config = config.billing.expect("billing config");
        assert!(billing_config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let tmp = write_tmp_file("billing:\n    api_base: https://api.billing.example\n");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.gateway.is_none());
        assert!(config.common.logging.is_none());
        assert!(config.billing.is_some());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = write_tmp_file("gateway: [not, a, mapping]");
        assert!(matches!(
            Config::from_file(tmp.path()).unwrap_err(),
            ConfigError::ParseError(_)
        ));
    }
}
