//! Telemetry initialization - tracing and alerting setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::observability::AlertLayer;

/// Used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,api_server=debug,revu_infra=debug,revu_core=debug";

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// JSON log lines instead of pretty output.
    pub json_logs: bool,
    pub service_name: String,
    /// Forward ERROR events (storage failures, provider outages) as alerts.
    pub alerts_enabled: bool,
    /// Slack/Discord webhook; alerts go to stderr without one.
    pub alert_webhook_url: Option<String>,
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json_logs: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| "revu-api".to_string()),
            alerts_enabled: lookup("ALERTS_ENABLED").is_none_or(|v| v != "false" && v != "0"),
            alert_webhook_url: lookup("ALERT_WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Initialize telemetry (tracing and alerting). Call once, inside the runtime.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let alert_layer = config
        .alerts_enabled
        .then(|| match &config.alert_webhook_url {
            Some(url) => AlertLayer::webhook(url.clone()),
            None => AlertLayer::console(),
        });

    // fmt layers differ in type, so each format builds its own registry
    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .with(alert_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .with(alert_layer)
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        alerts_enabled = config.alerts_enabled,
        alert_webhook = config.alert_webhook_url.is_some(),
        "Telemetry initialized"
    );
}
