//! Error alerting layer for tracing.
//!
//! Storage failures make the rate limiter deny traffic, so they need a human
//! quickly. This layer forwards ERROR events, with their trace ID, to the
//! console or a chat webhook.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// Alert built from one tracing event.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub level: tracing::Level,
    pub message: String,
    pub target: String,
    pub trace_id: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    fn summary(&self) -> String {
        let mut text = format!("[{}] {}: {}", self.level, self.target, self.message);
        if let Some(trace_id) = &self.trace_id {
            text.push_str(&format!(" (trace {trace_id})"));
        }
        for (name, value) in &self.fields {
            text.push_str(&format!("\n  {name} = {value}"));
        }
        text
    }
}

/// Configuration for the alert layer.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Least severe level that triggers an alert.
    pub min_level: tracing::Level,
    /// Pending alerts kept before new ones are dropped.
    pub buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_level: tracing::Level::ERROR,
            buffer_size: 100,
        }
    }
}

/// Destination for alerts.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr (for development).
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("\nALERT {} at {}\n", alert.summary(), alert.timestamp);
        Ok(())
    }
}

/// Posts alerts to a Slack/Discord-style webhook.
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": format!("*Review backend alert*\n{}\n*Time:* {}", alert.summary(), alert.timestamp)
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that queues alerts for a background sender task.
pub struct AlertLayer {
    sender: mpsc::Sender<AlertMessage>,
    min_level: tracing::Level,
}

impl AlertLayer {
    /// Create a new alert layer. Must be called inside a tokio runtime.
    pub fn new(alert_sender: Arc<dyn AlertSender>, config: AlertConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = alert_sender.send(alert).await {
                    // Logging here would feed back into this layer.
                    eprintln!("Failed to send alert: {}", e);
                }
            }
        });

        Self {
            sender: tx,
            min_level: config.min_level,
        }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleAlertSender), AlertConfig::default())
    }

    pub fn webhook(url: String) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)), AlertConfig::default())
    }
}

/// Visitor to extract fields from events.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    trace_id: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn store(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "trace_id" => self.trace_id = Some(value),
            _ => self.fields.push((name.to_string(), value)),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.store(field.name(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.store(field.name(), value.to_string());
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // Level ordering: ERROR is the "smallest".
        if *event.metadata().level() > self.min_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            level: *event.metadata().level(),
            message: visitor.message,
            target: event.metadata().target().to_string(),
            trace_id: visitor.trace_id,
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        // Non-blocking send; alerts are dropped when the buffer is full
        let _ = self.sender.try_send(alert);
    }
}
