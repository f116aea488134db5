//! # Alerts
//!
//! Publishes expiry warnings as Kubernetes events on the affected secret.

use crate::constants::EVENT_REPORTER;
use crate::controller::aggregate::ExpiryAlert;
use anyhow::Result;
use async_trait::async_trait;
use kube::Client;
use kube_runtime::events::{Event, EventType, Recorder, Reporter};

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, alert: &ExpiryAlert) -> Result<()>;
}

/// [`AlertSink`] that records a Warning event regarding the secret
pub struct EventAlertSink {
    recorder: Recorder,
}

impl std::fmt::Debug for EventAlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAlertSink")
            .field("reporter", &EVENT_REPORTER)
            .finish_non_exhaustive()
    }
}

impl EventAlertSink {
    #[must_use]
    pub fn new(client: Client) -> Self {
        let reporter = Reporter {
            controller: EVENT_REPORTER.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl AlertSink for EventAlertSink {
    async fn publish(&self, alert: &ExpiryAlert) -> Result<()> {
        let event = Event {
            type_: EventType::Warning,
            reason: alert.reason.as_str().to_string(),
            note: Some(alert.message.clone()),
            action: "CheckCertificate".to_string(),
            secondary: None,
        };
        self.recorder.publish(&event, &alert.subject).await?;
        Ok(())
    }
}
