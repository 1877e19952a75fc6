//! In-process fan-out of security alerts to realtime subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Buffered alerts per receiver before the slowest one starts losing messages.
const ALERT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
}

impl SecurityAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: AlertSeverity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }
}

/// Best-effort, at-most-once alert broadcast. Nothing is persisted or replayed.
#[derive(Debug, Clone)]
pub struct AlertHub {
    sender: broadcast::Sender<SecurityAlert>,
}

impl Default for AlertHub {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(ALERT_BUFFER);
        Self { sender }
    }

    /// Publish to every live subscriber, returning how many received it.
    pub fn publish(&self, alert: SecurityAlert) -> usize {
        let delivered = self.sender.send(alert).unwrap_or(0);
        debug!(delivered, "security alert published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SecurityAlert> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
