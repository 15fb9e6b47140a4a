//! Notification Service
//!
//! User-visible notifications raised by the refresh controller. The
//! controller receives a [`NotificationSink`] at construction; the
//! [`NotificationCenter`] implementation keeps a short history for late
//! readers and broadcasts every notification to live subscribers.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// How long a toast stays on screen by default
pub const DEFAULT_LIFETIME_MS: u64 = 3000;

const DEFAULT_HISTORY: usize = 50;
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A single user-visible notification
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub summary: String,
    pub lifetime_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            summary: summary.into(),
            lifetime_ms: DEFAULT_LIFETIME_MS,
            created_at: Utc::now(),
        }
    }

    pub fn success(summary: impl Into<String>) -> Self {
        Self::new(Severity::Success, summary)
    }

    pub fn info(summary: impl Into<String>) -> Self {
        Self::new(Severity::Info, summary)
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(Severity::Error, summary)
    }
}

/// Receives notifications meant for the user
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// History-keeping, broadcasting notification sink
pub struct NotificationCenter {
    history: Mutex<VecDeque<Notification>>,
    capacity: usize,
    sender: broadcast::Sender<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            sender,
        }
    }

    /// Subscribe to notifications posted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Recent notifications, oldest first
    pub fn recent(&self) -> Vec<Notification> {
        self.history.lock().iter().cloned().collect()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => warn!("Notification: {}", notification.summary),
            _ => info!("Notification: {}", notification.summary),
        }

        {
            let mut history = self.history.lock();
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(notification.clone());
        }

        // No subscribers is fine
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let center = NotificationCenter::with_capacity(2);
        center.notify(Notification::success("one"));
        center.notify(Notification::success("two"));
        center.notify(Notification::error("three"));

        let summaries: Vec<_> = center.recent().into_iter().map(|n| n.summary).collect();
        assert_eq!(summaries, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        center.notify(Notification::success("Incremental data updated"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.severity, Severity::Success);
        assert_eq!(received.summary, "Incremental data updated");
        assert_eq!(received.lifetime_ms, DEFAULT_LIFETIME_MS);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let value = serde_json::to_value(Notification::error("x")).unwrap();
        assert_eq!(value["severity"], "error");
    }
}
