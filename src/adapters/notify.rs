use crate::domain::model::{Notification, NotificationKind};
use crate::domain::ports::NotificationSink;
use std::sync::{Arc, Mutex};

/// Routes notifications into the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!("🔔 {}: {}", notification.title, notification.description)
            }
            NotificationKind::Failure => {
                tracing::warn!("🔔 {}: {}", notification.title, notification.description)
            }
            NotificationKind::Error => {
                tracing::error!("🔔 {}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Prints notifications for a terminal user. Errors and failures go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                println!("✅ {}: {}", notification.title, notification.description)
            }
            NotificationKind::Failure => {
                eprintln!("⚠️  {}: {}", notification.title, notification.description)
            }
            NotificationKind::Error => {
                eprintln!("❌ {}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Keeps every notification in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received
            .lock()
            .ok()
            .and_then(|received| received.last().cloned())
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Fans a notification out to two sinks.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: NotificationSink, B: NotificationSink> NotificationSink for Tee<A, B> {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}
