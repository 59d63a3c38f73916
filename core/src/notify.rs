//! Operator notifications ("toasts").
//!
//! The core only produces [`Notification`] values; presenting them is up to
//! whatever [`Notifier`] the host wires in.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes every notification to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Destructive => warn!(
                target: "gds::notify",
                "{}: {}",
                notification.title,
                notification.description
            ),
            Severity::Default => info!(
                target: "gds::notify",
                "{}: {}",
                notification.title,
                notification.description
            ),
        }
    }
}

/// A notification stamped with the moment it was raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEntry {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

/// Bounded in-memory notification history, newest first. Also logs.
pub struct NotificationLog {
    capacity: usize,
    entries: Mutex<VecDeque<NotificationEntry>>,
}

impl NotificationLog {
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn recent(&self) -> Vec<NotificationEntry> {
        if let Ok(entries) = self.entries.lock() {
            entries.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        LogNotifier.notify(notification.clone());
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_front(NotificationEntry {
                at: Utc::now(),
                notification,
            });
            entries.truncate(self.capacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_log_keeps_newest_first_and_bounded() {
        let log = NotificationLog::with_capacity(2);
        for i in 0..3 {
            log.notify(Notification::new(format!("n{i}"), "", Severity::Default));
        }
        let recent = log.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].notification.title, "n2");
        assert_eq!(recent[1].notification.title, "n1");
    }
}
