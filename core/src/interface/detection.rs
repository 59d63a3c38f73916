use crate::notify::{Notification, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectionKind {
    Gunshot,
    Clear,
}

/// Installation-wide alert state shown in the dashboard header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Safe,
    Alert,
}

impl AlertStatus {
    pub fn is_alert(self) -> bool {
        self == AlertStatus::Alert
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertStatus::Safe => "SECURE",
            AlertStatus::Alert => "ALERT",
        }
    }
}

/// A single simulated detection. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Percent, 0-100.
    pub confidence: f32,
    /// Whole degrees in [0, 360).
    pub direction: f32,
    pub kind: DetectionKind,
}

impl DetectionEvent {
    pub fn gunshot(timestamp: DateTime<Utc>, confidence: f32, direction: f32) -> Self {
        Self {
            id: timestamp.timestamp_millis().to_string(),
            timestamp,
            confidence,
            direction: direction.rem_euclid(360.0),
            kind: DetectionKind::Gunshot,
        }
    }

    /// Operator toast raised when the event is emitted.
    pub fn notification(&self) -> Notification {
        Notification::new(
            "GUNSHOT DETECTED!",
            format!(
                "Direction: {}° | Confidence: {:.1}%",
                self.direction, self.confidence
            ),
            Severity::Destructive,
        )
    }
}
