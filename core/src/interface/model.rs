use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Confidence at or above the activation threshold on the last tick.
    Active,
    Inactive,
}

/// One member of the detection ensemble as seen by the live monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelPrediction {
    pub name: String,
    /// Percent, 0-100.
    pub confidence: f32,
    pub status: ModelStatus,
    pub last_update: DateTime<Utc>,
}

impl ModelPrediction {
    pub fn new(name: impl Into<String>, confidence: f32, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            confidence,
            status: ModelStatus::Inactive,
            last_update: now,
        }
    }

    pub fn is_activated(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    pub fn badge(&self) -> &'static str {
        match self.status {
            ModelStatus::Active => "ACTIVATED",
            ModelStatus::Inactive => "MONITORING",
        }
    }
}
