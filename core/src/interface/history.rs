use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Archived detection shown in the history table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionHistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub confidence: f32,
    pub direction: f32,
    /// Seconds.
    pub duration: f32,
    /// 1..=3
    pub models_activated: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_sample: Option<String>,
}

impl DetectionHistoryRecord {
    /// US-style `M/D/YYYY` date used by the free-text search.
    pub fn date_label(&self) -> String {
        self.timestamp.format("%-m/%-d/%Y").to_string()
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }

    pub fn compass(&self) -> CompassDirection {
        CompassDirection::from_degrees(self.direction)
    }
}

/// Confidence badge bucket: high >= 80, medium 65..80, low < 65.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub const HIGH_FLOOR: f32 = 80.0;
    pub const MEDIUM_FLOOR: f32 = 65.0;

    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= Self::HIGH_FLOOR {
            ConfidenceBand::High
        } else if confidence >= Self::MEDIUM_FLOOR {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBand::High => "High",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::Low => "Low",
        }
    }
}

/// Four-way compass bucket.
///
/// North covers `>= 315` or `<= 45`, east `(45, 135]`, south `(135, 225]` and
/// west `(225, 315)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CompassDirection {
    North,
    East,
    South,
    West,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 4] = [
        CompassDirection::North,
        CompassDirection::East,
        CompassDirection::South,
        CompassDirection::West,
    ];

    pub fn from_degrees(degrees: f32) -> Self {
        let d = degrees.rem_euclid(360.0);
        if d >= 315.0 || d <= 45.0 {
            CompassDirection::North
        } else if d <= 135.0 {
            CompassDirection::East
        } else if d <= 225.0 {
            CompassDirection::South
        } else {
            CompassDirection::West
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompassDirection::North => "N",
            CompassDirection::East => "E",
            CompassDirection::South => "S",
            CompassDirection::West => "W",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_boundaries_follow_inclusive_north_rule() {
        assert_eq!(CompassDirection::from_degrees(0.0), CompassDirection::North);
        assert_eq!(CompassDirection::from_degrees(44.0), CompassDirection::North);
        assert_eq!(CompassDirection::from_degrees(45.0), CompassDirection::North);
        assert_eq!(CompassDirection::from_degrees(46.0), CompassDirection::East);
        assert_eq!(CompassDirection::from_degrees(135.0), CompassDirection::East);
        assert_eq!(CompassDirection::from_degrees(136.0), CompassDirection::South);
        assert_eq!(CompassDirection::from_degrees(225.0), CompassDirection::South);
        assert_eq!(CompassDirection::from_degrees(226.0), CompassDirection::West);
        assert_eq!(CompassDirection::from_degrees(314.0), CompassDirection::West);
        assert_eq!(CompassDirection::from_degrees(315.0), CompassDirection::North);
        assert_eq!(CompassDirection::from_degrees(316.0), CompassDirection::North);
    }

    #[test]
    fn confidence_band_edges() {
        assert_eq!(ConfidenceBand::from_confidence(79.9), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(80.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(64.9), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_confidence(65.0), ConfidenceBand::Medium);
    }
}
