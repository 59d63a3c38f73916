//! Operator settings.
//!
//! Held in memory only; nothing here is persisted. Numeric fields carry a
//! declared range and step, and text input for them is validated before the
//! stored value changes.

use crate::notify::{Notification, Severity};
use crate::prelude::{SimError, SimResult};
use crate::simulation::{DetectorConfig, EnsembleConfig, ResetPolicy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub confidence_threshold: u32,
    pub ensemble_voting: u32,
    pub alert_cooldown_secs: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 50,
            ensemble_voting: 2,
            alert_cooldown_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub email_recipients: String,
    pub phone_numbers: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            email_recipients: "security@company.com".into(),
            phone_numbers: "+1234567890".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrophoneSettings {
    pub gain: u32,
    pub sample_rate: u32,
    pub buffer_size: u32,
    pub microphone_count: u32,
}

impl Default for MicrophoneSettings {
    fn default() -> Self {
        Self {
            gain: 75,
            sample_rate: 44_100,
            buffer_size: 1024,
            microphone_count: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarTheme {
    #[default]
    Default,
    Dark,
    Tactical,
}

impl RadarTheme {
    pub const ALL: [RadarTheme; 3] = [RadarTheme::Default, RadarTheme::Dark, RadarTheme::Tactical];

    pub fn label(self) -> &'static str {
        match self {
            RadarTheme::Default => "Default",
            RadarTheme::Dark => "Dark",
            RadarTheme::Tactical => "Tactical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSettings {
    pub radar_theme: RadarTheme,
    pub alert_volume: u32,
    pub auto_refresh: bool,
}

impl Default for InterfaceSettings {
    fn default() -> Self {
        Self {
            radar_theme: RadarTheme::Default,
            alert_volume: 80,
            auto_refresh: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub notifications: NotificationSettings,
    pub microphones: MicrophoneSettings,
    pub interface: InterfaceSettings,
}

/// Numeric settings that accept free-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    ConfidenceThreshold,
    EnsembleVoting,
    AlertCooldown,
    MicrophoneGain,
    SampleRate,
    BufferSize,
    MicrophoneCount,
    AlertVolume,
}

impl NumericField {
    pub const ALL: [NumericField; 8] = [
        NumericField::ConfidenceThreshold,
        NumericField::EnsembleVoting,
        NumericField::AlertCooldown,
        NumericField::MicrophoneGain,
        NumericField::SampleRate,
        NumericField::BufferSize,
        NumericField::MicrophoneCount,
        NumericField::AlertVolume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::ConfidenceThreshold => "confidence_threshold",
            NumericField::EnsembleVoting => "ensemble_voting",
            NumericField::AlertCooldown => "alert_cooldown",
            NumericField::MicrophoneGain => "microphone_gain",
            NumericField::SampleRate => "sample_rate",
            NumericField::BufferSize => "buffer_size",
            NumericField::MicrophoneCount => "microphone_count",
            NumericField::AlertVolume => "alert_volume",
        }
    }

    /// Inclusive bounds.
    pub fn range(self) -> (u32, u32) {
        match self {
            NumericField::ConfidenceThreshold => (10, 100),
            NumericField::EnsembleVoting => (1, 3),
            NumericField::AlertCooldown => (1, 60),
            NumericField::MicrophoneGain => (0, 100),
            NumericField::SampleRate => (8_000, 192_000),
            NumericField::BufferSize => (64, 16_384),
            NumericField::MicrophoneCount => (1, 8),
            NumericField::AlertVolume => (0, 100),
        }
    }

    pub fn step(self) -> u32 {
        match self {
            NumericField::ConfidenceThreshold
            | NumericField::MicrophoneGain
            | NumericField::AlertVolume => 5,
            _ => 1,
        }
    }

    /// Snaps `value` onto the step grid anchored at the lower bound.
    fn snap(self, value: f64) -> u32 {
        let (min, max) = self.range();
        let step = self.step() as f64;
        let snapped = min as f64 + ((value - min as f64) / step).round() * step;
        (snapped as u32).clamp(min, max)
    }
}

impl FromStr for NumericField {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        NumericField::ALL
            .into_iter()
            .find(|field| field.name() == key)
            .ok_or_else(|| SimError::InvalidInput(format!("unknown setting {s:?}")))
    }
}

impl Settings {
    pub fn get(&self, field: NumericField) -> u32 {
        match field {
            NumericField::ConfidenceThreshold => self.detection.confidence_threshold,
            NumericField::EnsembleVoting => self.detection.ensemble_voting,
            NumericField::AlertCooldown => self.detection.alert_cooldown_secs,
            NumericField::MicrophoneGain => self.microphones.gain,
            NumericField::SampleRate => self.microphones.sample_rate,
            NumericField::BufferSize => self.microphones.buffer_size,
            NumericField::MicrophoneCount => self.microphones.microphone_count,
            NumericField::AlertVolume => self.interface.alert_volume,
        }
    }

    fn slot_mut(&mut self, field: NumericField) -> &mut u32 {
        match field {
            NumericField::ConfidenceThreshold => &mut self.detection.confidence_threshold,
            NumericField::EnsembleVoting => &mut self.detection.ensemble_voting,
            NumericField::AlertCooldown => &mut self.detection.alert_cooldown_secs,
            NumericField::MicrophoneGain => &mut self.microphones.gain,
            NumericField::SampleRate => &mut self.microphones.sample_rate,
            NumericField::BufferSize => &mut self.microphones.buffer_size,
            NumericField::MicrophoneCount => &mut self.microphones.microphone_count,
            NumericField::AlertVolume => &mut self.interface.alert_volume,
        }
    }

    /// Stores `value` snapped to the field's step. Out-of-range values are
    /// rejected and the previous value kept.
    pub fn set(&mut self, field: NumericField, value: f64) -> SimResult<u32> {
        let (min, max) = field.range();
        if !value.is_finite() || value < min as f64 || value > max as f64 {
            return Err(SimError::OutOfRange {
                field: field.name().into(),
                value,
                min: min as f64,
                max: max as f64,
            });
        }
        let snapped = field.snap(value);
        *self.slot_mut(field) = snapped;
        Ok(snapped)
    }

    /// Parses operator text for a numeric field. Empty or non-numeric text
    /// leaves the previous value in place.
    pub fn apply_input(&mut self, field: NumericField, text: &str) -> SimResult<u32> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| SimError::InvalidNumber {
                field: field.name().into(),
                value: text.into(),
            })?;
        self.set(field, value)
    }

    /// Checks every numeric field against its range.
    pub fn validate(&self) -> SimResult<()> {
        for field in NumericField::ALL {
            let (min, max) = field.range();
            let value = self.get(field);
            if value < min || value > max {
                return Err(SimError::OutOfRange {
                    field: field.name().into(),
                    value: value as f64,
                    min: min as f64,
                    max: max as f64,
                });
            }
        }
        Ok(())
    }

    pub fn ensemble_config(&self) -> EnsembleConfig {
        EnsembleConfig {
            activation_threshold: self.detection.confidence_threshold as f32,
            voting_requirement: self.detection.ensemble_voting as usize,
        }
    }

    pub fn detector_config(&self, probability: f64, reset_policy: ResetPolicy) -> DetectorConfig {
        DetectorConfig {
            probability,
            reset_delay: Duration::from_secs(self.detection.alert_cooldown_secs as u64),
            reset_policy,
        }
    }

    pub fn save_notification() -> Notification {
        Notification::new(
            "Settings Saved",
            "Your configuration has been updated successfully.",
            Severity::Default,
        )
    }

    /// Toast for the "test" buttons, e.g. `"Email"` or `"Microphone"`.
    pub fn test_notification(kind: &str) -> Notification {
        Notification::new(
            format!("{kind} Test"),
            format!("Testing {} configuration...", kind.to_lowercase()),
            Severity::Default,
        )
    }
}
