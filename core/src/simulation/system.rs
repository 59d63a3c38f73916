use crate::prelude::TickModel;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const METRICS_INTERVAL: Duration = Duration::from_millis(5000);

/// Static roster shown on the system page: name and validation accuracy.
pub const MODEL_ROSTER: [(&str, f32); 3] = [
    ("1D CNN Model", 94.2),
    ("2D CNN 64", 91.8),
    ("2D CNN 128", 96.1),
];

/// Host health readings, random-walked and clamped to plausible bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu: f32,
    pub memory: f32,
    pub temperature: f32,
    /// Hours.
    pub uptime: u32,
    pub disk_usage: f32,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self {
            cpu: 45.0,
            memory: 62.0,
            temperature: 58.0,
            uptime: 142,
            disk_usage: 34.0,
        }
    }
}

impl SystemMetrics {
    /// `"{days}d {hours}h"`
    pub fn uptime_label(&self) -> String {
        format!("{}d {}h", self.uptime / 24, self.uptime % 24)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLogEntry {
    pub id: u32,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// Boot-time entries for the system log panel: seconds before `now`, level, text.
const STARTUP_LOG: [(i64, LogLevel, &str); 5] = [
    (0, LogLevel::Info, "System started successfully"),
    (30, LogLevel::Info, "Microphone array initialized"),
    (60, LogLevel::Warning, "High CPU usage detected"),
    (120, LogLevel::Info, "Model ensemble loaded"),
    (180, LogLevel::Error, "Temporary network timeout"),
];

/// The system log as seen at `now`, newest first.
pub fn startup_log(now: DateTime<Utc>) -> Vec<SystemLogEntry> {
    STARTUP_LOG
        .iter()
        .zip(1..)
        .map(|((ago, level, message), id)| SystemLogEntry {
            id,
            timestamp: now - ChronoDuration::seconds(*ago),
            level: *level,
            message: (*message).into(),
        })
        .collect()
}

fn walk<R: Rng + ?Sized>(rng: &mut R, value: f32, step: f32, min: f32, max: f32) -> f32 {
    (value + (rng.gen::<f32>() - 0.5) * step).clamp(min, max)
}

impl TickModel for SystemMetrics {
    type Output = ();

    fn interval(&self) -> Duration {
        METRICS_INTERVAL
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, _now: DateTime<Utc>) {
        self.cpu = walk(rng, self.cpu, 10.0, 10.0, 90.0);
        self.memory = walk(rng, self.memory, 5.0, 30.0, 95.0);
        self.temperature = walk(rng, self.temperature, 3.0, 40.0, 80.0);
        self.uptime += 1;
    }
}
