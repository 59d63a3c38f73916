use chrono::{DateTime, Utc};
use gdscore::interface::{AlertStatus, DetectionEvent, DetectionHistoryRecord, ModelPrediction};
use gdscore::notify::NotificationEntry;
use gdscore::simulation::{AudioFeatures, HistoryPage, HistoryStats, SystemLogEntry, SystemMetrics};
use gdscore::telemetry::Metrics;
use serde::{Deserialize, Serialize};

/// Main dashboard: alert header, radar, waveform and recent events.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardModel {
    pub status: AlertStatus,
    pub detection_direction: Option<f32>,
    pub sweep_angle: f32,
    pub waveform: Vec<f32>,
    pub bar_heights: Vec<f32>,
    pub waveform_alert: bool,
    pub recent_detections: Vec<DetectionEvent>,
    pub last_processed: Option<DateTime<Utc>>,
    pub microphone_count: u32,
    pub metrics: Metrics,
}

/// Live monitor: per-model gauges and the ensemble vote.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonitorModel {
    pub models: Vec<ModelPrediction>,
    pub activated: usize,
    pub required: usize,
    pub threshold: f32,
    pub score: f32,
    pub alert: bool,
    pub features: AudioFeatures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub accuracy: f32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemModel {
    pub metrics: SystemMetrics,
    pub uptime: String,
    pub roster: Vec<RosterEntry>,
    pub logs: Vec<SystemLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryModel {
    pub records: Vec<DetectionHistoryRecord>,
    pub page: usize,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub stats: HistoryStats,
}

impl HistoryModel {
    pub fn new(page: HistoryPage<'_>, stats: HistoryStats) -> Self {
        Self {
            records: page.records.into_iter().cloned().collect(),
            page: page.page,
            total_filtered: page.total_filtered,
            total_pages: page.total_pages,
            stats,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationsModel {
    pub notifications: Vec<NotificationEntry>,
}
