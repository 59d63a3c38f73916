use crate::interface::{AlertStatus, DetectionEvent};
use crate::prelude::TickModel;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

pub const DETECTION_INTERVAL: Duration = Duration::from_millis(2000);
pub const DETECTION_PROBABILITY: f64 = 0.05;
pub const ALERT_RESET_DELAY: Duration = Duration::from_millis(10_000);
pub const RECENT_CAPACITY: usize = 5;

/// What a new detection does to an alert reset that is still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Every detection schedules its own reset; an earlier reset may clear a
    /// later detection before its cooldown has elapsed.
    #[default]
    Independent,
    /// A new detection cancels the pending reset and schedules a fresh one.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub probability: f64,
    pub reset_delay: Duration,
    pub reset_policy: ResetPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            probability: DETECTION_PROBABILITY,
            reset_delay: ALERT_RESET_DELAY,
            reset_policy: ResetPolicy::Independent,
        }
    }
}

/// Dashboard alert state fed by randomly emitted gunshot events.
///
/// The simulator only applies the immediate effects of an event; scheduling
/// the delayed [`clear_alert`](Self::clear_alert) is the owner's job.
#[derive(Debug, Clone)]
pub struct DetectionSimulator {
    config: DetectorConfig,
    status: AlertStatus,
    direction: Option<f32>,
    recent: VecDeque<DetectionEvent>,
    last_processed: Option<DateTime<Utc>>,
}

impl DetectionSimulator {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            status: AlertStatus::Safe,
            direction: None,
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
            last_processed: None,
        }
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    pub fn set_config(&mut self, config: DetectorConfig) {
        self.config = config;
    }

    pub fn status(&self) -> AlertStatus {
        self.status
    }

    pub fn direction(&self) -> Option<f32> {
        self.direction
    }

    /// Newest first, at most [`RECENT_CAPACITY`].
    pub fn recent(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.recent.iter()
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    pub fn last_processed(&self) -> Option<DateTime<Utc>> {
        self.last_processed
    }

    /// Builds an event without applying it.
    pub fn sample_event<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> DetectionEvent {
        let confidence = rng.gen_range(60.0..95.0);
        let direction = rng.gen_range(0.0f32..360.0).floor();
        DetectionEvent::gunshot(now, confidence, direction)
    }

    /// Raises the alert, points the radar marker at the event and records it.
    pub fn apply(&mut self, event: DetectionEvent) {
        self.status = AlertStatus::Alert;
        self.direction = Some(event.direction);
        self.recent.push_front(event);
        self.recent.truncate(RECENT_CAPACITY);
    }

    /// Back to safe with no marker, regardless of which detection scheduled it.
    pub fn clear_alert(&mut self) {
        self.status = AlertStatus::Safe;
        self.direction = None;
    }
}

impl Default for DetectionSimulator {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl TickModel for DetectionSimulator {
    type Output = Option<DetectionEvent>;

    fn interval(&self) -> Duration {
        DETECTION_INTERVAL
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Self::Output {
        self.last_processed = Some(now);
        if rng.gen::<f64>() >= self.config.probability {
            return None;
        }
        let event = Self::sample_event(rng, now);
        self.apply(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::DetectionKind;
    use chrono::Duration as ChronoDuration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn emission_rate_matches_probability() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut sim = DetectionSimulator::default();
        let start = Utc::now();
        let ticks = 100_000;
        let mut emitted = 0usize;
        for n in 0..ticks {
            let now = start + ChronoDuration::milliseconds(2_000 * n as i64);
            if sim.tick(&mut rng, now).is_some() {
                emitted += 1;
            }
        }
        let rate = emitted as f64 / ticks as f64;
        assert!((rate - 0.05).abs() < 0.005, "rate {rate}");
        assert!(sim.recent_len() <= RECENT_CAPACITY);
    }

    #[test]
    fn emitted_event_is_applied() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = DetectionSimulator::new(DetectorConfig {
            probability: 1.0,
            ..Default::default()
        });
        let now = Utc::now();
        let event = sim.tick(&mut rng, now).expect("probability 1 always emits");
        assert_eq!(event.kind, DetectionKind::Gunshot);
        assert!((60.0..95.0).contains(&event.confidence));
        assert!((0.0..360.0).contains(&event.direction));
        assert_eq!(event.direction.fract(), 0.0);
        assert_eq!(event.timestamp, now);
        assert_eq!(sim.status(), AlertStatus::Alert);
        assert_eq!(sim.direction(), Some(event.direction));
        assert_eq!(sim.recent().next(), Some(&event));
        assert_eq!(sim.last_processed(), Some(now));
    }

    #[test]
    fn recent_list_is_bounded_newest_first() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut sim = DetectionSimulator::new(DetectorConfig {
            probability: 1.0,
            ..Default::default()
        });
        let start = Utc::now();
        let mut last = None;
        for n in 0..12 {
            let now = start + ChronoDuration::seconds(2 * n);
            last = sim.tick(&mut rng, now);
            assert!(sim.recent_len() <= RECENT_CAPACITY);
        }
        assert_eq!(sim.recent_len(), RECENT_CAPACITY);
        assert_eq!(sim.recent().next(), last.as_ref());
        let stamps: Vec<_> = sim.recent().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn silent_tick_only_touches_last_processed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = DetectionSimulator::new(DetectorConfig {
            probability: 0.0,
            ..Default::default()
        });
        let now = Utc::now();
        assert!(sim.tick(&mut rng, now).is_none());
        assert_eq!(sim.status(), AlertStatus::Safe);
        assert_eq!(sim.recent_len(), 0);
        assert_eq!(sim.last_processed(), Some(now));
    }

    #[test]
    fn clear_alert_resets_status_and_marker_only() {
        let mut sim = DetectionSimulator::default();
        sim.apply(DetectionEvent::gunshot(Utc::now(), 70.0, 12.0));
        sim.clear_alert();
        assert_eq!(sim.status(), AlertStatus::Safe);
        assert_eq!(sim.direction(), None);
        assert_eq!(sim.recent_len(), 1);
        sim.clear_alert();
        assert_eq!(sim.status(), AlertStatus::Safe);
    }
}
