use crate::workflow::config::WorkflowConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gdscore::interface::{AlertStatus, DetectionEvent};
use gdscore::notify::{LogNotifier, Notifier};
use gdscore::prelude::TickModel;
use gdscore::simulation::{
    AudioFeatures, DetectionSimulator, EnsembleVoting, RadarSweep, ResetPolicy, SystemMetrics,
    WaveformState,
};
use gdscore::telemetry::{LogManager, Metrics, MetricsRecorder};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Base step of the virtual clock; every cadence is a multiple of it.
const STEP_MS: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct TickCounts {
    pub sweep: u64,
    pub waveform: u64,
    pub ensemble: u64,
    pub detection: u64,
    pub metrics: u64,
}

pub struct WorkflowResult {
    pub elapsed: Duration,
    pub ticks: TickCounts,
    pub detections: Vec<DetectionEvent>,
    pub detector: Metrics,
    pub ensemble_alerts: u64,
    pub final_sweep_angle: f32,
    pub final_status: AlertStatus,
    pub final_direction: Option<f32>,
    pub recent: Vec<DetectionEvent>,
    pub features: AudioFeatures,
    pub system: SystemMetrics,
}

impl WorkflowResult {
    pub fn summary(&self) -> String {
        let ticks = &self.ticks;
        format!(
            "elapsed={:?} ticks[sweep={} waveform={} ensemble={} detection={} metrics={}] \
             detections={} resets={} ensemble_alerts={} sweep_angle={} status={:?} direction={:?}",
            self.elapsed,
            ticks.sweep,
            ticks.waveform,
            ticks.ensemble,
            ticks.detection,
            ticks.metrics,
            self.detections.len(),
            self.detector.resets,
            self.ensemble_alerts,
            self.final_sweep_angle,
            self.final_status,
            self.final_direction,
        )
    }
}

/// Next-due bookkeeping for one sampler on the virtual clock.
struct Cadence {
    every_ms: u64,
    next_due_ms: u64,
}

impl Cadence {
    fn new(interval: Duration, armed_at_ms: u64) -> Self {
        let every_ms = (interval.as_millis() as u64).max(STEP_MS);
        Self {
            every_ms,
            next_due_ms: armed_at_ms + every_ms,
        }
    }

    fn due(&mut self, now_ms: u64) -> bool {
        if now_ms >= self.next_due_ms {
            self.next_due_ms += self.every_ms;
            true
        } else {
            false
        }
    }
}

/// Replays every dashboard view against a virtual millisecond clock.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    notifier: Arc<dyn Notifier>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(config: WorkflowConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(&self, start: DateTime<Utc>) -> anyhow::Result<WorkflowResult> {
        self.config.validate()?;
        let logger = LogManager::new("runner");
        let detector_metrics = MetricsRecorder::new();
        let seed = self.config.seed;
        let detector_config = self.config.to_detector_config();
        let reset_delay_ms = detector_config.reset_delay.as_millis() as u64;

        let mut detector = DetectionSimulator::new(detector_config);
        let mut sweep = RadarSweep::new();
        let mut waveform = WaveformState::new(false);
        let mut ensemble = EnsembleVoting::new(self.config.settings.ensemble_config(), start);
        let mut system = SystemMetrics::default();

        let mut detector_rng = StdRng::seed_from_u64(seed);
        let mut waveform_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let mut ensemble_rng = StdRng::seed_from_u64(seed.wrapping_add(2));
        let mut system_rng = StdRng::seed_from_u64(seed.wrapping_add(3));

        let mut detector_cadence = Cadence::new(detector.interval(), 0);
        let mut sweep_cadence = Cadence::new(sweep.interval(), 0);
        let mut waveform_cadence = Cadence::new(waveform.interval(), 0);
        let mut ensemble_cadence = Cadence::new(ensemble.interval(), 0);
        let mut system_cadence = Cadence::new(system.interval(), 0);

        let mut ticks = TickCounts::default();
        let mut detections = Vec::new();
        let mut pending_resets: Vec<u64> = Vec::new();
        let mut ensemble_alerts = 0u64;

        // Mount: the waveform is drawn once before its timer is armed.
        waveform.tick(&mut waveform_rng, start);
        ticks.waveform += 1;

        let end_ms = self.config.duration_secs * 1000;
        let mut now_ms = STEP_MS;
        while now_ms <= end_ms {
            let now = start + ChronoDuration::milliseconds(now_ms as i64);
            let was_alert = detector.status().is_alert();

            let before = pending_resets.len();
            pending_resets.retain(|deadline| *deadline > now_ms);
            for _ in pending_resets.len()..before {
                detector.clear_alert();
                detector_metrics.record_reset();
                logger.trace("alert reset to safe");
            }

            if detector_cadence.due(now_ms) {
                ticks.detection += 1;
                detector_metrics.record_tick();
                if let Some(event) = detector.tick(&mut detector_rng, now) {
                    detector_metrics.record_detection();
                    logger.record(&format!(
                        "detection {} at {}° ({:.1}%)",
                        event.id, event.direction, event.confidence
                    ));
                    self.notifier.notify(event.notification());
                    if self.config.reset_policy == ResetPolicy::Restart {
                        pending_resets.clear();
                    }
                    pending_resets.push(now_ms + reset_delay_ms);
                    detections.push(event);
                }
            }
            sweep.set_detection_angle(detector.direction());

            let is_alert = detector.status().is_alert();
            if is_alert != was_alert {
                // Dependency change: redraw now and re-arm the waveform timer.
                waveform.set_alert(is_alert);
                waveform.tick(&mut waveform_rng, now);
                ticks.waveform += 1;
                waveform_cadence = Cadence::new(waveform.interval(), now_ms);
            } else if waveform_cadence.due(now_ms) {
                waveform.tick(&mut waveform_rng, now);
                ticks.waveform += 1;
            }

            if sweep_cadence.due(now_ms) {
                sweep.tick(&mut detector_rng, now);
                ticks.sweep += 1;
            }
            if ensemble_cadence.due(now_ms) {
                ticks.ensemble += 1;
                if ensemble.tick(&mut ensemble_rng, now) {
                    ensemble_alerts += 1;
                }
            }
            if system_cadence.due(now_ms) {
                system.tick(&mut system_rng, now);
                ticks.metrics += 1;
            }

            now_ms += STEP_MS;
        }

        let result = WorkflowResult {
            elapsed: Duration::from_millis(end_ms),
            ticks,
            detections,
            detector: detector_metrics.snapshot(),
            ensemble_alerts,
            final_sweep_angle: sweep.angle(),
            final_status: detector.status(),
            final_direction: detector.direction(),
            recent: detector.recent().cloned().collect(),
            features: AudioFeatures::extract(
                waveform.samples(),
                self.config.settings.microphones.sample_rate,
            ),
            system,
        };
        logger.record(&result.summary());
        Ok(result)
    }
}
