use crate::gui_bridge::model::MonitorModel;
use chrono::Utc;
use gdscore::prelude::{SimError, SimResult, TickModel};
use gdscore::settings::Settings;
use gdscore::simulation::ensemble::ENSEMBLE_INTERVAL;
use gdscore::simulation::{AudioFeatures, EnsembleVoting, PeriodicSampler, SignalGenerator};
use gdscore::telemetry::{LogManager, MetricsRecorder};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex};

struct MonitorState {
    ensemble: EnsembleVoting,
    generator: SignalGenerator,
    features: AudioFeatures,
    sample_rate: u32,
    rng: StdRng,
}

impl MonitorState {
    fn tick(&mut self) -> bool {
        let now = Utc::now();
        let alert = self.ensemble.tick(&mut self.rng, now);
        let trace = self.generator.generate(alert, &mut self.rng);
        self.features = AudioFeatures::extract(&trace, self.sample_rate);
        alert
    }
}

#[derive(Clone)]
pub struct MonitorHandle {
    state: Arc<Mutex<MonitorState>>,
}

impl MonitorHandle {
    pub fn snapshot(&self) -> SimResult<MonitorModel> {
        let state = self
            .state
            .lock()
            .map_err(|_| SimError::Internal("monitor lock poisoned".into()))?;
        let config = state.ensemble.config();
        Ok(MonitorModel {
            models: state.ensemble.models().to_vec(),
            activated: state.ensemble.activated(),
            required: config.voting_requirement,
            threshold: config.activation_threshold,
            score: state.ensemble.score(),
            alert: state.ensemble.is_alert(),
            features: state.features,
        })
    }

    pub fn apply_settings(&self, settings: &Settings) -> SimResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SimError::Internal("monitor lock poisoned".into()))?;
        state.ensemble.set_config(settings.ensemble_config());
        state.sample_rate = settings.microphones.sample_rate;
        Ok(())
    }
}

/// Live monitor: the ensemble vote, re-sampled once a second.
pub struct MonitorView {
    state: Arc<Mutex<MonitorState>>,
    sampler: PeriodicSampler,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl MonitorView {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MonitorState {
                ensemble: EnsembleVoting::new(settings.ensemble_config(), Utc::now()),
                generator: SignalGenerator::default(),
                features: AudioFeatures::default(),
                sample_rate: settings.microphones.sample_rate,
                rng: StdRng::seed_from_u64(seed),
            })),
            sampler: PeriodicSampler::new("ensemble", ENSEMBLE_INTERVAL),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("monitor"),
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            state: self.state.clone(),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.metrics.snapshot().ticks
    }

    pub fn mount(&mut self) -> SimResult<()> {
        let state = self.state.clone();
        let metrics = self.metrics.clone();
        let logger = self.logger;
        self.sampler.start(move || {
            metrics.record_tick();
            if let Ok(mut state) = state.lock() {
                if state.tick() {
                    logger.trace("ensemble quorum reached");
                }
            }
        })?;
        self.logger.record("mounted");
        Ok(())
    }

    pub fn unmount(&mut self) {
        if self.sampler.is_running() {
            self.logger.record("unmounted");
        }
        self.sampler.stop();
    }
}

impl Drop for MonitorView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn monitor_resamples_every_second() {
        let mut monitor = MonitorView::new(&Settings::default(), 3);
        let handle = monitor.handle();
        let idle = handle.snapshot().unwrap();
        assert_eq!(idle.models[0].confidence, 15.0);
        assert_eq!(idle.activated, 0);

        monitor.mount().unwrap();
        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(monitor.ticks(), 3);
        let model = handle.snapshot().unwrap();
        assert_eq!(model.required, 2);
        assert_eq!(model.alert, model.activated >= 2);
        if model.alert {
            assert!((85.0..95.0).contains(&model.score));
        } else {
            assert!((0.0..30.0).contains(&model.score));
        }
        assert!(model.features.volume > 0.0);

        monitor.unmount();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(monitor.ticks(), 3);
    }

    #[test]
    fn settings_change_quorum() {
        let monitor = MonitorView::new(&Settings::default(), 3);
        let mut settings = Settings::default();
        settings.detection.ensemble_voting = 3;
        settings.detection.confidence_threshold = 70;
        monitor.handle().apply_settings(&settings).unwrap();
        let model = monitor.handle().snapshot().unwrap();
        assert_eq!(model.required, 3);
        assert_eq!(model.threshold, 70.0);
    }
}
