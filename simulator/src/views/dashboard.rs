use crate::gui_bridge::model::DashboardModel;
use chrono::Utc;
use gdscore::notify::Notifier;
use gdscore::prelude::{SimError, SimResult, TickModel};
use gdscore::settings::Settings;
use gdscore::simulation::detector::DETECTION_INTERVAL;
use gdscore::simulation::radar::SWEEP_INTERVAL;
use gdscore::simulation::waveform::WAVEFORM_INTERVAL;
use gdscore::simulation::{
    DetectionSimulator, DetectorConfig, PeriodicSampler, RadarSweep, ResetPolicy, WaveformState,
};
use gdscore::telemetry::{LogManager, MetricsRecorder};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct DashboardState {
    pub detector: DetectionSimulator,
    pub sweep: RadarSweep,
    pub waveform: WaveformState,
    pub microphone_count: u32,
    detector_rng: StdRng,
    waveform_rng: StdRng,
}

impl DashboardState {
    fn new(config: DetectorConfig, microphone_count: u32, seed: u64) -> Self {
        Self {
            detector: DetectionSimulator::new(config),
            sweep: RadarSweep::new(),
            waveform: WaveformState::new(false),
            microphone_count,
            detector_rng: StdRng::seed_from_u64(seed),
            waveform_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    fn redraw_waveform(&mut self) {
        self.waveform.tick(&mut self.waveform_rng, Utc::now());
    }

    fn clear_alert(&mut self) {
        self.detector.clear_alert();
        self.sweep.set_detection_angle(None);
    }
}

type Shared<T> = Arc<Mutex<T>>;

fn lock<'a, T>(shared: &'a Shared<T>, what: &str) -> SimResult<std::sync::MutexGuard<'a, T>> {
    shared
        .lock()
        .map_err(|_| SimError::Internal(format!("{what} lock poisoned")))
}

/// Read side of the dashboard for the HTTP bridge.
#[derive(Clone)]
pub struct DashboardHandle {
    state: Shared<DashboardState>,
    metrics: Arc<MetricsRecorder>,
}

impl DashboardHandle {
    pub fn snapshot(&self) -> SimResult<DashboardModel> {
        let state = lock(&self.state, "dashboard")?;
        Ok(DashboardModel {
            status: state.detector.status(),
            detection_direction: state.detector.direction(),
            sweep_angle: state.sweep.angle(),
            waveform: state.waveform.samples().to_vec(),
            bar_heights: state.waveform.bar_heights(),
            waveform_alert: state.waveform.alert(),
            recent_detections: state.detector.recent().cloned().collect(),
            last_processed: state.detector.last_processed(),
            microphone_count: state.microphone_count,
            metrics: self.metrics.snapshot(),
        })
    }

    /// Picks up new cooldown and microphone settings; takes effect on the next tick.
    pub fn apply_settings(&self, settings: &Settings) -> SimResult<()> {
        let mut state = lock(&self.state, "dashboard")?;
        let current = state.detector.config();
        let config = settings.detector_config(current.probability, current.reset_policy);
        state.detector.set_config(config);
        state.microphone_count = settings.microphones.microphone_count;
        Ok(())
    }
}

/// Alert header, radar and waveform, driven by three samplers.
///
/// The waveform sampler depends on the alert flag and is re-armed by a
/// watcher task whenever the flag changes.
pub struct DashboardView {
    state: Shared<DashboardState>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<MetricsRecorder>,
    detection_sampler: PeriodicSampler,
    sweep_sampler: PeriodicSampler,
    waveform_sampler: Shared<PeriodicSampler>,
    alert_tx: Arc<watch::Sender<bool>>,
    watcher: Option<JoinHandle<()>>,
    resets: Shared<Vec<JoinHandle<()>>>,
    logger: LogManager,
}

impl DashboardView {
    pub fn new(
        settings: &Settings,
        probability: f64,
        reset_policy: ResetPolicy,
        seed: u64,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let config = settings.detector_config(probability, reset_policy);
        let (alert_tx, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(DashboardState::new(
                config,
                settings.microphones.microphone_count,
                seed,
            ))),
            notifier,
            metrics: Arc::new(MetricsRecorder::new()),
            detection_sampler: PeriodicSampler::new("detection", DETECTION_INTERVAL),
            sweep_sampler: PeriodicSampler::new("sweep", SWEEP_INTERVAL),
            waveform_sampler: Arc::new(Mutex::new(PeriodicSampler::new(
                "waveform",
                WAVEFORM_INTERVAL,
            ))),
            alert_tx: Arc::new(alert_tx),
            watcher: None,
            resets: Arc::new(Mutex::new(Vec::new())),
            logger: LogManager::new("dashboard"),
        }
    }

    pub fn handle(&self) -> DashboardHandle {
        DashboardHandle {
            state: self.state.clone(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.detection_sampler.is_running()
    }

    /// Arms every sampler on the current runtime. Mounting twice re-arms.
    pub fn mount(&mut self) -> SimResult<()> {
        let runtime = Handle::try_current().map_err(|_| SimError::NoRuntime("dashboard".into()))?;
        self.unmount();

        {
            let mut state = lock(&self.state, "dashboard")?;
            state.sweep.reset();
            let alert = state.detector.status().is_alert();
            state.waveform.set_alert(alert);
            state.redraw_waveform();
            publish_alert(&self.alert_tx, alert);
        }

        let state = self.state.clone();
        self.sweep_sampler.start(move || {
            if let Ok(mut state) = state.lock() {
                state.sweep.advance();
            }
        })?;

        arm_waveform(&self.waveform_sampler, &self.state)?;

        let state = self.state.clone();
        let sampler = self.waveform_sampler.clone();
        let mut alert_rx = self.alert_tx.subscribe();
        let logger = self.logger;
        self.watcher = Some(runtime.spawn(async move {
            while alert_rx.changed().await.is_ok() {
                let alert = *alert_rx.borrow_and_update();
                if let Ok(mut state) = state.lock() {
                    state.waveform.set_alert(alert);
                    state.redraw_waveform();
                }
                if let Err(err) = arm_waveform(&sampler, &state) {
                    logger.warn(&format!("waveform re-arm failed: {err}"));
                }
            }
        }));

        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let metrics = self.metrics.clone();
        let alert_tx = self.alert_tx.clone();
        let resets = self.resets.clone();
        let logger = self.logger;
        self.detection_sampler.start(move || {
            metrics.record_tick();
            let (event, config) = {
                let Ok(mut guard) = state.lock() else { return };
                let now = Utc::now();
                let DashboardState {
                    detector,
                    detector_rng,
                    sweep,
                    ..
                } = &mut *guard;
                let event = detector.tick(detector_rng, now);
                sweep.set_detection_angle(detector.direction());
                (event, detector.config())
            };
            let Some(event) = event else { return };

            metrics.record_detection();
            logger.record(&format!(
                "detection {} at {}° ({:.1}%)",
                event.id, event.direction, event.confidence
            ));
            notifier.notify(event.notification());
            publish_alert(&alert_tx, true);

            let reset_state = state.clone();
            let reset_tx = alert_tx.clone();
            let reset_metrics = metrics.clone();
            let task = runtime.spawn(async move {
                tokio::time::sleep(config.reset_delay).await;
                if let Ok(mut state) = reset_state.lock() {
                    state.clear_alert();
                }
                reset_metrics.record_reset();
                publish_alert(&reset_tx, false);
                logger.trace("alert reset to safe");
            });
            if let Ok(mut pending) = resets.lock() {
                if config.reset_policy == ResetPolicy::Restart {
                    for stale in pending.drain(..) {
                        stale.abort();
                    }
                }
                pending.retain(|h| !h.is_finished());
                pending.push(task);
            }
        })?;

        self.logger.record("mounted");
        Ok(())
    }

    /// Releases every timer the view holds, including pending alert resets.
    pub fn unmount(&mut self) {
        let was_mounted = self.is_mounted();
        self.detection_sampler.stop();
        self.sweep_sampler.stop();
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        if let Ok(mut sampler) = self.waveform_sampler.lock() {
            sampler.stop();
        }
        if let Ok(mut pending) = self.resets.lock() {
            for task in pending.drain(..) {
                task.abort();
            }
        }
        if was_mounted {
            self.logger.record("unmounted");
        }
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Notifies the watcher only when the flag actually flips.
fn publish_alert(tx: &watch::Sender<bool>, alert: bool) {
    tx.send_if_modified(|current| {
        if *current == alert {
            false
        } else {
            *current = alert;
            true
        }
    });
}

fn arm_waveform(
    sampler: &Shared<PeriodicSampler>,
    state: &Shared<DashboardState>,
) -> SimResult<()> {
    let state = state.clone();
    lock(sampler, "waveform sampler")?.start(move || {
        if let Ok(mut state) = state.lock() {
            state.redraw_waveform();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscore::interface::AlertStatus;
    use gdscore::notify::NotificationLog;
    use std::time::Duration;
    use tokio::time::sleep;

    fn view(policy: ResetPolicy, cooldown: u32, log: Arc<NotificationLog>) -> DashboardView {
        let mut settings = Settings::default();
        settings.detection.alert_cooldown_secs = cooldown;
        DashboardView::new(&settings, 1.0, policy, 7, log)
    }

    #[tokio::test(start_paused = true)]
    async fn detection_raises_alert_and_rearms_waveform() {
        let log = Arc::new(NotificationLog::default());
        let mut dashboard = view(ResetPolicy::Independent, 10, log.clone());
        let handle = dashboard.handle();
        dashboard.mount().unwrap();

        let idle = handle.snapshot().unwrap();
        assert_eq!(idle.status, AlertStatus::Safe);
        assert_eq!(idle.waveform.len(), 100);
        assert!(!idle.waveform_alert);

        sleep(Duration::from_millis(2_025)).await;
        let model = handle.snapshot().unwrap();
        assert_eq!(model.status, AlertStatus::Alert);
        assert_eq!(model.recent_detections.len(), 1);
        assert_eq!(model.detection_direction, Some(model.recent_detections[0].direction));
        assert!(model.waveform_alert);
        assert_eq!(model.sweep_angle, 80.0);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_reset_clears_newer_detection() {
        let log = Arc::new(NotificationLog::default());
        let mut dashboard = view(ResetPolicy::Independent, 3, log);
        let handle = dashboard.handle();
        dashboard.mount().unwrap();

        sleep(Duration::from_millis(5_025)).await;
        let model = handle.snapshot().unwrap();
        assert_eq!(model.recent_detections.len(), 2);
        assert_eq!(model.status, AlertStatus::Safe);
        assert_eq!(model.detection_direction, None);
        assert!(!model.waveform_alert);
        assert_eq!(model.metrics.resets, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_policy_keeps_alert_while_detections_continue() {
        let log = Arc::new(NotificationLog::default());
        let mut dashboard = view(ResetPolicy::Restart, 3, log);
        let handle = dashboard.handle();
        dashboard.mount().unwrap();

        sleep(Duration::from_millis(5_025)).await;
        let model = handle.snapshot().unwrap();
        assert_eq!(model.status, AlertStatus::Alert);
        assert_eq!(model.metrics.resets, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_releases_all_timers() {
        let log = Arc::new(NotificationLog::default());
        let mut dashboard = view(ResetPolicy::Independent, 10, log.clone());
        let handle = dashboard.handle();
        dashboard.mount().unwrap();
        sleep(Duration::from_millis(2_025)).await;
        dashboard.unmount();
        assert!(!dashboard.is_mounted());

        let frozen = handle.snapshot().unwrap();
        sleep(Duration::from_secs(30)).await;
        let later = handle.snapshot().unwrap();
        assert_eq!(later.sweep_angle, frozen.sweep_angle);
        assert_eq!(later.waveform, frozen.waveform);
        assert_eq!(later.recent_detections.len(), 1);
        // the pending reset died with the view
        assert_eq!(later.status, AlertStatus::Alert);
        assert_eq!(later.metrics.ticks, frozen.metrics.ticks);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn mount_needs_a_runtime() {
        let log = Arc::new(NotificationLog::default());
        let mut dashboard = view(ResetPolicy::Independent, 10, log);
        assert!(matches!(dashboard.mount(), Err(SimError::NoRuntime(_))));
    }
}
