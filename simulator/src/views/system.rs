use crate::gui_bridge::model::{RosterEntry, SystemModel};
use chrono::Utc;
use gdscore::prelude::{SimError, SimResult, TickModel};
use gdscore::simulation::system::{METRICS_INTERVAL, MODEL_ROSTER};
use gdscore::simulation::{startup_log, PeriodicSampler, SystemLogEntry, SystemMetrics};
use gdscore::telemetry::LogManager;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex};

struct SystemState {
    metrics: SystemMetrics,
    logs: Vec<SystemLogEntry>,
    rng: StdRng,
}

#[derive(Clone)]
pub struct SystemHandle {
    state: Arc<Mutex<SystemState>>,
}

impl SystemHandle {
    pub fn snapshot(&self) -> SimResult<SystemModel> {
        let state = self
            .state
            .lock()
            .map_err(|_| SimError::Internal("system lock poisoned".into()))?;
        Ok(SystemModel {
            metrics: state.metrics,
            uptime: state.metrics.uptime_label(),
            roster: MODEL_ROSTER
                .iter()
                .map(|(name, accuracy)| RosterEntry {
                    name: (*name).into(),
                    accuracy: *accuracy,
                    status: "running".into(),
                })
                .collect(),
            logs: state.logs.clone(),
        })
    }
}

/// Host health page, random-walked every five seconds.
pub struct SystemView {
    state: Arc<Mutex<SystemState>>,
    sampler: PeriodicSampler,
    logger: LogManager,
}

impl SystemView {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SystemState {
                metrics: SystemMetrics::default(),
                logs: startup_log(Utc::now()),
                rng: StdRng::seed_from_u64(seed),
            })),
            sampler: PeriodicSampler::new("system", METRICS_INTERVAL),
            logger: LogManager::new("system"),
        }
    }

    pub fn handle(&self) -> SystemHandle {
        SystemHandle {
            state: self.state.clone(),
        }
    }

    pub fn mount(&mut self) -> SimResult<()> {
        let state = self.state.clone();
        self.sampler.start(move || {
            if let Ok(mut guard) = state.lock() {
                let SystemState { metrics, rng, .. } = &mut *guard;
                metrics.tick(rng, Utc::now());
            }
        })?;
        self.logger.record("mounted");
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.sampler.stop();
    }
}

impl Drop for SystemView {
    fn drop(&mut self) {
        self.unmount();
    }
}
