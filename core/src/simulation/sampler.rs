use crate::prelude::{SimError, SimResult};
use crate::telemetry::LogManager;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    armed: bool,
}

/// Recurring timer owned by a single view.
///
/// At most one timer is live per sampler: [`start`](Self::start) cancels the
/// previous one before arming. Callbacks run under the slot lock, so once
/// [`stop`](Self::stop) returns no callback is running and none will start.
pub struct PeriodicSampler {
    name: &'static str,
    interval: Duration,
    slot: Arc<Mutex<Slot>>,
    handle: Option<JoinHandle<()>>,
    logger: LogManager,
}

impl PeriodicSampler {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval: interval.max(Duration::from_millis(1)),
            slot: Arc::new(Mutex::new(Slot::default())),
            handle: None,
            logger: LogManager::new("sampler"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.slot.lock().map(|slot| slot.armed).unwrap_or(false)
    }

    /// Arms the sampler on the current tokio runtime, replacing any live timer.
    ///
    /// The first invocation happens one interval after arming.
    pub fn start<F>(&mut self, mut callback: F) -> SimResult<()>
    where
        F: FnMut() + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| SimError::NoRuntime(self.name.into()))?;
        self.stop();

        let generation = {
            let mut slot = self
                .slot
                .lock()
                .map_err(|_| SimError::Internal(format!("{} slot poisoned", self.name)))?;
            slot.generation += 1;
            slot.armed = true;
            slot.generation
        };

        let slot = self.slot.clone();
        let period = self.interval;
        self.handle = Some(runtime.spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Ok(guard) = slot.lock() else { break };
                if !guard.armed || guard.generation != generation {
                    break;
                }
                callback();
            }
        }));
        self.logger
            .trace(&format!("{} armed every {:?}", self.name, self.interval));
        Ok(())
    }

    /// Cancels the live timer. Stopping a stopped sampler is a no-op.
    pub fn stop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            if slot.armed {
                self.logger.trace(&format!("{} stopped", self.name));
            }
            slot.armed = false;
            slot.generation += 1;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for PeriodicSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_fires_once_per_interval() {
        let (count, callback) = counter();
        let mut sampler = PeriodicSampler::new("test", Duration::from_millis(100));
        sampler.start(callback).unwrap();
        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(sampler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn no_invocation_after_stop() {
        let (count, callback) = counter();
        let mut sampler = PeriodicSampler::new("test", Duration::from_millis(50));
        sampler.start(callback).unwrap();
        time::sleep(Duration::from_millis(120)).await;
        sampler.stop();
        let seen = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(!sampler.is_running());
        sampler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_timer() {
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        let mut sampler = PeriodicSampler::new("test", Duration::from_millis(100));
        sampler.start(first_cb).unwrap();
        time::sleep(Duration::from_millis(150)).await;
        sampler.start(second_cb).unwrap();
        time::sleep(Duration::from_millis(1020)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_timer() {
        let (count, callback) = counter();
        {
            let mut sampler = PeriodicSampler::new("test", Duration::from_millis(10));
            sampler.start(callback).unwrap();
        }
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_without_runtime_is_an_error() {
        let mut sampler = PeriodicSampler::new("orphan", Duration::from_millis(10));
        assert_eq!(
            sampler.start(|| {}),
            Err(SimError::NoRuntime("orphan".into()))
        );
        assert!(!sampler.is_running());
    }
}
