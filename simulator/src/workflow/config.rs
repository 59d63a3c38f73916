use crate::generator::fixture::FixtureConfig;
use anyhow::Context;
use gdscore::settings::Settings;
use gdscore::simulation::detector::DETECTION_PROBABILITY;
use gdscore::simulation::{DetectorConfig, ResetPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub seed: u64,
    pub duration_secs: u64,
    pub detection_probability: f64,
    pub reset_policy: ResetPolicy,
    pub history: FixtureConfig,
    pub settings: Settings,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            duration_secs: 60,
            detection_probability: DETECTION_PROBABILITY,
            reset_policy: ResetPolicy::Independent,
            history: FixtureConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(seed: u64, duration_secs: u64) -> Self {
        Self {
            seed,
            duration_secs,
            history: FixtureConfig {
                seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.detection_probability) {
            anyhow::bail!(
                "detection_probability {} outside 0..=1",
                self.detection_probability
            );
        }
        self.settings
            .validate()
            .context("validating workflow settings")?;
        Ok(())
    }

    pub fn to_detector_config(&self) -> DetectorConfig {
        self.settings
            .detector_config(self.detection_probability, self.reset_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_seeds_fixture() {
        let cfg = WorkflowConfig::from_args(9, 30);
        assert_eq!(cfg.history.seed, 9);
        assert_eq!(cfg.to_detector_config().reset_delay, Duration::from_secs(10));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        let yaml = "\
seed: 3
duration_secs: 120
reset_policy: restart
settings:
  detection:
    alert_cooldown_secs: 4
";
        temp.write_all(yaml.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, 3);
        assert_eq!(cfg.reset_policy, ResetPolicy::Restart);
        assert_eq!(cfg.to_detector_config().reset_delay, Duration::from_secs(4));
        assert_eq!(cfg.history.count, 25);
    }

    #[test]
    fn config_load_rejects_out_of_range_settings() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"settings:\n  microphones:\n    microphone_count: 12\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
