use crate::interface::{ModelPrediction, ModelStatus};
use crate::prelude::TickModel;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENSEMBLE_INTERVAL: Duration = Duration::from_millis(1000);
pub const ACTIVATION_THRESHOLD: f32 = 50.0;
pub const VOTING_REQUIREMENT: usize = 2;

/// Names and mount-time confidences of the three ensemble members.
pub const DEFAULT_MODELS: [(&str, f32); 3] = [
    ("1D CNN Model", 15.0),
    ("2D CNN 64", 23.0),
    ("2D CNN 128", 18.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    pub activation_threshold: f32,
    pub voting_requirement: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            activation_threshold: ACTIVATION_THRESHOLD,
            voting_requirement: VOTING_REQUIREMENT,
        }
    }
}

/// Quorum vote over independently re-sampled model confidences.
#[derive(Debug, Clone)]
pub struct EnsembleVoting {
    config: EnsembleConfig,
    models: Vec<ModelPrediction>,
    activated: usize,
    score: f32,
}

impl EnsembleVoting {
    pub fn new(config: EnsembleConfig, now: DateTime<Utc>) -> Self {
        let models = DEFAULT_MODELS
            .iter()
            .map(|(name, confidence)| ModelPrediction::new(*name, *confidence, now))
            .collect();
        Self {
            config,
            models,
            activated: 0,
            score: 0.0,
        }
    }

    pub fn config(&self) -> EnsembleConfig {
        self.config
    }

    pub fn set_config(&mut self, config: EnsembleConfig) {
        self.config = config;
    }

    pub fn models(&self) -> &[ModelPrediction] {
        &self.models
    }

    pub fn activated(&self) -> usize {
        self.activated
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_alert(&self) -> bool {
        self.activated >= self.config.voting_requirement
    }

    /// Display score: a high band when the quorum is met, a low band otherwise.
    pub fn ensemble_score<R: Rng + ?Sized>(
        activated: usize,
        requirement: usize,
        rng: &mut R,
    ) -> f32 {
        if activated >= requirement {
            rng.gen_range(85.0..95.0)
        } else {
            rng.gen_range(0.0..30.0)
        }
    }
}

pub fn count_activated(models: &[ModelPrediction], threshold: f32) -> usize {
    models.iter().filter(|m| m.is_activated(threshold)).count()
}

impl TickModel for EnsembleVoting {
    /// Whether the quorum was reached on this tick.
    type Output = bool;

    fn interval(&self) -> Duration {
        ENSEMBLE_INTERVAL
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> bool {
        let threshold = self.config.activation_threshold;
        for model in &mut self.models {
            model.confidence = rng.gen_range(0.0..100.0);
            model.last_update = now;
            model.status = if model.is_activated(threshold) {
                ModelStatus::Active
            } else {
                ModelStatus::Inactive
            };
        }
        self.activated = count_activated(&self.models, threshold);
        self.score = Self::ensemble_score(self.activated, self.config.voting_requirement, rng);
        self.is_alert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mounts_with_three_idle_models() {
        let voting = EnsembleVoting::new(EnsembleConfig::default(), Utc::now());
        assert_eq!(voting.models().len(), 3);
        assert_eq!(voting.activated(), 0);
        assert!(!voting.is_alert());
        assert_eq!(voting.models()[1].name, "2D CNN 64");
    }

    #[test]
    fn score_band_tracks_quorum() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut voting = EnsembleVoting::new(EnsembleConfig::default(), Utc::now());
        let mut saw_alert = false;
        let mut saw_clear = false;
        for _ in 0..2_000 {
            let alert = voting.tick(&mut rng, Utc::now());
            assert_eq!(
                voting.activated(),
                count_activated(voting.models(), ACTIVATION_THRESHOLD)
            );
            assert_eq!(alert, voting.activated() >= 2);
            if alert {
                saw_alert = true;
                assert!((85.0..95.0).contains(&voting.score()));
            } else {
                saw_clear = true;
                assert!((0.0..30.0).contains(&voting.score()));
            }
            for model in voting.models() {
                assert!((0.0..100.0).contains(&model.confidence));
                assert_eq!(model.status == ModelStatus::Active, model.confidence >= 50.0);
            }
        }
        assert!(saw_alert && saw_clear);
    }

    #[test]
    fn activation_is_inclusive_at_threshold() {
        let now = Utc::now();
        let models = vec![
            ModelPrediction::new("a", 50.0, now),
            ModelPrediction::new("b", 49.99, now),
            ModelPrediction::new("c", 100.0, now),
        ];
        assert_eq!(count_activated(&models, 50.0), 2);
    }

    #[test]
    fn custom_requirement_changes_quorum() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = EnsembleConfig {
            activation_threshold: 0.0,
            voting_requirement: 3,
        };
        let mut voting = EnsembleVoting::new(config, Utc::now());
        assert!(voting.tick(&mut rng, Utc::now()));
        assert_eq!(voting.activated(), 3);
    }
}
