use crate::math::{FftHelper, StatsHelper};
use crate::prelude::TickModel;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const WAVEFORM_INTERVAL: Duration = Duration::from_millis(100);
pub const WAVEFORM_LEN: usize = 100;
pub const BAR_COUNT: usize = 20;
pub const BAR_STRIDE: usize = 5;
pub const BAR_SCALE: f32 = 60.0;
pub const BAR_OFFSET: f32 = 5.0;
/// Adjacent-sample jump that counts as a sharp change.
pub const SHARP_CHANGE_THRESHOLD: f32 = 0.25;

/// Fake audio trace shaped by the alert flag.
#[derive(Debug, Clone, Copy)]
pub struct SignalGenerator {
    length: usize,
}

impl SignalGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Deterministic part of sample `i`; `noise` is drawn from [-0.5, 0.5).
    pub fn sample(index: usize, alert: bool, noise: f32) -> f32 {
        let i = index as f32;
        if alert {
            (i * 0.2).sin() * 0.8 + (i * 0.1).sin() * 0.4 + noise * 0.6
        } else {
            (i * 0.1).sin() * 0.2 + noise * 0.1
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, alert: bool, rng: &mut R) -> Vec<f32> {
        (0..self.length)
            .map(|i| Self::sample(i, alert, rng.gen::<f32>() - 0.5))
            .collect()
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new(WAVEFORM_LEN)
    }
}

/// Latest waveform plus the flag it was generated under.
#[derive(Debug, Clone, Default)]
pub struct WaveformState {
    generator: SignalGenerator,
    alert: bool,
    samples: Vec<f32>,
}

impl WaveformState {
    pub fn new(alert: bool) -> Self {
        Self {
            generator: SignalGenerator::default(),
            alert,
            samples: Vec::new(),
        }
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    pub fn set_alert(&mut self, alert: bool) {
        self.alert = alert;
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn bar_heights(&self) -> Vec<f32> {
        bar_heights(&self.samples)
    }
}

impl TickModel for WaveformState {
    type Output = ();

    fn interval(&self) -> Duration {
        WAVEFORM_INTERVAL
    }

    /// Replaces the whole trace.
    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, _now: DateTime<Utc>) {
        self.samples = self.generator.generate(self.alert, rng);
    }
}

/// Maps samples onto a `width` x `height` plot centred vertically.
pub fn plot_points(samples: &[f32], width: f32, height: f32) -> Vec<(f32, f32)> {
    let center = height / 2.0;
    let scale = height / 3.0;
    let span = samples.len().saturating_sub(1).max(1) as f32;
    samples
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f32 / span * width, center + v * scale))
        .collect()
}

/// Heights of the level bars: every fifth sample, `|v| * 60 + 5`.
pub fn bar_heights(samples: &[f32]) -> Vec<f32> {
    (0..BAR_COUNT)
        .map(|i| {
            let value = samples.get(i * BAR_STRIDE).copied().unwrap_or(0.0);
            value.abs() * BAR_SCALE + BAR_OFFSET
        })
        .collect()
}

/// Summary features shown next to the live monitor gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub volume: f32,
    pub dominant_frequency_hz: f32,
    pub sharp_changes: usize,
}

impl AudioFeatures {
    pub fn extract(samples: &[f32], sample_rate_hz: u32) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let size = samples.len().next_power_of_two();
        let fft = FftHelper::new(size);
        let dominant_frequency_hz = fft
            .peak_bin(samples)
            .map(|bin| bin as f32 * sample_rate_hz as f32 / size as f32)
            .unwrap_or(0.0);
        Self {
            volume: StatsHelper::rms(samples),
            dominant_frequency_hz,
            sharp_changes: StatsHelper::sharp_changes(samples, SHARP_CHANGE_THRESHOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn quiet_trace_stays_within_noise_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = SignalGenerator::default().generate(false, &mut rng);
        assert_eq!(samples.len(), WAVEFORM_LEN);
        for (i, v) in samples.iter().enumerate() {
            let residual = v - (i as f32 * 0.1).sin() * 0.2;
            assert!((-0.0501..=0.0501).contains(&residual), "sample {i}: {residual}");
        }
    }

    #[test]
    fn alert_trace_stays_within_noise_band() {
        let mut rng = StdRng::seed_from_u64(11);
        let samples = SignalGenerator::default().generate(true, &mut rng);
        for (i, v) in samples.iter().enumerate() {
            let x = i as f32;
            let residual = v - ((x * 0.2).sin() * 0.8 + (x * 0.1).sin() * 0.4);
            assert!((-0.3001..=0.3001).contains(&residual), "sample {i}: {residual}");
        }
    }

    #[test]
    fn tick_replaces_whole_trace() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = WaveformState::new(false);
        assert!(state.samples().is_empty());
        state.tick(&mut rng, Utc::now());
        let first = state.samples().to_vec();
        state.set_alert(true);
        state.tick(&mut rng, Utc::now());
        assert_eq!(state.samples().len(), WAVEFORM_LEN);
        assert_ne!(first, state.samples());
    }

    #[test]
    fn bar_heights_sample_every_fifth_value() {
        let mut samples = vec![0.0; WAVEFORM_LEN];
        samples[5] = -0.5;
        samples[95] = 1.0;
        let bars = bar_heights(&samples);
        assert_eq!(bars.len(), BAR_COUNT);
        assert_eq!(bars[0], 5.0);
        assert_eq!(bars[1], 35.0);
        assert_eq!(bars[19], 65.0);
        assert_eq!(bar_heights(&[]), vec![5.0; BAR_COUNT]);
    }

    #[test]
    fn plot_points_span_the_width() {
        let points = plot_points(&[0.0, 0.3, -0.3], 400.0, 200.0);
        assert_eq!(points[0], (0.0, 100.0));
        assert_eq!(points[2].0, 400.0);
        assert!((points[1].1 - 120.0).abs() < 1e-3);
        assert!((points[2].1 - 80.0).abs() < 1e-3);
    }

    #[test]
    fn alert_trace_has_higher_pitch_and_volume() {
        let quiet: Vec<f32> = (0..WAVEFORM_LEN)
            .map(|i| SignalGenerator::sample(i, false, 0.0))
            .collect();
        let loud: Vec<f32> = (0..WAVEFORM_LEN)
            .map(|i| SignalGenerator::sample(i, true, 0.0))
            .collect();
        let quiet = AudioFeatures::extract(&quiet, 44_100);
        let loud = AudioFeatures::extract(&loud, 44_100);
        assert!(loud.volume > quiet.volume);
        assert!(loud.dominant_frequency_hz > quiet.dominant_frequency_hz);
        assert_eq!(AudioFeatures::extract(&[], 44_100), AudioFeatures::default());
    }
}
