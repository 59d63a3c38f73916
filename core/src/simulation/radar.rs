use crate::prelude::TickModel;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SWEEP_INTERVAL: Duration = Duration::from_millis(50);
pub const SWEEP_STEP_DEG: f32 = 2.0;

/// Rotating sweep plus an optional fixed detection marker.
///
/// The marker is set from outside and is never derived from the sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarSweep {
    angle: f32,
    detection_angle: Option<f32>,
}

impl RadarSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + SWEEP_STEP_DEG) % 360.0;
        self.angle
    }

    /// Back to the mount state: angle 0, no marker.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn detection_angle(&self) -> Option<f32> {
        self.detection_angle
    }

    pub fn set_detection_angle(&mut self, angle: Option<f32>) {
        self.detection_angle = angle.map(|a| a.rem_euclid(360.0));
    }
}

impl TickModel for RadarSweep {
    type Output = f32;

    fn interval(&self) -> Duration {
        SWEEP_INTERVAL
    }

    fn tick<R: Rng + ?Sized>(&mut self, _rng: &mut R, _now: DateTime<Utc>) -> f32 {
        self.advance()
    }
}

/// Screen position of a bearing on a radar whose 0° points up, clockwise.
pub fn polar_to_screen(center: (f32, f32), radius: f32, degrees: f32) -> (f32, f32) {
    let radians = (degrees - 90.0).to_radians();
    (
        center.0 + radius * radians.cos(),
        center.1 + radius * radians.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_after_n_ticks_is_two_n_mod_360() {
        let mut sweep = RadarSweep::new();
        for n in 1..=1000u32 {
            sweep.advance();
            assert_eq!(sweep.angle(), ((2 * n) % 360) as f32, "tick {n}");
        }
    }

    #[test]
    fn sweep_stays_in_range_and_reset_zeroes() {
        let mut sweep = RadarSweep::new();
        for _ in 0..181 {
            let angle = sweep.advance();
            assert!((0.0..360.0).contains(&angle));
        }
        assert_eq!(sweep.angle(), 2.0);
        sweep.set_detection_angle(Some(90.0));
        sweep.reset();
        assert_eq!(sweep.angle(), 0.0);
        assert_eq!(sweep.detection_angle(), None);
    }

    #[test]
    fn marker_is_independent_of_sweep() {
        let mut sweep = RadarSweep::new();
        assert_eq!(sweep.detection_angle(), None);
        sweep.set_detection_angle(Some(-90.0));
        sweep.advance();
        assert_eq!(sweep.detection_angle(), Some(270.0));
        sweep.set_detection_angle(None);
        assert_eq!(sweep.detection_angle(), None);
    }

    #[test]
    fn projection_points_north_up() {
        let (x, y) = polar_to_screen((150.0, 150.0), 120.0, 0.0);
        assert!((x - 150.0).abs() < 1e-3);
        assert!((y - 30.0).abs() < 1e-3);
        let (x, y) = polar_to_screen((150.0, 150.0), 120.0, 90.0);
        assert!((x - 270.0).abs() < 1e-3);
        assert!((y - 150.0).abs() < 1e-3);
    }
}
