pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    pub fn mean(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    /// Number of adjacent pairs whose difference exceeds `threshold` in magnitude.
    pub fn sharp_changes(samples: &[f32], threshold: f32) -> usize {
        samples
            .windows(2)
            .filter(|pair| (pair[1] - pair[0]).abs() > threshold)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        assert_eq!(StatsHelper::rms(&[4.0]), 4.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::mean(&[90.0, 270.0]), 180.0);
    }

    #[test]
    fn sharp_changes_counts_large_steps_only() {
        assert_eq!(StatsHelper::sharp_changes(&[0.0, 0.1, 0.9, 0.8, -0.2], 0.25), 2);
        assert_eq!(StatsHelper::sharp_changes(&[1.0], 0.25), 0);
    }
}
