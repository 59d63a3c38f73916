use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gdscore::interface::DetectionHistoryRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for the archived-detection fixture behind the history view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FixtureConfig {
    pub count: usize,
    pub seed: u64,
    /// Records are spread over this many days before the reference instant.
    pub window_days: u32,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            count: 25,
            seed: 0,
            window_days: 7,
        }
    }
}

/// Builds the fixture once, newest record first.
pub fn build_history_fixture(
    config: &FixtureConfig,
    now: DateTime<Utc>,
) -> Vec<DetectionHistoryRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let window_ms = i64::from(config.window_days.max(1)) * 24 * 60 * 60 * 1000;

    let mut records: Vec<DetectionHistoryRecord> = (1..=config.count)
        .map(|n| DetectionHistoryRecord {
            id: format!("detection-{n}"),
            timestamp: now - ChronoDuration::milliseconds(rng.gen_range(0..window_ms)),
            confidence: rng.gen_range(60.0..95.0),
            direction: rng.gen_range(0..360) as f32,
            duration: rng.gen_range(0.5..3.5),
            models_activated: rng.gen_range(1..=3),
            audio_sample: Some(format!("audio-sample-{n}.wav")),
        })
        .collect();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscore::simulation::{query_history, HistoryQuery, HistoryStats};

    #[test]
    fn fixture_builds_expected_records() {
        let now = Utc::now();
        let records = build_history_fixture(&FixtureConfig::default(), now);
        assert_eq!(records.len(), 25);
        assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        for record in &records {
            assert!(record.timestamp <= now);
            assert!(now - record.timestamp < ChronoDuration::days(7));
            assert!((60.0..95.0).contains(&record.confidence));
            assert!((0.0..360.0).contains(&record.direction));
            assert!((0.5..3.5).contains(&record.duration));
            assert!((1..=3).contains(&record.models_activated));
        }
    }

    #[test]
    fn fixture_is_reproducible_for_a_seed() {
        let now = Utc::now();
        let config = FixtureConfig {
            seed: 31,
            ..Default::default()
        };
        assert_eq!(
            build_history_fixture(&config, now),
            build_history_fixture(&config, now)
        );
    }

    #[test]
    fn unfiltered_query_pages_the_whole_fixture() {
        let now = Utc::now();
        let records = build_history_fixture(&FixtureConfig::default(), now);

        let page_one = query_history(&records, &HistoryQuery::default());
        assert_eq!(page_one.total_filtered, 25);
        assert_eq!(page_one.total_pages, 3);
        let ids: Vec<_> = page_one.records.iter().map(|r| r.id.clone()).collect();
        let expected: Vec<_> = records[..10].iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, expected);

        let page_three = query_history(
            &records,
            &HistoryQuery {
                page: 3,
                ..Default::default()
            },
        );
        assert_eq!(page_three.records.len(), 5);
        assert_eq!(page_three.records[4].id, records[24].id);

        let stats = HistoryStats::compute(&records, now);
        assert_eq!(stats.total, 25);
        assert_eq!(stats.this_week, 25);
    }
}
