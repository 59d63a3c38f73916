use crate::interface::{CompassDirection, ConfidenceBand, DetectionHistoryRecord};
use crate::math::StatsHelper;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl ConfidenceFilter {
    pub fn matches(self, confidence: f32) -> bool {
        let band = ConfidenceBand::from_confidence(confidence);
        match self {
            ConfidenceFilter::All => true,
            ConfidenceFilter::High => band == ConfidenceBand::High,
            ConfidenceFilter::Medium => band == ConfidenceBand::Medium,
            ConfidenceFilter::Low => band == ConfidenceBand::Low,
        }
    }
}

impl FromStr for ConfidenceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ConfidenceFilter::All),
            "high" => Ok(ConfidenceFilter::High),
            "medium" => Ok(ConfidenceFilter::Medium),
            "low" => Ok(ConfidenceFilter::Low),
            other => Err(format!("unknown confidence filter {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFilter {
    #[default]
    All,
    North,
    East,
    South,
    West,
}

impl DirectionFilter {
    pub fn matches(self, direction: f32) -> bool {
        let compass = CompassDirection::from_degrees(direction);
        match self {
            DirectionFilter::All => true,
            DirectionFilter::North => compass == CompassDirection::North,
            DirectionFilter::East => compass == CompassDirection::East,
            DirectionFilter::South => compass == CompassDirection::South,
            DirectionFilter::West => compass == CompassDirection::West,
        }
    }
}

impl FromStr for DirectionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DirectionFilter::All),
            "north" => Ok(DirectionFilter::North),
            "east" => Ok(DirectionFilter::East),
            "south" => Ok(DirectionFilter::South),
            "west" => Ok(DirectionFilter::West),
            other => Err(format!("unknown direction filter {other:?}")),
        }
    }
}

/// Search term, filters and a 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub search: String,
    pub confidence: ConfidenceFilter,
    pub direction: DirectionFilter,
    pub page: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            confidence: ConfidenceFilter::All,
            direction: DirectionFilter::All,
            page: 1,
        }
    }
}

impl HistoryQuery {
    pub fn matches(&self, record: &DetectionHistoryRecord) -> bool {
        self.matches_search(record)
            && self.confidence.matches(record.confidence)
            && self.direction.matches(record.direction)
    }

    fn matches_search(&self, record: &DetectionHistoryRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        record
            .id
            .to_lowercase()
            .contains(&self.search.to_lowercase())
            || record.date_label().contains(&self.search)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage<'a> {
    pub records: Vec<&'a DetectionHistoryRecord>,
    pub page: usize,
    pub total_filtered: usize,
    pub total_pages: usize,
}

/// Filters `records` by `query` and cuts out the requested page.
///
/// Page 0 is read as page 1; pages past the end come back empty.
pub fn query_history<'a>(
    records: &'a [DetectionHistoryRecord],
    query: &HistoryQuery,
) -> HistoryPage<'a> {
    let filtered: Vec<&DetectionHistoryRecord> =
        records.iter().filter(|r| query.matches(r)).collect();
    let total_filtered = filtered.len();
    let total_pages = total_filtered.div_ceil(PAGE_SIZE);
    let page = query.page.max(1);
    let records = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .collect();
    HistoryPage {
        records,
        page,
        total_filtered,
        total_pages,
    }
}

/// Summary cards above the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub high_confidence: usize,
    pub average_direction: Option<i32>,
    pub this_week: usize,
    pub most_common: Option<CompassDirection>,
}

impl HistoryStats {
    pub fn compute(records: &[DetectionHistoryRecord], now: DateTime<Utc>) -> Self {
        let directions: Vec<f32> = records.iter().map(|r| r.direction).collect();
        let week_ago = now - ChronoDuration::days(7);
        let most_common = CompassDirection::ALL
            .iter()
            .map(|c| (*c, records.iter().filter(|r| r.compass() == *c).count()))
            .filter(|(_, n)| *n > 0)
            .fold(None, |best: Option<(CompassDirection, usize)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(c, _)| c);
        Self {
            total: records.len(),
            high_confidence: records
                .iter()
                .filter(|r| r.band() == ConfidenceBand::High)
                .count(),
            average_direction: (!records.is_empty())
                .then(|| StatsHelper::mean(&directions).round() as i32),
            this_week: records.iter().filter(|r| r.timestamp > week_ago).count(),
            most_common,
        }
    }
}
