use serde::{Deserialize, Serialize};

use crate::types::LapTime;

/// Lap record as supplied by the timing feed. Timing exports carry the lap
/// time either in seconds or as a raw millisecond `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap: u32,
    #[serde(default)]
    pub lap_time_seconds: Option<f64>,
    /// Lap time in milliseconds
    #[serde(default)]
    pub value: Option<f64>,
}

impl LapRecord {
    /// Duration in seconds, if the record holds a usable one.
    pub fn seconds(&self) -> Option<f64> {
        let secs = match (self.lap_time_seconds, self.value) {
            (Some(s), _) => s,
            (None, Some(ms)) => ms / 1000.0,
            (None, None) => return None,
        };
        (secs.is_finite() && secs > 0.0).then_some(secs)
    }
}

/// Sanitised, lap-ordered times for one vehicle.
pub struct LapSeries {
    laps: Vec<LapTime>,
}

impl LapSeries {
    /// Build a series from raw records.
    ///
    /// Records with a missing, non-finite or non-positive time are dropped,
    /// lap 0 (formation) is dropped, and the rest are sorted by lap number.
    /// Duplicate lap numbers are kept in feed order.
    pub fn from_records(records: &[LapRecord]) -> Self {
        let mut laps: Vec<LapTime> = records
            .iter()
            .filter(|r| r.lap >= 1)
            .filter_map(|r| {
                r.seconds().map(|duration_seconds| LapTime {
                    lap_number: r.lap,
                    duration_seconds,
                })
            })
            .collect();

        let dropped = records.len() - laps.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = laps.len(), "dropped unusable lap records");
        }

        // stable, so duplicates keep feed order
        laps.sort_by_key(|l| l.lap_number);
        Self { laps }
    }

    pub fn laps(&self) -> &[LapTime] {
        &self.laps
    }

    /// Durations in seconds, in lap order.
    pub fn seconds(&self) -> Vec<f64> {
        self.laps.iter().map(|l| l.duration_seconds).collect()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}

/// Field-wide average of positive degradation rates; 0 when no car is wearing.
pub fn average_degradation(rates: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = rates
        .into_iter()
        .filter(|r| *r > 0.0)
        .fold((0.0, 0usize), |(s, n), r| (s + r, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
