use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::config::DegradationConfig;
use crate::types::DegradationModel;

/// Median, averaging the two middle values for even lengths. 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Least-squares line through `(i, ys[i])`. Returns `(slope, intercept)`.
fn linear_fit(ys: &[f64]) -> Option<(f64, f64)> {
    let n = ys.len();
    let x = Array2::from_shape_vec((n, 1), (0..n).map(|i| i as f64).collect()).ok()?;
    let y = Array1::from_vec(ys.to_vec());
    let ds = Dataset::new(x, y);

    match LinearRegression::new().fit(&ds) {
        Ok(fitted) => Some((fitted.params()[0], fitted.intercept())),
        Err(e) => {
            tracing::warn!(laps = n, "degradation fit failed: {}", e);
            None
        }
    }
}

/// Fit a linear wear trend to one vehicle's lap times (seconds, lap order).
///
/// Laps outside the configured band around the median (pit in/out, safety
/// car, incidents) are dropped before fitting. The x axis is the position
/// within the kept laps, not the original lap number.
pub fn estimate(cfg: &DegradationConfig, lap_times: &[f64]) -> DegradationModel {
    if lap_times.len() < cfg.min_laps {
        tracing::debug!(laps = lap_times.len(), "not enough laps for a degradation model");
        return DegradationModel::empty();
    }

    let med = median(lap_times);
    let (lo, hi) = (med * cfg.outlier_low, med * cfg.outlier_high);
    let filtered: Vec<f64> = lap_times
        .iter()
        .copied()
        .filter(|t| *t > lo && *t < hi)
        .collect();

    if filtered.len() < cfg.min_filtered_laps {
        tracing::debug!(
            laps = lap_times.len(),
            kept = filtered.len(),
            "too few clean laps after outlier filter"
        );
        return DegradationModel {
            rate_per_lap: 0.0,
            raw_laps: lap_times.to_vec(),
            trend_coefficients: None,
        };
    }

    let Some((slope, intercept)) = linear_fit(&filtered) else {
        return DegradationModel {
            rate_per_lap: 0.0,
            raw_laps: lap_times.to_vec(),
            trend_coefficients: None,
        };
    };
    tracing::debug!(
        laps = lap_times.len(),
        kept = filtered.len(),
        slope,
        intercept,
        "fitted degradation trend"
    );

    DegradationModel {
        rate_per_lap: slope,
        raw_laps: lap_times.to_vec(),
        trend_coefficients: Some([slope, intercept]),
    }
}
