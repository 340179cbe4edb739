use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::ConfigError;

/// One fixed pit lap the evaluator may offer, gated on race progress.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CandidateStrategy {
    pub pit_lap: u32,
    /// Only offered while `current_lap <= latest_current_lap`.
    pub latest_current_lap: u32,
    pub name: String,
}

impl CandidateStrategy {
    fn new(pit_lap: u32, latest_current_lap: u32, name: &str) -> Self {
        Self {
            pit_lap,
            latest_current_lap,
            name: name.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DegradationConfig {
    pub min_laps: usize,
    pub min_filtered_laps: usize,
    pub outlier_low: f64,
    pub outlier_high: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            min_laps: 5,
            min_filtered_laps: 3,
            outlier_low: 0.8,
            outlier_high: 1.2,
        }
    }
}

/// Tuning for a circuit/format. Immutable once loaded and passed into every call.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    pub pit_stop_time_s: f64,
    pub tire_cliff_threshold: f64,
    pub fresh_tire_bonus_s: f64,
    pub fresh_tire_wear_factor: f64,
    pub fallback_lap_time_s: f64,
    pub base_lap_window: usize,
    pub undercut_margin_s: f64,
    pub critical_multiplier: f64,
    pub performance_cliff_s: f64,
    pub default_total_laps: u32,
    pub degradation: DegradationConfig,
    pub candidates: Vec<CandidateStrategy>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            pit_stop_time_s: 45.0,
            tire_cliff_threshold: 0.5,
            fresh_tire_bonus_s: 2.0,
            fresh_tire_wear_factor: 0.3,
            fallback_lap_time_s: 150.0,
            base_lap_window: 5,
            undercut_margin_s: 5.0,
            critical_multiplier: 1.5,
            performance_cliff_s: 3.0,
            default_total_laps: 17,
            degradation: DegradationConfig::default(),
            candidates: vec![
                CandidateStrategy::new(6, 5, "Early Undercut"),
                CandidateStrategy::new(10, 9, "Standard Strategy"),
                CandidateStrategy::new(14, 13, "Long First Stint"),
            ],
        }
    }
}

impl StrategyConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pit_stop_time_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pit_stop_time_s must be positive, got {}",
                self.pit_stop_time_s
            )));
        }
        if !(self.fresh_tire_wear_factor > 0.0 && self.fresh_tire_wear_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fresh_tire_wear_factor must be in (0, 1], got {}",
                self.fresh_tire_wear_factor
            )));
        }
        let d = &self.degradation;
        if d.min_laps < 1 || d.min_filtered_laps < 2 {
            return Err(ConfigError::Invalid(format!(
                "degradation needs min_laps >= 1 and min_filtered_laps >= 2, got {} and {}",
                d.min_laps, d.min_filtered_laps
            )));
        }
        if !(d.outlier_low > 0.0 && d.outlier_low < 1.0 && d.outlier_high > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "outlier band ({}, {}) must bracket 1.0",
                d.outlier_low, d.outlier_high
            )));
        }
        if self.base_lap_window == 0 {
            return Err(ConfigError::Invalid("base_lap_window must be at least 1".into()));
        }
        if self.candidates.is_empty() {
            return Err(ConfigError::Invalid("no candidate strategies configured".into()));
        }
        Ok(())
    }

    /// Degradation rate above which the car must stop this lap.
    pub fn critical_rate(&self) -> f64 {
        self.tire_cliff_threshold * self.critical_multiplier
    }

    /// Gap to the car behind that lets us stop and rejoin ahead.
    pub fn undercut_gap(&self) -> f64 {
        self.pit_stop_time_s + self.undercut_margin_s
    }
}
