use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapTime {
    pub lap_number: u32,
    pub duration_seconds: f64,
}

/// Linear wear trend fitted over a vehicle's clean laps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationModel {
    /// Seconds added per lap. Zero or negative means flat or improving pace.
    pub rate_per_lap: f64,
    pub raw_laps: Vec<f64>,
    /// `[slope, intercept]` of the fit, absent when there was not enough signal.
    pub trend_coefficients: Option<[f64; 2]>,
}

impl DegradationModel {
    pub fn empty() -> Self {
        Self {
            rate_per_lap: 0.0,
            raw_laps: Vec::new(),
            trend_coefficients: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub identifier: String,
    #[serde(default)]
    pub estimated_total_time: Option<f64>, // seconds over the full race distance
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default = "default_air_temp")]
    pub air_temp: f64,
    #[serde(default = "default_track_temp")]
    pub track_temp: f64,
    #[serde(default = "default_humidity")]
    pub humidity: f64,
    #[serde(default = "default_wind_speed")]
    pub wind_speed: f64,
}

fn default_air_temp() -> f64 {
    25.0
}
fn default_track_temp() -> f64 {
    35.0
}
fn default_humidity() -> f64 {
    50.0
}
fn default_wind_speed() -> f64 {
    10.0
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            air_temp: default_air_temp(),
            track_temp: default_track_temp(),
            humidity: default_humidity(),
            wind_speed: default_wind_speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitWindow {
    pub pit_lap: u32,
    pub lap_start: u32,
    pub lap_end: u32,
    pub time_loss_seconds: f64,
    pub projected_race_time: f64,
    pub predicted_position: u32,
    pub confidence: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelPlan {
    pub fuel_needed: f64,
    pub current_fuel: f64,
    pub margin: f64,
    pub laps_remaining: u32,
    pub can_finish: bool,
    pub fuel_save_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PitReason {
    CriticalDegradation,
    UndercutOpportunity,
    WeatherChange,
    PerformanceCliff,
    ContinueStint,
}

impl PitReason {
    pub fn label(self) -> &'static str {
        match self {
            PitReason::CriticalDegradation => "critical degradation",
            PitReason::UndercutOpportunity => "undercut opportunity",
            PitReason::WeatherChange => "weather change",
            PitReason::PerformanceCliff => "performance cliff",
            PitReason::ContinueStint => "continue stint",
        }
    }

    /// Message shown to the pit wall.
    pub fn message(self) -> &'static str {
        match self {
            PitReason::CriticalDegradation => "CRITICAL: Tire degradation exceeding safe limits",
            PitReason::UndercutOpportunity => "OPPORTUNITY: Gap sufficient for undercut",
            PitReason::WeatherChange => "WEATHER: Conditions changing, pit recommended",
            PitReason::PerformanceCliff => "PERFORMANCE: Lap times degrading significantly",
            PitReason::ContinueStint => "Continue current stint",
        }
    }
}

impl fmt::Display for PitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitDecision {
    pub pit_now: bool,
    pub reason: PitReason,
}
