use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::config::StrategyConfig;
use crate::error::RequestError;
use crate::laps::{average_degradation, LapRecord, LapSeries};
use crate::pit_window::RaceState;
use crate::types::{Competitor, DegradationModel, FuelPlan, PitReason, PitWindow, WeatherSnapshot};
use crate::{decision, degradation, fuel, pit_window};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<StrategyConfig>,
}

pub type ApiError = (StatusCode, Json<serde_json::Value>);

impl From<RequestError> for (StatusCode, Json<serde_json::Value>) {
    fn from(e: RequestError) -> Self {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
    }
}

// ---------- Request/Response types ----------

#[derive(Deserialize, Debug)]
pub struct DegradationRequest {
    pub vehicle_id: String,
    pub laps: Vec<LapRecord>,
}

#[derive(Serialize, Debug)]
pub struct DegradationResponse {
    pub vehicle_id: String,
    pub tire_degradation: DegradationModel,
}

#[derive(Deserialize, Debug)]
pub struct StrategyRequest {
    pub vehicle_id: String,
    pub current_lap: u32,
    pub total_laps: Option<u32>,
    pub laps: Vec<LapRecord>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub weather: WeatherSnapshot,
}

#[derive(Serialize, Debug)]
pub struct StrategyResponse {
    pub vehicle_id: String,
    pub current_lap: u32,
    pub degradation_rate: f64,
    pub pit_windows: Vec<PitWindow>,
}

#[derive(Deserialize, Debug)]
pub struct PitDecisionRequest {
    pub vehicle_id: String,
    pub current_lap: u32,
    pub laps: Vec<LapRecord>,
    pub gap_to_behind: f64,
    #[serde(default)]
    pub weather_changing: bool,
}

#[derive(Serialize, Debug)]
pub struct PitDecisionResponse {
    pub vehicle_id: String,
    pub should_pit: bool,
    pub reason: PitReason,
    pub message: &'static str,
    pub degradation_rate: f64,
}

#[derive(Deserialize, Debug)]
pub struct FuelRequest {
    pub current_lap: u32,
    pub total_laps: Option<u32>,
    pub consumption_per_lap: f64,
    pub current_fuel: f64,
}

#[derive(Deserialize, Debug)]
pub struct FleetRequest {
    pub vehicles: Vec<DegradationRequest>,
}

#[derive(Serialize, Debug)]
pub struct FleetResponse {
    pub total_vehicles: usize,
    pub average_tire_degradation: f64,
}

// ---------- Validation ----------

fn check_race(current_lap: u32, total_laps: u32) -> Result<(), RequestError> {
    if current_lap == 0 {
        return Err(RequestError::CurrentLapZero);
    }
    if current_lap > total_laps {
        return Err(RequestError::PastRaceEnd { current_lap, total_laps });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, v: f64) -> Result<(), RequestError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(RequestError::InvalidNumber { field })
    }
}

// ---------- Handlers ----------

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "pit_strategy running", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn degradation_handler(
    State(state): State<AppState>,
    Json(req): Json<DegradationRequest>,
) -> Json<DegradationResponse> {
    let series = LapSeries::from_records(&req.laps);
    let model = degradation::estimate(&state.cfg.degradation, &series.seconds());
    tracing::info!(vehicle = %req.vehicle_id, laps = series.len(), rate = model.rate_per_lap, "degradation");
    Json(DegradationResponse {
        vehicle_id: req.vehicle_id,
        tire_degradation: model,
    })
}

pub async fn strategy_handler(
    State(state): State<AppState>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<StrategyResponse>, ApiError> {
    let cfg = &state.cfg;
    let total_laps = req.total_laps.unwrap_or(cfg.default_total_laps);
    check_race(req.current_lap, total_laps)?;
    for c in &req.competitors {
        if let Some(t) = c.estimated_total_time {
            check_non_negative("competitors.estimated_total_time", t)?;
        }
    }

    let lap_times = LapSeries::from_records(&req.laps).seconds();
    log_series(&req.vehicle_id, req.current_lap, &lap_times);
    let model = degradation::estimate(&cfg.degradation, &lap_times);

    let race = RaceState {
        current_lap: req.current_lap,
        total_laps,
        lap_times: &lap_times,
        degradation_rate: model.rate_per_lap,
        competitors: &req.competitors,
        weather: &req.weather,
    };
    let windows = pit_window::evaluate(cfg, &race);
    tracing::info!(
        vehicle = %req.vehicle_id,
        lap = req.current_lap,
        windows = windows.len(),
        "strategy calculated"
    );

    Ok(Json(StrategyResponse {
        vehicle_id: req.vehicle_id,
        current_lap: req.current_lap,
        degradation_rate: model.rate_per_lap,
        pit_windows: windows,
    }))
}

pub async fn pit_now_handler(
    State(state): State<AppState>,
    Json(req): Json<PitDecisionRequest>,
) -> Result<Json<PitDecisionResponse>, ApiError> {
    let cfg = &state.cfg;
    if req.current_lap == 0 {
        return Err(RequestError::CurrentLapZero.into());
    }
    check_non_negative("gap_to_behind", req.gap_to_behind)?;

    let lap_times = LapSeries::from_records(&req.laps).seconds();
    log_series(&req.vehicle_id, req.current_lap, &lap_times);
    let model = degradation::estimate(&cfg.degradation, &lap_times);
    let d = decision::decide(
        cfg,
        req.current_lap,
        &lap_times,
        model.rate_per_lap,
        req.gap_to_behind,
        req.weather_changing,
    );
    tracing::info!(vehicle = %req.vehicle_id, lap = req.current_lap, pit = d.pit_now, reason = %d.reason, "pit call");

    Ok(Json(PitDecisionResponse {
        vehicle_id: req.vehicle_id,
        should_pit: d.pit_now,
        reason: d.reason,
        message: d.reason.message(),
        degradation_rate: model.rate_per_lap,
    }))
}

pub async fn fuel_handler(
    State(state): State<AppState>,
    Json(req): Json<FuelRequest>,
) -> Result<Json<FuelPlan>, ApiError> {
    let total_laps = req.total_laps.unwrap_or(state.cfg.default_total_laps);
    check_race(req.current_lap, total_laps)?;
    check_non_negative("consumption_per_lap", req.consumption_per_lap)?;
    check_non_negative("current_fuel", req.current_fuel)?;
    Ok(Json(fuel::plan(
        req.current_lap,
        total_laps,
        req.consumption_per_lap,
        req.current_fuel,
    )))
}

pub async fn fleet_handler(
    State(state): State<AppState>,
    Json(req): Json<FleetRequest>,
) -> Json<FleetResponse> {
    let rates = req.vehicles.iter().map(|v| {
        let series = LapSeries::from_records(&v.laps);
        degradation::estimate(&state.cfg.degradation, &series.seconds()).rate_per_lap
    });
    Json(FleetResponse {
        total_vehicles: req.vehicles.len(),
        average_tire_degradation: average_degradation(rates),
    })
}

// Debug signal so we can confirm the feed is sending real laps
fn log_series(vehicle: &str, lap: u32, lap_times: &[f64]) {
    if std::env::var("LOG_STRATEGY").ok().as_deref() != Some("1") {
        return;
    }
    let n = lap_times.len();
    let mean = if n == 0 { 0.0 } else { lap_times.iter().sum::<f64>() / n as f64 };
    let tail: Vec<String> = lap_times
        .iter()
        .skip(n.saturating_sub(5))
        .map(|t| format!("{:.3}", t))
        .collect();
    tracing::info!(
        "recv vehicle={} lap={} laps={} mean={:.3} last=[{}]",
        vehicle, lap, n, mean, tail.join(", ")
    );
}

pub fn router(cfg: StrategyConfig) -> Router {
    let state = AppState { cfg: Arc::new(cfg) };
    Router::new()
        .route("/", get(root))
        .route("/degradation", post(degradation_handler))
        .route("/strategy/calculate", post(strategy_handler))
        .route("/strategy/pit-now", post(pit_now_handler))
        .route("/fuel/plan", post(fuel_handler))
        .route("/race/summary", post(fleet_handler))
        .with_state(state)
}
