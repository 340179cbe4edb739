use crate::config::{CandidateStrategy, StrategyConfig};
use crate::degradation::median;
use crate::types::{Competitor, PitWindow, WeatherSnapshot};

/// Race context shared by every candidate evaluated in one call.
#[derive(Debug, Clone, Copy)]
pub struct RaceState<'a> {
    pub current_lap: u32,
    pub total_laps: u32,
    pub lap_times: &'a [f64],
    pub degradation_rate: f64,
    pub competitors: &'a [Competitor],
    pub weather: &'a WeatherSnapshot,
}

/// Rank the configured pit strategies still reachable from `current_lap`.
///
/// Result is sorted by predicted finishing position, best first. Ties keep
/// the configured candidate order. May be empty late in the race.
pub fn evaluate(cfg: &StrategyConfig, race: &RaceState<'_>) -> Vec<PitWindow> {
    let base = base_lap_time(cfg, race.lap_times);
    tracing::debug!(
        current_lap = race.current_lap,
        total_laps = race.total_laps,
        base,
        track_temp = race.weather.track_temp,
        "evaluating pit windows"
    );
    let mut windows: Vec<PitWindow> = cfg
        .candidates
        .iter()
        .filter(|c| race.current_lap <= c.latest_current_lap)
        .map(|c| evaluate_candidate(cfg, race, c, base))
        .collect();

    // stable sort
    windows.sort_by_key(|w| w.predicted_position);
    windows
}

fn evaluate_candidate(
    cfg: &StrategyConfig,
    race: &RaceState<'_>,
    candidate: &CandidateStrategy,
    base: f64,
) -> PitWindow {
    let pit_lap = candidate.pit_lap;
    let projected = projected_race_time(cfg, race, pit_lap, base);
    let predicted_position = estimate_position(projected, race.competitors);
    let confidence = confidence(cfg, pit_lap, race.current_lap, race.total_laps, race.degradation_rate);

    let lap_start = pit_lap.saturating_sub(1).max(race.current_lap.saturating_add(1));
    // Short races can push the upper bound below the start; collapse to a single lap.
    let lap_end = pit_lap
        .saturating_add(1)
        .min(race.total_laps.saturating_sub(3))
        .max(lap_start);

    tracing::debug!(
        strategy = %candidate.name,
        pit_lap,
        projected,
        predicted_position,
        confidence,
        "evaluated pit candidate"
    );

    PitWindow {
        pit_lap,
        lap_start,
        lap_end,
        time_loss_seconds: cfg.pit_stop_time_s,
        projected_race_time: projected,
        predicted_position,
        confidence,
        reason: candidate.name.clone(),
    }
}

/// Median of the most recent laps, or the configured fallback with no laps at all.
pub fn base_lap_time(cfg: &StrategyConfig, lap_times: &[f64]) -> f64 {
    if lap_times.is_empty() {
        return cfg.fallback_lap_time_s;
    }
    let start = lap_times.len().saturating_sub(cfg.base_lap_window);
    median(&lap_times[start..])
}

/// Total race time for stopping on `pit_lap`: worn laps until the stop, the
/// stop itself, then fresh tires to the flag.
pub fn projected_race_time(cfg: &StrategyConfig, race: &RaceState<'_>, pit_lap: u32, base: f64) -> f64 {
    let rate = race.degradation_rate;

    let pre_pit: f64 = (race.current_lap..pit_lap)
        .map(|lap| base + rate * (lap as f64 - 1.0))
        .sum();

    let fresh_base = base - cfg.fresh_tire_bonus_s;
    let fresh_rate = rate * cfg.fresh_tire_wear_factor;
    let post_pit: f64 = (0..race.total_laps.saturating_sub(pit_lap))
        .map(|i| fresh_base + fresh_rate * i as f64)
        .sum();

    pre_pit + cfg.pit_stop_time_s + post_pit
}

/// 1 + number of competitors strictly faster than `race_time`. A competitor
/// without an estimate is assumed 10 s slower.
pub fn estimate_position(race_time: f64, competitors: &[Competitor]) -> u32 {
    let ahead = competitors
        .iter()
        .filter(|c| c.estimated_total_time.unwrap_or(race_time + 10.0) < race_time)
        .count();
    1 + ahead as u32
}

pub fn confidence(cfg: &StrategyConfig, pit_lap: u32, current_lap: u32, total_laps: u32, degradation_rate: f64) -> f64 {
    let mut confidence: f64 = 0.7;
    if degradation_rate > cfg.tire_cliff_threshold {
        confidence += 0.15;
    }
    if current_lap < 3 {
        confidence -= 0.2;
    }
    if pit_lap.saturating_add(3) > total_laps {
        confidence -= 0.25;
    }
    confidence.clamp(0.3, 0.95)
}
