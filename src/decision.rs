use crate::config::StrategyConfig;
use crate::types::{PitDecision, PitReason};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Should the car box this lap? Rules are checked in priority order and the
/// first one that fires wins.
pub fn decide(
    cfg: &StrategyConfig,
    current_lap: u32,
    lap_times: &[f64],
    degradation_rate: f64,
    gap_to_car_behind: f64,
    weather_changing: bool,
) -> PitDecision {
    let reason = if degradation_rate > cfg.critical_rate() {
        Some(PitReason::CriticalDegradation)
    } else if gap_to_car_behind > cfg.undercut_gap() {
        Some(PitReason::UndercutOpportunity)
    } else if weather_changing {
        Some(PitReason::WeatherChange)
    } else if past_performance_cliff(cfg, lap_times) {
        Some(PitReason::PerformanceCliff)
    } else {
        None
    };

    let decision = match reason {
        Some(reason) => PitDecision { pit_now: true, reason },
        None => PitDecision {
            pit_now: false,
            reason: PitReason::ContinueStint,
        },
    };
    tracing::debug!(
        current_lap,
        degradation_rate,
        gap_to_car_behind,
        weather_changing,
        pit_now = decision.pit_now,
        reason = %decision.reason,
        "pit decision"
    );
    decision
}

/// Recent pace (last 3 laps) against the best 5 laps of the stint.
fn past_performance_cliff(cfg: &StrategyConfig, lap_times: &[f64]) -> bool {
    if lap_times.len() < 3 {
        return false;
    }
    let recent = mean(&lap_times[lap_times.len() - 3..]);

    let mut sorted = lap_times.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.truncate(5);
    let best = mean(&sorted);

    recent > best + cfg.performance_cliff_s
}
