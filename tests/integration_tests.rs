/// Integration tests for the pit strategy engine
///
/// Run with: cargo test --test integration_tests -- --nocapture

use axum::{extract::State, Json};
use pit_strategy::config::StrategyConfig;
use pit_strategy::laps::{LapRecord, LapSeries};
use pit_strategy::pit_window::{self, RaceState};
use pit_strategy::service::{self, AppState};
use pit_strategy::types::{Competitor, PitReason, WeatherSnapshot};
use pit_strategy::{decision, degradation, fuel};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn state() -> AppState {
    AppState {
        cfg: Arc::new(StrategyConfig::default()),
    }
}

fn records(times: &[f64]) -> Vec<LapRecord> {
    times
        .iter()
        .enumerate()
        .map(|(i, t)| LapRecord {
            lap: i as u32 + 1,
            lap_time_seconds: Some(*t),
            value: None,
        })
        .collect()
}

#[test]
fn test_end_to_end_lap_five() {
    println!("\n=== Test: End-to-end at lap 5 ===");
    let cfg = StrategyConfig::default();
    let weather = WeatherSnapshot::default();
    let laps = [92.0, 93.0, 94.0, 95.0, 96.0];

    let race = RaceState {
        current_lap: 5,
        total_laps: 17,
        lap_times: &laps,
        degradation_rate: 0.6,
        competitors: &[],
        weather: &weather,
    };
    let windows = pit_window::evaluate(&cfg, &race);

    for w in &windows {
        println!(
            "  {:<18} laps {}-{}  P{}  {:.0}% confidence  total={:.1}s",
            w.reason,
            w.lap_start,
            w.lap_end,
            w.predicted_position,
            w.confidence * 100.0,
            w.projected_race_time
        );
    }

    assert_eq!(windows.len(), 3);
    assert!(windows.iter().all(|w| w.predicted_position == 1));
    let early = windows.iter().find(|w| w.pit_lap == 6).unwrap();
    assert!((early.confidence - 0.85).abs() < 1e-9);
    assert_eq!(early.time_loss_seconds, 45.0);
    println!("✓ End-to-end strategy correct");
}

#[test]
fn test_degradation_feeds_decision() {
    println!("\n=== Test: Degradation feeds pit decision ===");
    let cfg = StrategyConfig::default();
    // tires falling off hard: +0.8 s/lap
    let laps: Vec<f64> = (0..8).map(|i| 90.0 + 0.8 * i as f64).collect();
    let model = degradation::estimate(&cfg.degradation, &laps);
    assert!((model.rate_per_lap - 0.8).abs() < 1e-6);

    let d = decision::decide(&cfg, 9, &laps, model.rate_per_lap, 0.0, false);
    assert!(d.pit_now);
    assert_eq!(d.reason, PitReason::CriticalDegradation);
    println!("✓ rate={:.3} -> {}", model.rate_per_lap, d.reason.message());
}

#[test]
fn test_fuel_plan_example() {
    let p = fuel::plan(5, 17, 3.2, 50.0);
    assert_eq!(p.laps_remaining, 12);
    assert!((p.fuel_needed - 38.4).abs() < 1e-9);
    assert!((p.margin - 11.6).abs() < 1e-9);
    assert!(p.can_finish && !p.fuel_save_required);
}

#[test]
fn test_ms_feed_through_series() {
    let raw: Vec<LapRecord> = [(2, 90_500.0), (1, 90_000.0), (4, 91_500.0), (3, 91_000.0), (5, 92_000.0)]
        .iter()
        .map(|(lap, ms)| LapRecord {
            lap: *lap,
            lap_time_seconds: None,
            value: Some(*ms),
        })
        .collect();
    let series = LapSeries::from_records(&raw);
    let model = degradation::estimate(&StrategyConfig::default().degradation, &series.seconds());
    assert!((model.rate_per_lap - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_strategy_handler() {
    println!("\n=== Test: /strategy/calculate handler ===");
    let req = serde_json::from_value(json!({
        "vehicle_id": "GR86-004-78",
        "current_lap": 11,
        "laps": records(&[95.0, 95.2, 95.4, 95.6, 95.8, 96.0, 96.2, 96.4, 96.6, 96.8]),
        "competitors": [
            { "identifier": "13", "estimated_total_time": 100.0 },
            { "identifier": "22" }
        ]
    }))
    .unwrap();

    let Json(resp) = service::strategy_handler(State(state()), Json(req)).await.unwrap();
    println!("{}", serde_json::to_string_pretty(&json!(resp.pit_windows)).unwrap());

    assert_eq!(resp.current_lap, 11);
    assert!((resp.degradation_rate - 0.2).abs() < 1e-6);
    assert_eq!(resp.pit_windows.len(), 1);
    assert_eq!(resp.pit_windows[0].pit_lap, 14);
    assert_eq!(resp.pit_windows[0].predicted_position, 2);
}

#[tokio::test]
async fn test_strategy_handler_rejects_lap_past_flag() {
    let req = serde_json::from_value(json!({
        "vehicle_id": "7",
        "current_lap": 20,
        "total_laps": 17,
        "laps": []
    }))
    .unwrap();
    let err = service::strategy_handler(State(state()), Json(req)).await.unwrap_err();
    assert_eq!(err.0, axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pit_now_handler() {
    let req = serde_json::from_value(json!({
        "vehicle_id": "7",
        "current_lap": 6,
        "laps": records(&[90.0, 90.1, 90.0, 90.2, 90.1]),
        "gap_to_behind": 52.0
    }))
    .unwrap();
    let Json(resp) = service::pit_now_handler(State(state()), Json(req)).await.unwrap();
    assert!(resp.should_pit);
    assert_eq!(resp.reason, PitReason::UndercutOpportunity);
    assert_eq!(resp.message, "OPPORTUNITY: Gap sufficient for undercut");
}

#[tokio::test]
async fn test_fuel_and_summary_handlers() {
    let req = serde_json::from_value(json!({
        "current_lap": 5,
        "consumption_per_lap": 3.2,
        "current_fuel": 50.0
    }))
    .unwrap();
    let Json(plan) = service::fuel_handler(State(state()), Json(req)).await.unwrap();
    assert_eq!(plan.laps_remaining, 12);

    let req = serde_json::from_value(json!({
        "vehicles": [
            { "vehicle_id": "a", "laps": records(&[90.0, 90.2, 90.4, 90.6, 90.8]) },
            { "vehicle_id": "b", "laps": records(&[90.0, 90.4, 90.8, 91.2, 91.6]) },
            { "vehicle_id": "c", "laps": records(&[90.0, 91.0]) }
        ]
    }))
    .unwrap();
    let Json(summary) = service::fleet_handler(State(state()), Json(req)).await;
    assert_eq!(summary.total_vehicles, 3);
    assert!((summary.average_tire_degradation - 0.3).abs() < 1e-6);
}

proptest! {
    #[test]
    fn prop_windows_well_formed(
        current_lap in 1u32..20,
        extra in 0u32..30,
        rate in -2.0f64..3.0,
        laps in prop::collection::vec(60.0f64..200.0, 0..20),
        comp_times in prop::collection::vec(prop::option::of(500.0f64..5000.0), 0..10),
    ) {
        let cfg = StrategyConfig::default();
        let weather = WeatherSnapshot::default();
        let competitors: Vec<Competitor> = comp_times
            .into_iter()
            .enumerate()
            .map(|(i, t)| Competitor { identifier: i.to_string(), estimated_total_time: t })
            .collect();
        let race = RaceState {
            current_lap,
            total_laps: current_lap + extra,
            lap_times: &laps,
            degradation_rate: rate,
            competitors: &competitors,
            weather: &weather,
        };
        let windows = pit_window::evaluate(&cfg, &race);

        for w in &windows {
            prop_assert!(w.lap_end >= w.lap_start);
            prop_assert!(w.lap_start > current_lap);
            prop_assert!((0.3..=0.95).contains(&w.confidence));
            prop_assert!(w.predicted_position >= 1);
            prop_assert!(w.predicted_position as usize <= competitors.len() + 1);
        }
        prop_assert!(windows.windows(2).all(|p| p[0].predicted_position <= p[1].predicted_position));
        if current_lap > 5 {
            prop_assert!(windows.iter().all(|w| w.pit_lap != 6));
        }
        if current_lap > 9 {
            prop_assert!(windows.iter().all(|w| w.pit_lap != 10));
        }
    }

    #[test]
    fn prop_confidence_clamped(
        pit_lap in 0u32..100,
        current_lap in 0u32..100,
        total_laps in 0u32..100,
        rate in -10.0f64..10.0,
    ) {
        let c = pit_window::confidence(&StrategyConfig::default(), pit_lap, current_lap, total_laps, rate);
        prop_assert!((0.3..=0.95).contains(&c));
    }

    #[test]
    fn prop_short_series_has_no_model(laps in prop::collection::vec(1.0f64..500.0, 0..5)) {
        let m = degradation::estimate(&StrategyConfig::default().degradation, &laps);
        prop_assert_eq!(m.rate_per_lap, 0.0);
        prop_assert!(m.raw_laps.is_empty());
    }

    #[test]
    fn prop_critical_rate_always_pits(
        lap in 1u32..30,
        gap in 0.0f64..200.0,
        weather_changing in any::<bool>(),
        laps in prop::collection::vec(60.0f64..200.0, 0..20),
    ) {
        let d = decision::decide(&StrategyConfig::default(), lap, &laps, 0.8, gap, weather_changing);
        prop_assert!(d.pit_now);
        prop_assert_eq!(d.reason, PitReason::CriticalDegradation);
    }
}
