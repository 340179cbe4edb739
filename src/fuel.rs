use crate::types::FuelPlan;

/// Straight-line fuel projection to the flag.
pub fn plan(current_lap: u32, total_laps: u32, consumption_per_lap: f64, current_fuel: f64) -> FuelPlan {
    // no negative laps once the flag has fallen
    let laps_remaining = total_laps.saturating_sub(current_lap);
    let fuel_needed = laps_remaining as f64 * consumption_per_lap;
    let margin = current_fuel - fuel_needed;

    FuelPlan {
        fuel_needed,
        current_fuel,
        margin,
        laps_remaining,
        can_finish: margin > 0.0,
        // less than one lap in hand
        fuel_save_required: margin < consumption_per_lap,
    }
}
