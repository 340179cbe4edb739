//! Pit-stop strategy engine: tire degradation fitting, pit window ranking,
//! immediate pit calls and fuel projection.

pub mod config;
pub mod decision;
pub mod degradation;
pub mod error;
pub mod fuel;
pub mod laps;
pub mod pit_window;
pub mod service;
pub mod types;

pub use config::StrategyConfig;
pub use error::{ConfigError, RequestError};
pub use types::{Competitor, DegradationModel, FuelPlan, PitDecision, PitReason, PitWindow, WeatherSnapshot};
