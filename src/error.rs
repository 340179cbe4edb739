use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read strategy config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse strategy config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid strategy config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("current_lap must be at least 1")]
    CurrentLapZero,
    #[error("current_lap ({current_lap}) is beyond total_laps ({total_laps})")]
    PastRaceEnd { current_lap: u32, total_laps: u32 },
    #[error("{field} must be a finite, non-negative number")]
    InvalidNumber { field: &'static str },
}
