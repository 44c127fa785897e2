//! Domain model and pure decision logic for geofenced attendance.
//!
//! Everything in this crate is synchronous and free of I/O: distance
//! computation, nearest-branch resolution, the best-sample reducer and the
//! check-in/check-out admission gate. Configuration loading lives here too so
//! every binary shares the same environment contract.

pub mod admission;
pub mod app_config;
pub mod branch;
pub mod config;
pub mod geo;
pub mod record;
pub mod sample;

use thiserror::Error;

pub use admission::{can_check_in, can_check_out, Admission, DenyReason, GateState};
pub use app_config::{AppConfig, Environment, LocatorSettings};
pub use branch::{nearest, Branch, NearestBranch};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_meters, Coordinate, EARTH_RADIUS_METERS};
pub use record::{AttendanceRecord, AttendanceStatus};
pub use sample::{retain_better, LocationSample};

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: &'static str,
    },

    #[error("invalid radius for branch {branch_id}: {radius}")]
    InvalidRadius { branch_id: String, radius: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
