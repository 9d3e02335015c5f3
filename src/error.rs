//! Construction-time validation errors
//!
//! These are the only recoverable failures in the crate. Geometric contract
//! violations at runtime (bad distance offsets, out-of-range angles) panic
//! instead, since they mean an invariant was already broken by the caller.

use thiserror::Error;

use crate::geom::Pose;
use crate::units::Meters;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("track with {0} road pieces is too small; at least 4 are required")]
    TooFewPieces(usize),
    #[error("invalid track width {0}; must be > 0")]
    InvalidWidth(Meters),
    #[error("invalid max center offset {0}; must be >= 0 (0 means width/2)")]
    InvalidMaxCofs(Meters),
    #[error("max center offset {max_cofs} reaches the tightest curve radius {radius}; must be smaller")]
    MaxCofsExceedsCurveRadius { max_cofs: Meters, radius: Meters },
    #[error("track is not a loop: begin pose = {begin:?}, end pose = {end:?}")]
    NotALoop { begin: Pose, end: Pose },
    #[error("track topology string is empty")]
    EmptyTopology,
    #[error("track topology must start with 'S'; topology = {0:?}")]
    TopologyMustStartStraight(String),
    #[error("unsupported token {token:?} at index {index} in track topology {topology:?}; expected S, L or R")]
    UnknownTopologyToken {
        token: char,
        index: usize,
        topology: String,
    },
    #[error("track name {0:?} is not recognized")]
    UnknownTrackName(String),
    #[error("vehicle type {code:?} is invalid; valid vehicle types:\n{valid}")]
    UnknownVehicleType { code: String, valid: String },
    #[error("invalid simulation time step; must be > 0 ns")]
    InvalidTimeStep,
    #[error("failed to parse settings: {0}")]
    Config(#[from] serde_json::Error),
}
