//! Trackdrive - Geometry and robotics core for arcade slot-car games
//!
//! Core modules:
//! - `units`: Scalar units, simulated time, near-equality predicates
//! - `geom`: Cartesian points, polar points, poses
//! - `track`: Cyclic track coordinate space, road pieces, regions
//! - `sim`: Deterministic vehicle simulation (kinematics, collisions, system tick)
//! - `settings`: Data-driven setup configuration
//! - `error`: Construction-time validation errors

pub mod error;
pub mod geom;
pub mod settings;
pub mod sim;
pub mod track;
pub mod units;

pub use error::SetupError;
pub use geom::{Point, PolarPoint, Pose};
pub use settings::Settings;
pub use units::{Meters, MetersPerSec, MetersPerSec2, Radians, SimTime, normalize_angle};

/// Simulation configuration constants
pub mod consts {
    use crate::units::{Meters, Radians, SimTime};

    /// Fixed simulation timestep (100 Hz)
    pub const SIM_DT: SimTime = SimTime::from_nanos(10 * SimTime::MILLISECOND);

    /// Tolerance for comparing track lengths (closure check, tests)
    pub const TRACK_METERS_TOL: Meters = 1.0e-6;
    /// Tolerance for comparing track headings (closure check)
    pub const TRACK_RADIANS_TOL: Radians = 1.0e-3;

    /// Standard modular track pieces
    pub const MOD_START_LONG_LEN: Meters = 0.34;
    pub const MOD_START_SHORT_LEN: Meters = 0.22;
    pub const MOD_STRAIGHT_LEN: Meters = 0.56;
    pub const MOD_CURVE_LEN: Meters = std::f64::consts::FRAC_PI_2 * (MOD_STRAIGHT_LEN / 2.0);

    /// Typical U-turn radius for a non-truck vehicle
    pub const DEFAULT_UTURN_RADIUS: Meters = 0.05;
}
