//! Track coordinate space
//!
//! A position on the track is expressed as:
//! - `dofs` (distance offset): trackwise distance from the finish line, along
//!   road center. Cyclic, like the angle of a polar coordinate.
//! - `cofs` (center offset): lateral distance from road center. Facing
//!   trackwise, `cofs > 0` is left of center.
//!
//! The space is non-Euclidean: points bend with the shape of the track.
//! "Trackwise" is the track's natural forward direction, fixed by the start
//! piece, in the same sense as "clockwise".

use serde::{Deserialize, Serialize};

use crate::units::{Meters, MetersPerSec, Radians};

/// A position in track space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPoint {
    pub dofs: Meters,
    pub cofs: Meters,
}

impl TrackPoint {
    pub fn new(dofs: Meters, cofs: Meters) -> Self {
        Self { dofs, cofs }
    }
}

/// A track position plus a heading relative to the trackwise direction at
/// that position:
/// - `|delta_angle| <= π/2`     => facing trackwise
/// - `π/2 < |delta_angle| <= π` => facing counter-trackwise
/// - `|delta_angle| > π`        => invalid
///
/// Positive angles rotate left (counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPose {
    pub dofs: Meters,
    pub cofs: Meters,
    pub delta_angle: Radians,
}

impl TrackPose {
    pub fn new(dofs: Meters, cofs: Meters, delta_angle: Radians) -> Self {
        Self {
            dofs,
            cofs,
            delta_angle,
        }
    }

    pub fn point(&self) -> TrackPoint {
        TrackPoint::new(self.dofs, self.cofs)
    }
}

/// Velocity in track space. `distance < 0` means moving counter-trackwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackVel {
    pub distance: MetersPerSec,
    pub center: MetersPerSec,
}

/// Wrap a distance offset into `[0, cycle_length)`.
///
/// # Panics
/// If `dofs` is not finite.
pub fn normalize_cyclic(dofs: Meters, cycle_length: Meters) -> Meters {
    assert!(dofs.is_finite(), "dofs={dofs} is invalid; must be finite");
    let mut d = dofs.rem_euclid(cycle_length);
    // rem_euclid can round up to exactly cycle_length for tiny negative inputs
    while d >= cycle_length {
        d -= cycle_length;
    }
    while d < 0.0 {
        d += cycle_length;
    }
    d
}

/// True if a heading relative to the trackwise direction faces trackwise.
///
/// # Panics
/// If `|delta_angle| > π`.
pub fn is_facing_trackwise(delta_angle: Radians) -> bool {
    use std::f64::consts::{FRAC_PI_2, PI};
    assert!(
        (-PI..=PI).contains(&delta_angle),
        "delta_angle={delta_angle} is invalid; must be in range [-pi, pi]"
    );
    delta_angle.abs() <= FRAC_PI_2
}
