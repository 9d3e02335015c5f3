//! Physical units and simulated time
//!
//! Lengths, angles and speeds are plain `f64` aliases so they compose with
//! ordinary arithmetic. Comparisons between them always go through the
//! `*_are_near` predicates with an explicit tolerance, never `==`.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Unit of distance
pub type Meters = f64;
/// Unit of speed and velocity
pub type MetersPerSec = f64;
/// Unit of acceleration
pub type MetersPerSec2 = f64;
/// Unit of angle (2π = one full turn)
pub type Radians = f64;
/// Unit of mass
pub type Grams = f32;

/// 90-degree left turn
pub const TURN_90_LEFT: Radians = std::f64::consts::FRAC_PI_2;
/// 90-degree right turn
pub const TURN_90_RIGHT: Radians = -std::f64::consts::FRAC_PI_2;

/// Simulation time in nanoseconds. Starts at 0 and only moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const NANOSECOND: u64 = 1;
    pub const MICROSECOND: u64 = 1_000;
    pub const MILLISECOND: u64 = 1_000_000;
    pub const SECOND: u64 = 1_000_000_000;

    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * Self::MILLISECOND)
    }

    /// Rounds to the nearest nanosecond; negative inputs saturate to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * Self::SECOND as f64).round().max(0.0) as u64)
    }

    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 * 1e-9
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    /// Saturates at zero; simulated time never goes negative.
    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

#[inline]
fn is_near(v1: f64, v2: f64, tolerance: f64) -> bool {
    (v1 - v2).abs() <= tolerance.abs()
}

/// True if two lengths are within `tolerance` of each other
#[inline]
pub fn meters_are_near(m1: Meters, m2: Meters, tolerance: Meters) -> bool {
    is_near(m1, m2, tolerance)
}

/// True if two speeds are within `tolerance` of each other
#[inline]
pub fn speeds_are_near(s1: MetersPerSec, s2: MetersPerSec, tolerance: MetersPerSec) -> bool {
    is_near(s1, s2, tolerance)
}

/// True if two angles are within `tolerance` of each other (no wraparound)
#[inline]
pub fn radians_are_near(a1: Radians, a2: Radians, tolerance: Radians) -> bool {
    is_near(a1, a2, tolerance)
}

/// Normalize angle to [-π, π]
#[inline]
pub fn normalize_angle(mut angle: Radians) -> Radians {
    use std::f64::consts::{PI, TAU};
    while angle < -PI {
        angle += TAU;
    }
    while angle > PI {
        angle -= TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_meters_are_near_table() {
        // (m1, m2, tol, expected)
        let table = [
            (0.00, 0.10, 0.05, false),
            (0.00, 0.10, 0.20, true),
            (-0.00, 0.00, 0.00, true),
            (-0.04, 0.05, 0.10, true),
            (-0.06, 0.06, 0.10, false),
            (0.10, 0.19, 0.10, true),
            (0.10, 0.21, 0.10, false),
            (-0.10, -0.21, 0.10, false),
            (1e-7, 1.1e-7, 1.1e-8, true),
            (1e-7, 1.1e-7, 9e-9, false),
        ];
        for (i, &(m1, m2, tol, exp)) in table.iter().enumerate() {
            assert_eq!(meters_are_near(m1, m2, tol), exp, "vec {i}");
            assert_eq!(meters_are_near(m2, m1, tol), exp, "vec {i} swapped");
        }
    }

    #[test]
    fn test_negative_tolerance_is_absolute() {
        assert!(radians_are_near(1.0, 1.05, -0.1));
        assert!(speeds_are_near(0.3, 0.25, -0.05));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(radians_are_near(normalize_angle(0.0), 0.0, 1e-12));
        assert!(radians_are_near(normalize_angle(PI), PI, 1e-12));
        assert!(radians_are_near(normalize_angle(-PI), -PI, 1e-12));
        assert!(radians_are_near(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, 1e-12));
        assert!(radians_are_near(normalize_angle(-5.0 * PI / 2.0), -PI / 2.0, 1e-12));
        assert!(radians_are_near(normalize_angle(7.0 * PI / 2.0), -PI / 2.0, 1e-9));
    }

    #[test]
    fn test_sim_time_arithmetic() {
        let dt = SimTime::from_millis(10);
        let mut now = SimTime::ZERO;
        for _ in 0..100 {
            now += dt;
        }
        assert_eq!(now, SimTime::from_nanos(SimTime::SECOND));
        assert!((now.as_secs_f64() - 1.0).abs() < 1e-12);
        assert_eq!(now - dt, SimTime::from_millis(990));
        assert_eq!(dt - now, SimTime::ZERO);
        assert_eq!(SimTime::from_secs_f64(0.01), dt);
    }

    proptest! {
        #[test]
        fn prop_normalize_angle_in_range(a in -100.0f64..100.0) {
            let n = normalize_angle(a);
            prop_assert!((-PI..=PI).contains(&n));
            // same direction as the input
            prop_assert!((n.sin() - a.sin()).abs() < 1e-9);
            prop_assert!((n.cos() - a.cos()).abs() < 1e-9);
        }
    }
}
