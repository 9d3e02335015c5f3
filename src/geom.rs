//! Cartesian geometry: points, polar points and poses
//!
//! World space is a right-handed plane. X is the primary axis:
//! - theta == 0    => facing +X (right)
//! - theta == π/2  => facing +Y (up)
//! - theta == ±π   => facing -X (left)
//!
//! Every world-space transform in the crate is built from [`Pose::advance`]
//! and [`Pose::relative_to`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::units::{Meters, Radians, normalize_angle};

/// A point in Cartesian world space
pub type Point = DVec2;

/// Cartesian distance between two points
#[inline]
pub fn dist(p1: Point, p2: Point) -> Meters {
    p1.distance(p2)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: Meters, theta: Radians) -> Point {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta), theta in [-π, π]
#[inline]
pub fn cartesian_to_polar(p: Point) -> (Meters, Radians) {
    (p.length(), p.y.atan2(p.x))
}

/// Polar representation of a point: radius + angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    pub radius: Meters,
    /// Always normalized to [-π, π]
    pub angle: Radians,
}

impl PolarPoint {
    pub fn new(radius: Meters, angle: Radians) -> Self {
        Self {
            radius,
            angle: normalize_angle(angle),
        }
    }

    pub fn from_point(p: Point) -> Self {
        let (radius, angle) = cartesian_to_polar(p);
        Self::new(radius, angle)
    }

    pub fn to_point(self) -> Point {
        polar_to_cartesian(self.radius, self.angle)
    }
}

/// A position plus an orientation in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Point,
    pub theta: Radians,
}

impl Pose {
    pub const ORIGIN: Pose = Pose {
        pos: DVec2::ZERO,
        theta: 0.0,
    };

    pub fn new(x: Meters, y: Meters, theta: Radians) -> Self {
        Self {
            pos: DVec2::new(x, y),
            theta,
        }
    }

    /// Pure displacement with no rotation
    pub fn offset(x: Meters, y: Meters) -> Self {
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub fn x(&self) -> Meters {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> Meters {
        self.pos.y
    }

    /// Advance from `self` by `delta`, where `delta` is expressed in the local
    /// frame of `self`: translate by `delta.pos` rotated into `self.theta`,
    /// then rotate by `delta.theta`.
    pub fn advance(&self, delta: Pose) -> Pose {
        let moved = DVec2::from_angle(self.theta).rotate(delta.pos);
        Pose {
            pos: self.pos + moved,
            theta: normalize_angle(self.theta + delta.theta),
        }
    }

    /// Express `self` in the local frame of `reference`.
    pub fn relative_to(&self, reference: Pose) -> Pose {
        let translated = self.pos - reference.pos;
        Pose {
            pos: DVec2::from_angle(-reference.theta).rotate(translated),
            theta: normalize_angle(self.theta - reference.theta),
        }
    }

    /// True if position and heading match within the given tolerances.
    /// Headings are compared on the circle, so π and -π are near.
    pub fn is_near(&self, other: &Pose, meters_tol: Meters, radians_tol: Radians) -> bool {
        (self.pos.x - other.pos.x).abs() <= meters_tol
            && (self.pos.y - other.pos.y).abs() <= meters_tol
            && normalize_angle(self.theta - other.theta).abs() <= radians_tol
    }
}
