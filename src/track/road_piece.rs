//! Road pieces: the straight and circular-arc segments a track is built from
//!
//! A piece is defined by its length along road center and the heading change
//! when driving through it. Any heading change follows a circular arc, and no
//! piece turns more than 90 degrees. Width belongs to the track, not the piece.

use serde::{Deserialize, Serialize};

use crate::geom::Pose;
use crate::units::{Meters, Radians, TURN_90_LEFT, TURN_90_RIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadPiece {
    center_length: Meters,
    /// 0 => straight; +π/2 => 90-degree left turn; -π/2 => 90-degree right turn
    turn_angle: Radians,
}

impl RoadPiece {
    /// # Panics
    /// If `center_length <= 0` or `turn_angle` is outside [-π/2, π/2].
    pub fn new(center_length: Meters, turn_angle: Radians) -> Self {
        assert!(
            center_length > 0.0,
            "RoadPiece requires center_length > 0; actual value is {center_length}"
        );
        assert!(
            (TURN_90_RIGHT..=TURN_90_LEFT).contains(&turn_angle),
            "RoadPiece requires ({TURN_90_RIGHT} <= turn_angle <= {TURN_90_LEFT}); actual value is {turn_angle}"
        );
        Self {
            center_length,
            turn_angle,
        }
    }

    pub fn straight(length: Meters) -> Self {
        Self::new(length, 0.0)
    }

    #[inline]
    pub fn center_length(&self) -> Meters {
        self.center_length
    }

    #[inline]
    pub fn turn_angle(&self) -> Radians {
        self.turn_angle
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        self.turn_angle == 0.0
    }

    /// Path length through the piece at a lateral offset from road center.
    /// Positive `cofs` is left of center, so it shortens left turns.
    pub fn length(&self, cofs: Meters) -> Meters {
        self.center_length - cofs * self.turn_angle
    }

    /// Curve radius at a lateral offset from road center. Straights return 0.
    pub fn curve_radius(&self, cofs: Meters) -> Meters {
        if self.is_straight() {
            return 0.0;
        }
        let r = self.center_length / self.turn_angle.abs();
        if self.turn_angle < 0.0 {
            // curve right
            r + cofs
        } else {
            // curve left
            r - cofs
        }
    }

    /// Change in pose when driving the whole piece along road center, starting
    /// from the canonical pose: origin, facing +X.
    pub fn delta_pose(&self) -> Pose {
        arc_delta_pose(self.center_length, self.turn_angle)
    }

    /// Change in pose after driving `fraction` (0..=1) of the piece along road
    /// center. Both the length and the turn angle scale with the fraction, so
    /// a fraction of 0 is exactly no motion.
    pub fn partial_delta_pose(&self, fraction: f64) -> Pose {
        if fraction <= 0.0 {
            return Pose::ORIGIN;
        }
        arc_delta_pose(self.center_length * fraction, self.turn_angle * fraction)
    }
}

fn arc_delta_pose(length: Meters, turn_angle: Radians) -> Pose {
    if turn_angle == 0.0 {
        return Pose::offset(length, 0.0);
    }
    let radius = length / turn_angle.abs();
    let swept = turn_angle.abs();
    let forward = radius * swept.sin();
    let lateral = radius * (1.0 - swept.cos());
    if turn_angle > 0.0 {
        Pose::new(forward, lateral, turn_angle)
    } else {
        Pose::new(forward, -lateral, turn_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const M_TOL: f64 = 1.0e-6;

    #[test]
    fn test_straights() {
        for center_length in [0.001, 0.020, 0.300, 4.000] {
            let rp = RoadPiece::new(center_length, 0.0);
            assert_eq!(rp.center_length(), center_length);
            assert_eq!(rp.turn_angle(), 0.0);
            assert!(rp.is_straight());
            assert_eq!(rp.delta_pose(), Pose::new(center_length, 0.0, 0.0));

            // all lateral offsets share the same length and (zero) curvature
            for i in 0..24 {
                let cofs = -1.1 + i as f64 * 0.1;
                assert_eq!(rp.length(cofs), center_length);
                assert_eq!(rp.curve_radius(cofs), 0.0);
            }
        }
    }

    #[test]
    fn test_right_angle_curves() {
        for i in 0..10 {
            let radius = (i + 1) as f64 * 0.1;
            let center_length = FRAC_PI_2 * radius;
            for turn_angle in [TURN_90_RIGHT, TURN_90_LEFT] {
                let rp = RoadPiece::new(center_length, turn_angle);
                assert!(!rp.is_straight());

                let exp_y = if turn_angle < 0.0 { -radius } else { radius };
                let exp = Pose::new(radius, exp_y, turn_angle);
                assert!(
                    rp.delta_pose().is_near(&exp, M_TOL, M_TOL),
                    "delta_pose {:?} exp {:?}",
                    rp.delta_pose(),
                    exp
                );

                for cofs in [0.0, 0.07, -0.05, radius, -radius] {
                    // left turn => larger cofs means tighter radius
                    let cofs_radius = if turn_angle > 0.0 {
                        radius - cofs
                    } else {
                        radius + cofs
                    };
                    assert!((rp.length(cofs) - FRAC_PI_2 * cofs_radius).abs() < M_TOL);
                    assert!((rp.curve_radius(cofs) - cofs_radius).abs() < M_TOL);
                }
            }
        }
    }

    #[test]
    fn test_other_curves_chain() {
        let pieces = [
            RoadPiece::new(1.0, 2.0 * PI / 6.0),  // L 60
            RoadPiece::new(0.5, 1.0 * PI / 6.0),  // L 30
            RoadPiece::new(0.4, -1.0 * PI / 6.0), // R 30
            RoadPiece::new(0.8, -2.0 * PI / 6.0), // R 60
        ];
        for rp in &pieces {
            let exp = rp.center_length() / rp.turn_angle().abs();
            assert!((rp.curve_radius(0.0) - exp).abs() < M_TOL);
        }

        // 60 + 30 degrees on the same radius makes a quarter circle
        for pair in pieces.chunks(2) {
            let r1 = pair[0].curve_radius(0.0);
            let r2 = pair[1].curve_radius(0.0);
            assert!((r1 - r2).abs() < M_TOL);

            let mut exp = Pose::new(r1, r1, FRAC_PI_2);
            if pair[0].turn_angle() < 0.0 {
                exp.pos.y = -exp.pos.y;
                exp.theta = -exp.theta;
            }
            let got = pair[0].delta_pose().advance(pair[1].delta_pose());
            assert!(got.is_near(&exp, M_TOL, M_TOL), "got {got:?} exp {exp:?}");
        }
    }

    #[test]
    fn test_partial_delta_pose() {
        let rp = RoadPiece::new(FRAC_PI_2 * 0.28, TURN_90_LEFT);
        assert_eq!(rp.partial_delta_pose(0.0), Pose::ORIGIN);
        assert!(rp.partial_delta_pose(1.0).is_near(&rp.delta_pose(), 1e-12, 1e-12));

        // Halfway round a left quarter circle of radius 0.28
        let half = rp.partial_delta_pose(0.5);
        let r = 0.28;
        let exp = Pose::new(
            r * (PI / 4.0).sin(),
            r * (1.0 - (PI / 4.0).cos()),
            PI / 4.0,
        );
        assert!(half.is_near(&exp, M_TOL, M_TOL));
    }

    #[test]
    #[should_panic(expected = "center_length > 0")]
    fn test_zero_length_panics() {
        let _ = RoadPiece::new(0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "turn_angle")]
    fn test_overturn_panics() {
        let _ = RoadPiece::new(1.0, PI);
    }
}
