//! Vehicle collision detection
//!
//! Vehicles are modeled as rectangles in world space. Two vehicles collide
//! when a corner of either one lies inside the other. Detection only reports
//! events; it never changes vehicle state.
//!
//! Event lifecycle, per vehicle pair:
//! - First overlap: a new event is stamped with the current time and stored
//!   as both "current" and "new"
//! - Continued overlap: the stored event (and its impact time) is kept
//! - Separation: the "current" event is dropped
//!
//! Reading new events drains them. A caller that polls irregularly can miss
//! an older "new" event for a pair that separated and collided again in
//! between; only the latest is kept.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;
use crate::consts::TRACK_METERS_TOL;
use crate::geom::{Point, PolarPoint, Pose};
use crate::track::Track;
use crate::units::{Meters, SimTime};

/// Detects collisions between vehicles as the system ticks
pub trait VehicleCollider {
    /// Events that started since the last call, sorted by vehicle pair
    fn new_collisions(&mut self) -> Vec<CollisionEvent>;

    /// Every ongoing collision, sorted by vehicle pair
    fn current_collisions(&self) -> Vec<CollisionEvent>;

    /// Refresh collision state from the vehicles' current poses
    fn update(&mut self, now: SimTime, track: &Track, vehicles: &[Vehicle]);
}

/// One vehicle's side of a collision. The point of impact is in that
/// vehicle's own frame: +x ahead, +y to the left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleCollisionInfo {
    pub id: usize,
    pub poi: Point,
}

// Quadrant boundaries ignore the vehicle's actual aspect ratio.
impl VehicleCollisionInfo {
    fn poi_angle(&self) -> f64 {
        PolarPoint::from_point(self.poi).angle
    }

    pub fn is_front(&self) -> bool {
        let a = self.poi_angle();
        a > -FRAC_PI_4 && a < FRAC_PI_4
    }

    pub fn is_rear(&self) -> bool {
        self.poi_angle().abs() > 3.0 * FRAC_PI_4
    }

    pub fn is_left_side(&self) -> bool {
        let a = self.poi_angle();
        (FRAC_PI_4..=3.0 * FRAC_PI_4).contains(&a)
    }

    pub fn is_right_side(&self) -> bool {
        let a = self.poi_angle();
        (-3.0 * FRAC_PI_4..=-FRAC_PI_4).contains(&a)
    }
}

/// A collision between two vehicles, as of the moment of impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub impact_time: SimTime,
    /// Lower vehicle id first
    pub vehicles: [VehicleCollisionInfo; 2],
}

/// Vehicle pair, lower id first
type VehiclePair = (usize, usize);

/// Per-vehicle data needed for collision checks
#[derive(Debug, Clone, Copy)]
pub(crate) struct CollisionInputs {
    pub dofs: Meters,
    pub pose: Pose,
    pub length: Meters,
    pub width: Meters,
}

impl CollisionInputs {
    /// World-space corners: front left, front right, back left, back right
    fn corners(&self) -> [Point; 4] {
        let (hl, hw) = (self.length / 2.0, self.width / 2.0);
        [(hl, hw), (hl, -hw), (-hl, hw), (-hl, -hw)]
            .map(|(x, y)| self.pose.advance(Pose::offset(x, y)).pos)
    }

    /// True if a world-space point lies inside (or on the edge of) the
    /// rectangle. Edges are widened by the track distance tolerance, since
    /// rotating into the rectangle's frame rounds shared edges either way.
    fn contains(&self, p: Point) -> bool {
        let rel = Pose { pos: p, theta: 0.0 }.relative_to(self.pose).pos;
        rel.x.abs() <= self.length / 2.0 + TRACK_METERS_TOL
            && rel.y.abs() <= self.width / 2.0 + TRACK_METERS_TOL
    }
}

/// Rectangle-based collision detector
#[derive(Debug, Clone, Default)]
pub struct CollisionDetector {
    /// Largest length or width of either vehicle in the pair
    max_dimension: BTreeMap<VehiclePair, Meters>,
    current: BTreeMap<VehiclePair, CollisionEvent>,
    new: BTreeMap<VehiclePair, CollisionEvent>,
}

fn max_dimension(a: &CollisionInputs, b: &CollisionInputs) -> Meters {
    a.length.max(a.width).max(b.length).max(b.width)
}

impl CollisionDetector {
    pub fn new(vehicles: &[Vehicle]) -> Self {
        let mut max_dim = BTreeMap::new();
        for (i, a) in vehicles.iter().enumerate() {
            for (j, b) in vehicles.iter().enumerate().skip(i + 1) {
                let dim = a.length().max(a.width()).max(b.length()).max(b.width());
                max_dim.insert((i, j), dim);
            }
        }
        Self {
            max_dimension: max_dim,
            ..Default::default()
        }
    }

    pub(crate) fn update_from_inputs(&mut self, now: SimTime, track: &Track, inputs: &[CollisionInputs]) {
        for (i, a) in inputs.iter().enumerate() {
            for (j, b) in inputs.iter().enumerate().skip(i + 1) {
                let pair = (i, j);

                // Pieces can overlap in world space (an overpass), so vehicles far
                // apart along the track never collide
                let max_dim = *self
                    .max_dimension
                    .entry(pair)
                    .or_insert_with(|| max_dimension(a, b));
                if track.shortest_cyclic_distance(a.dofs, b.dofs) > max_dim {
                    self.current.remove(&pair);
                    continue;
                }

                let Some(abs_poi) = point_of_impact([*a, *b]) else {
                    self.current.remove(&pair);
                    continue;
                };
                if self.current.contains_key(&pair) {
                    // keep the first impact time
                    continue;
                }

                let impact = Pose {
                    pos: abs_poi,
                    theta: 0.0,
                };
                let event = CollisionEvent {
                    impact_time: now,
                    vehicles: [
                        VehicleCollisionInfo {
                            id: i,
                            poi: impact.relative_to(a.pose).pos,
                        },
                        VehicleCollisionInfo {
                            id: j,
                            poi: impact.relative_to(b.pose).pos,
                        },
                    ],
                };
                log::info!(
                    "Collision at {}: vehicles {} and {} at ({:.4}, {:.4})",
                    now,
                    i,
                    j,
                    abs_poi.x,
                    abs_poi.y
                );
                self.current.insert(pair, event);
                // replaces any unread "new" event for the pair
                self.new.insert(pair, event);
            }
        }
    }
}

impl VehicleCollider for CollisionDetector {
    fn new_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.new).into_values().collect()
    }

    fn current_collisions(&self) -> Vec<CollisionEvent> {
        self.current.values().copied().collect()
    }

    fn update(&mut self, now: SimTime, track: &Track, vehicles: &[Vehicle]) {
        let inputs: Vec<_> = vehicles
            .iter()
            .map(|veh| {
                let tp = veh.cur_track_pose();
                CollisionInputs {
                    dofs: tp.dofs,
                    pose: track.to_cartesian_pose(tp),
                    length: veh.length(),
                    width: veh.width(),
                }
            })
            .collect();
        self.update_from_inputs(now, track, &inputs);
    }
}

/// World-space point where two vehicle rectangles touch, if they do.
///
/// Each vehicle in turn is the reference: the other's corners that fall
/// inside the reference rectangle are collected. The result is the average
/// of every collected corner.
pub(crate) fn point_of_impact(vehicles: [CollisionInputs; 2]) -> Option<Point> {
    let mut sum = Point::ZERO;
    let mut count = 0u32;
    for (reference, other) in [(0, 1), (1, 0)] {
        for corner in vehicles[other].corners() {
            if vehicles[reference].contains(corner) {
                sum += corner;
                count += 1;
            }
        }
    }
    (count > 0).then(|| sum / count as f64)
}
