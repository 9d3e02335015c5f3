//! Vehicles: physical type plus robotics state
//!
//! Abbreviations used in names:
//! - `cmd`: commanded (eventual) value
//! - `des`: desired value at this moment
//! - `cur`: current value at this moment
//!
//! "Drive" values are measured in the vehicle's own driving direction, so a
//! positive drive cofs is left of center from the driver's seat. "Track"
//! values are in fixed track coordinates.

use std::fmt;

use crate::error::SetupError;
use crate::track::{TrackPose, TrackVel, is_facing_trackwise, normalize_cyclic};
use crate::units::{Grams, Meters, MetersPerSec, MetersPerSec2};

/// Physical properties shared by every vehicle of one type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleTypeInfo {
    /// Two-letter lowercase code, e.g. "gs"
    pub code: &'static str,
    pub full_name: &'static str,
    /// Shell color (RGB)
    pub color: [u8; 3],
    pub width: Meters,
    pub length: Meters,
    pub mass: Grams,
}

const fn info(
    code: &'static str,
    full_name: &'static str,
    color: [u8; 3],
    length: Meters,
) -> VehicleTypeInfo {
    VehicleTypeInfo {
        code,
        full_name,
        color,
        width: 0.044,
        length,
        mass: 40.0,
    }
}

const VEHICLE_TYPES: [VehicleTypeInfo; 12] = [
    info("gs", "Groundshock", [65, 105, 225], 0.08),
    info("sk", "Skull", [47, 79, 79], 0.08),
    info("nk", "Nuke", [50, 205, 50], 0.08),
    info("th", "Thermo", [255, 69, 0], 0.08),
    info("gu", "Guardian", [135, 206, 235], 0.08),
    info("bb", "BigBang", [46, 139, 87], 0.08),
    info("fw", "Freewheel", [0, 255, 0], 0.24),
    info("xr", "X52", [255, 0, 0], 0.24),
    info("xi", "X52Ice", [255, 255, 255], 0.24),
    info("dy", "Dynamo", [169, 169, 169], 0.08),
    info("mm", "Mammoth", [176, 196, 222], 0.08),
    info("np", "NukePhantom", [248, 248, 255], 0.08),
];

/// Vehicle type (model), identified by a two-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleType(usize);

impl VehicleType {
    /// Look up a vehicle type by its two-letter code (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, SetupError> {
        let lower = code.to_lowercase();
        VEHICLE_TYPES
            .iter()
            .position(|vt| vt.code == lower)
            .map(VehicleType)
            .ok_or_else(|| SetupError::UnknownVehicleType {
                code: code.to_string(),
                valid: Self::help_text(),
            })
    }

    pub fn all() -> impl Iterator<Item = VehicleType> {
        (0..VEHICLE_TYPES.len()).map(VehicleType)
    }

    /// One line per type: code and full name
    pub fn help_text() -> String {
        VEHICLE_TYPES
            .iter()
            .map(|vt| format!("  {}  {}\n", vt.code, vt.full_name))
            .collect()
    }

    pub fn info(&self) -> &'static VehicleTypeInfo {
        &VEHICLE_TYPES[self.0]
    }

    pub fn code(&self) -> &'static str {
        self.info().code
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Robotics state of one vehicle. Holds no game-specific state such as lap
/// counts or speed limits.
#[derive(Debug, Clone)]
pub struct Vehicle {
    vtype: VehicleType,
    /// Center length of the track the vehicle drives on
    track_length: Meters,

    /// Total path length driven since creation
    odom: Meters,
    cur_pose: TrackPose,
    cur_vel: TrackVel,

    /// Distance speed (unsigned) and acceleration
    pub(crate) cmd_speed: MetersPerSec,
    pub(crate) cmd_accel: MetersPerSec2,
    pub(crate) des_speed: MetersPerSec,

    /// Center offset (track frame) and lateral speed for lane changes
    pub(crate) cmd_cofs: Meters,
    pub(crate) cmd_cofs_speed: MetersPerSec,
    pub(crate) des_cofs: Meters,
}

impl Vehicle {
    /// New vehicle, idle at the finish line, facing trackwise
    pub fn new(vtype: VehicleType, track_length: Meters) -> Self {
        Self {
            vtype,
            track_length,
            odom: 0.0,
            cur_pose: TrackPose::default(),
            cur_vel: TrackVel::default(),
            cmd_speed: 0.0,
            cmd_accel: 0.1,
            des_speed: 0.0,
            cmd_cofs: 0.0,
            cmd_cofs_speed: 0.1,
            des_cofs: 0.0,
        }
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vtype
    }

    pub fn width(&self) -> Meters {
        self.vtype.info().width
    }

    pub fn length(&self) -> Meters {
        self.vtype.info().length
    }

    pub fn mass(&self) -> Grams {
        self.vtype.info().mass
    }

    pub fn color(&self) -> [u8; 3] {
        self.vtype.info().color
    }

    /// Odometer: total meters driven since creation
    pub fn odom(&self) -> Meters {
        self.odom
    }

    pub fn cur_track_pose(&self) -> TrackPose {
        self.cur_pose
    }

    pub fn cur_track_vel(&self) -> TrackVel {
        self.cur_vel
    }

    /// True if facing the track's natural forward direction. When moving,
    /// this is also the direction of travel.
    ///
    /// # Panics
    /// If the pose's delta angle is outside [-π, π].
    pub fn is_facing_trackwise(&self) -> bool {
        is_facing_trackwise(self.cur_pose.delta_angle)
    }

    /// Current distance speed in the driving direction; always >= 0
    pub fn cur_drive_speed(&self) -> MetersPerSec {
        self.cur_vel.distance.abs()
    }

    /// Commanded distance speed in the driving direction; always >= 0
    pub fn cmd_drive_speed(&self) -> MetersPerSec {
        self.cmd_speed
    }

    pub fn cmd_drive_accel(&self) -> MetersPerSec2 {
        self.cmd_accel
    }

    pub fn cmd_drive_cofs(&self) -> Meters {
        self.to_drive_frame(self.cmd_cofs)
    }

    /// Distance offset from the finish line, measured in the driving
    /// direction
    pub fn cur_drive_dofs(&self) -> Meters {
        if self.is_facing_trackwise() {
            self.cur_pose.dofs
        } else {
            normalize_cyclic(self.track_length - self.cur_pose.dofs, self.track_length)
        }
    }

    /// Road-center distance left to the finish line, in the driving direction
    pub fn cur_drive_dofs_remaining(&self) -> Meters {
        if self.is_facing_trackwise() {
            self.track_length - self.cur_pose.dofs
        } else {
            self.cur_pose.dofs
        }
    }

    pub fn cur_drive_cofs(&self) -> Meters {
        self.to_drive_frame(self.cur_pose.cofs)
    }

    pub fn cmd_track_cofs(&self) -> Meters {
        self.cmd_cofs
    }

    pub fn cur_track_cofs(&self) -> Meters {
        self.cur_pose.cofs
    }

    fn to_drive_frame(&self, cofs: Meters) -> Meters {
        if self.is_facing_trackwise() { cofs } else { -cofs }
    }

    /// Move the vehicle instantly, as if picked up and put down. Resets the
    /// lateral offset command to the new position; the speed command is kept.
    pub fn reposition(&mut self, pose: TrackPose) {
        self.cur_pose = pose;
        self.des_cofs = pose.cofs;
        self.cmd_cofs = pose.cofs;
    }

    /// Command a distance speed and acceleration in the current driving
    /// direction. Both are magnitudes.
    pub fn set_cmd_drive_speed(&mut self, speed: MetersPerSec, accel: MetersPerSec2) {
        self.cmd_speed = speed.abs();
        self.cmd_accel = accel.abs();
    }

    /// Command a center offset (drive frame) and the lateral speed to reach it
    pub fn set_cmd_drive_cofs(&mut self, cofs: Meters, speed: MetersPerSec) {
        self.cmd_cofs = self.to_drive_frame(cofs);
        self.cmd_cofs_speed = speed;
    }

    /// Command a center offset (track frame) and the lateral speed to reach it
    pub fn set_cmd_track_cofs(&mut self, cofs: Meters, speed: MetersPerSec) {
        self.cmd_cofs = cofs;
        self.cmd_cofs_speed = speed;
    }

    /// U-turn toward road center. Instantaneous: the lateral offset moves by
    /// the turn diameter and the facing flips.
    pub fn cmd_uturn(&mut self, radius: Meters) {
        let mut pose = self.cur_pose;
        if pose.cofs < 0.0 {
            pose.cofs += 2.0 * radius;
        } else {
            pose.cofs -= 2.0 * radius;
        }
        pose.delta_angle = if self.is_facing_trackwise() {
            std::f64::consts::PI
        } else {
            0.0
        };
        self.reposition(pose);
    }

    /// Apply one tick of simulated motion
    pub(crate) fn apply_motion(&mut self, pose: TrackPose, vel: TrackVel, path_length: Meters) {
        self.cur_pose = pose;
        self.cur_vel = vel;
        self.odom += path_length;
    }
}
