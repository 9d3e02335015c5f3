//! Vehicle motion simulation
//!
//! The ideal simulator has no motor limits, no lateral drift and no lag
//! between desired and actual motion. Given the same commands and tick count
//! it always reproduces the same trajectory.

use super::vehicle::Vehicle;
use crate::track::{Track, TrackPose, TrackVel};
use crate::units::SimTime;

/// Advances every vehicle on a track by one fixed time step
pub trait Simulator {
    fn tick(&mut self, dt: SimTime, track: &Track, vehicles: &mut [Vehicle]);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdealSimulator;

impl IdealSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Simulator for IdealSimulator {
    fn tick(&mut self, dt: SimTime, track: &Track, vehicles: &mut [Vehicle]) {
        let dt = dt.as_secs_f64();
        for veh in vehicles.iter_mut() {
            step_vehicle(dt, track, veh);
        }
    }
}

fn step_vehicle(dt: f64, track: &Track, veh: &mut Vehicle) {
    let pose = veh.cur_track_pose();
    let piece = track.piece(track.piece_index_at(track.normalize_dofs(pose.dofs)));

    // Ramp distance speed toward the command at constant acceleration
    let start_speed = veh.des_speed;
    let max_change = dt * veh.cmd_accel;
    let speed = if (start_speed - veh.cmd_speed).abs() <= max_change {
        veh.cmd_speed
    } else if start_speed < veh.cmd_speed {
        start_speed + max_change
    } else {
        start_speed - max_change
    };

    // Average speed over the tick; equals v*dt + a*dt^2/2 while ramping the
    // whole tick, and runs short on a tick where the ramp ends
    let delta_fwd = 0.5 * (start_speed + speed) * dt;
    let mut delta_dofs = delta_fwd;
    if !piece.is_straight() {
        // dofs is measured along road center
        delta_dofs *= piece.curve_radius(0.0) / piece.curve_radius(pose.cofs);
    }

    // Move the lateral offset toward the (clamped) command, without overshoot
    let max_cofs = track.max_lateral_offset();
    veh.cmd_cofs = veh.cmd_cofs.clamp(-max_cofs, max_cofs);
    let cofs_speed = veh.cmd_cofs_speed.abs();
    let max_delta_cofs = dt * cofs_speed;
    let mut cofs = veh.des_cofs;
    let mut center_vel = 0.0;
    let mut abs_delta_cofs = 0.0;
    if cofs < veh.cmd_cofs {
        center_vel = cofs_speed;
        abs_delta_cofs = max_delta_cofs.min(veh.cmd_cofs - cofs);
        cofs += abs_delta_cofs;
    } else if cofs > veh.cmd_cofs {
        center_vel = -cofs_speed;
        abs_delta_cofs = max_delta_cofs.min(cofs - veh.cmd_cofs);
        cofs -= abs_delta_cofs;
    }

    let (distance_vel, dofs) = if veh.is_facing_trackwise() {
        (speed, pose.dofs + delta_dofs)
    } else {
        (-speed, pose.dofs - delta_dofs)
    };

    // Heading follows the velocity; hold it while stopped
    let delta_angle = if speed > 0.0 {
        center_vel.atan2(distance_vel)
    } else {
        pose.delta_angle
    };

    veh.des_speed = speed;
    veh.des_cofs = cofs;
    let path_length = delta_fwd.hypot(abs_delta_cofs);
    veh.apply_motion(
        TrackPose::new(track.normalize_dofs(dofs), cofs, delta_angle),
        TrackVel {
            distance: distance_vel,
            center: center_vel,
        },
        path_length,
    );
}
