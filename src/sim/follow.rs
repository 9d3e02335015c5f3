//! Leader/follower formation driving
//!
//! A [`Follower`] periodically commands one vehicle to hold a fixed position
//! relative to another. Chaining followers builds multi-vehicle formations.

use super::system::System;
use crate::consts::DEFAULT_UTURN_RADIUS;
use crate::track::Track;
use crate::units::{Meters, MetersPerSec, MetersPerSec2, SimTime};

/// Distance offset error considered "in position"
const DOFS_NEAR: Meters = 0.010;
/// Center offset error considered "in position"
const COFS_NEAR: Meters = 0.002;

const MAJOR_CATCHUP: f64 = 1.25;
const MAJOR_FALLBACK: f64 = 0.75;
const MINOR_CATCHUP: f64 = 1.05;
const MINOR_FALLBACK: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct Follower {
    leader: usize,
    follower: usize,
    /// Signed path distance from leader to follower, in the leader's driving
    /// direction. Negative means behind.
    target_delta_dofs: Meters,
    /// Signed lateral offset from leader to follower, in the leader's drive
    /// frame
    target_delta_cofs: Meters,
    accel: MetersPerSec2,
    cofs_speed: MetersPerSec,
    track_length: Meters,
    track_width: Meters,
    adjust_period: SimTime,
    next_update: SimTime,
}

impl Follower {
    /// Follow with default acceleration (1 m/s²), lateral speed (0.1 m/s) and
    /// a 100 ms adjustment period. The first adjustment happens at `now`.
    ///
    /// # Panics
    /// If either vehicle index is invalid, the two are the same vehicle, or a
    /// target is out of range (see [`Follower::set_target_delta_dofs`]).
    pub fn new(
        sys: &System,
        leader: usize,
        follower: usize,
        target_delta_dofs: Meters,
        target_delta_cofs: Meters,
    ) -> Self {
        sys.vehicle(leader);
        sys.vehicle(follower);
        assert!(leader != follower, "Follower: vehicle {} cannot follow itself", leader);

        let track: &Track = sys.track();
        let mut f = Self {
            leader,
            follower,
            target_delta_dofs: 0.0,
            target_delta_cofs: 0.0,
            accel: 1.0,
            cofs_speed: 0.1,
            track_length: track.center_length(),
            track_width: track.width(),
            adjust_period: SimTime::from_millis(100),
            next_update: sys.now(),
        };
        f.set_target_delta_dofs(target_delta_dofs);
        f.set_target_delta_cofs(target_delta_cofs);
        f
    }

    pub fn with_accel(mut self, accel: MetersPerSec2, cofs_speed: MetersPerSec) -> Self {
        self.accel = accel;
        self.cofs_speed = cofs_speed;
        self
    }

    pub fn with_adjust_period(mut self, period: SimTime) -> Self {
        self.adjust_period = period;
        self
    }

    pub fn leader(&self) -> usize {
        self.leader
    }

    pub fn follower(&self) -> usize {
        self.follower
    }

    pub fn target_delta_dofs(&self) -> Meters {
        self.target_delta_dofs
    }

    pub fn target_delta_cofs(&self) -> Meters {
        self.target_delta_cofs
    }

    /// # Panics
    /// If `|target|` is half the track's center length or more.
    pub fn set_target_delta_dofs(&mut self, target: Meters) {
        assert!(
            target.abs() < self.track_length / 2.0,
            "Follower: target delta dofs {} is too large; must be less than {}",
            target,
            self.track_length / 2.0
        );
        self.target_delta_dofs = target;
    }

    /// # Panics
    /// If `|target|` exceeds the track width.
    pub fn set_target_delta_cofs(&mut self, target: Meters) {
        assert!(
            target.abs() <= self.track_width,
            "Follower: target delta cofs {} is too large; must be at most {}",
            target,
            self.track_width
        );
        self.target_delta_cofs = target;
    }

    /// Issue new follower commands if an adjustment is due. Returns true if
    /// the follower is near its target position.
    pub fn update(&mut self, sys: &mut System) -> bool {
        let track = sys.track();
        let leader = sys.vehicle(self.leader);
        let follower = sys.vehicle(self.follower);
        let lpose = leader.cur_track_pose();
        let fpose = follower.cur_track_pose();

        let dofs_err = track.driving_delta_distance(lpose, fpose.dofs) - self.target_delta_dofs;
        let cofs_err = track.driving_delta_cofs(lpose, follower.cmd_track_cofs()) - self.target_delta_cofs;
        let is_near = dofs_err.abs() <= DOFS_NEAR && cofs_err.abs() <= COFS_NEAR;

        let now = sys.now();
        if now < self.next_update {
            return is_near;
        }
        self.next_update = now + self.adjust_period;

        if follower.is_facing_trackwise() != leader.is_facing_trackwise() {
            log::debug!("Follower {}: u-turn to match leader {}", self.follower, self.leader);
            sys.vehicle_mut(self.follower).cmd_uturn(DEFAULT_UTURN_RADIUS);
            return false;
        }

        // Match the leader's dofs rate, even on a different lane of a curve
        let piece = track.piece(track.piece_index_at(track.normalize_dofs(lpose.dofs)));
        let mut speed = leader.cur_drive_speed();
        if !piece.is_straight() {
            speed *= piece.curve_radius(fpose.cofs) / piece.curve_radius(lpose.cofs);
        }
        if dofs_err > DOFS_NEAR {
            speed *= MAJOR_FALLBACK;
        } else if dofs_err < -DOFS_NEAR {
            speed *= MAJOR_CATCHUP;
        } else if dofs_err > 0.0 {
            speed *= MINOR_FALLBACK;
        } else if dofs_err < 0.0 {
            speed *= MINOR_CATCHUP;
        }
        let cofs_cmd = leader.cur_drive_cofs() + self.target_delta_cofs;

        let (accel, cofs_speed) = (self.accel, self.cofs_speed);
        let veh = sys.vehicle_mut(self.follower);
        veh.set_cmd_drive_speed(speed, accel);
        if cofs_err.abs() > COFS_NEAR {
            veh.set_cmd_drive_cofs(cofs_cmd, cofs_speed);
        }
        is_near
    }
}
