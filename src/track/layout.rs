//! Track: a closed loop of road pieces and the conversions between track
//! space and Cartesian world space
//!
//! The finish line is always at the world origin, facing +X. Piece entry
//! poses and entry distance offsets are precomputed once at construction; the
//! track is read-only afterwards.

use serde::Serialize;

use super::coord::{TrackPose, is_facing_trackwise, normalize_cyclic};
use super::road_piece::RoadPiece;
use crate::consts::{TRACK_METERS_TOL, TRACK_RADIANS_TOL};
use crate::error::SetupError;
use crate::geom::{Point, Pose};
use crate::units::Meters;

#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Total width, including border lanes
    width: Meters,
    /// Maximum |cofs| a vehicle can have
    max_cofs: Meters,
    /// In trackwise driving order; the finish line is the start of pieces[0]
    pieces: Vec<RoadPiece>,
    /// Road-center entry pose of each piece, plus the closing pose
    entry_poses: Vec<Pose>,
    /// Distance offset at each piece entry, plus the total center length
    entry_dofs: Vec<Meters>,
    min_corner: Point,
    max_corner: Point,
}

impl Track {
    /// Build a track from consecutive road pieces.
    ///
    /// `max_cofs == 0` means `width / 2`. Fails if there are fewer than four
    /// pieces, the width is not positive, `max_cofs` is negative or reaches
    /// the center radius of a curve, or driving every piece along road center
    /// does not return to the start pose.
    pub fn new(width: Meters, max_cofs: Meters, pieces: Vec<RoadPiece>) -> Result<Self, SetupError> {
        let count = pieces.len();
        if count < 4 {
            return Err(SetupError::TooFewPieces(count));
        }
        if width <= 0.0 || !width.is_finite() {
            return Err(SetupError::InvalidWidth(width));
        }
        if max_cofs < 0.0 || !max_cofs.is_finite() {
            return Err(SetupError::InvalidMaxCofs(max_cofs));
        }
        let max_cofs = if max_cofs == 0.0 { width / 2.0 } else { max_cofs };
        // Inner lane radius (and so lane length) must stay positive
        let tightest = pieces
            .iter()
            .filter(|piece| !piece.is_straight())
            .map(|piece| piece.curve_radius(0.0))
            .fold(f64::INFINITY, f64::min);
        if max_cofs >= tightest {
            return Err(SetupError::MaxCofsExceedsCurveRadius {
                max_cofs,
                radius: tightest,
            });
        }

        let mut entry_poses = Vec::with_capacity(count + 1);
        let mut entry_dofs = Vec::with_capacity(count + 1);
        entry_poses.push(Pose::ORIGIN);
        entry_dofs.push(0.0);
        for (i, piece) in pieces.iter().enumerate() {
            entry_dofs.push(entry_dofs[i] + piece.length(0.0));
            entry_poses.push(entry_poses[i].advance(piece.delta_pose()));
        }

        // World bounds come from the road edges at every piece boundary
        let mut min_corner = Point::splat(f64::INFINITY);
        let mut max_corner = Point::splat(f64::NEG_INFINITY);
        for entry in &entry_poses[..count] {
            for side in [-0.5, 0.5] {
                let edge = entry.advance(Pose::offset(0.0, side * width)).pos;
                min_corner = min_corner.min(edge);
                max_corner = max_corner.max(edge);
            }
        }

        let begin = entry_poses[0];
        let end = entry_poses[count];
        if !begin.is_near(&end, TRACK_METERS_TOL, TRACK_RADIANS_TOL) {
            return Err(SetupError::NotALoop { begin, end });
        }

        let track = Self {
            width,
            max_cofs,
            pieces,
            entry_poses,
            entry_dofs,
            min_corner,
            max_corner,
        };
        log::info!(
            "Track: {} pieces, center length {:.4} m, bounds {:?} .. {:?}",
            count,
            track.center_length(),
            track.min_corner,
            track.max_corner
        );
        Ok(track)
    }

    #[inline]
    pub fn width(&self) -> Meters {
        self.width
    }

    /// Maximum allowed |cofs|. May be more or less than `width() / 2`.
    #[inline]
    pub fn max_lateral_offset(&self) -> Meters {
        self.max_cofs
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn pieces(&self) -> &[RoadPiece] {
        &self.pieces
    }

    /// Track length along road center
    #[inline]
    pub fn center_length(&self) -> Meters {
        self.entry_dofs[self.pieces.len()]
    }

    /// Total driving path length along a given lateral offset
    pub fn length(&self, cofs: Meters) -> Meters {
        self.pieces.iter().map(|rp| rp.length(cofs)).sum()
    }

    /// Bottom-left corner of the rectangle enclosing the track
    pub fn min_corner(&self) -> Point {
        self.min_corner
    }

    /// Upper-right corner of the rectangle enclosing the track
    pub fn max_corner(&self) -> Point {
        self.max_corner
    }

    fn assert_valid_piece_index(&self, i: usize) {
        assert!(
            i < self.pieces.len(),
            "piece index {} is not valid for track with only {} pieces",
            i,
            self.pieces.len()
        );
    }

    fn assert_valid_dofs(&self, dofs: Meters) {
        assert!(dofs >= 0.0, "dofs={dofs} is invalid, must be >= 0");
        assert!(
            dofs <= self.center_length(),
            "dofs={} is invalid, must be <= track center length {}",
            dofs,
            self.center_length()
        );
    }

    /// # Panics
    /// If `i >= piece_count()`.
    pub fn piece(&self, i: usize) -> &RoadPiece {
        self.assert_valid_piece_index(i);
        &self.pieces[i]
    }

    /// Distance offset at the trackwise entry of a piece
    ///
    /// # Panics
    /// If `i >= piece_count()`.
    pub fn piece_entry_dofs(&self, i: usize) -> Meters {
        self.assert_valid_piece_index(i);
        self.entry_dofs[i]
    }

    /// Road-center pose on entering a piece, driving trackwise. An index equal
    /// to `piece_count()` wraps around to the finish line.
    ///
    /// # Panics
    /// If `i > piece_count()`.
    pub fn piece_entry_pose(&self, i: usize) -> Pose {
        let i = if i == self.pieces.len() { 0 } else { i };
        self.assert_valid_piece_index(i);
        self.entry_poses[i]
    }

    /// Center of a curved piece's circle of curvature. Straights return their
    /// entry point.
    ///
    /// # Panics
    /// If `i >= piece_count()`.
    pub fn piece_curve_center(&self, i: usize) -> Point {
        let piece = self.piece(i);
        let entry = self.entry_poses[i];
        if piece.is_straight() {
            return entry.pos;
        }
        let mut dy = piece.curve_radius(0.0);
        if piece.turn_angle() < 0.0 {
            dy = -dy;
        }
        entry.advance(Pose::offset(0.0, dy)).pos
    }

    /// Index of the piece containing a distance offset
    ///
    /// # Panics
    /// If `dofs` is outside `[0, center_length()]`.
    pub fn piece_index_at(&self, dofs: Meters) -> usize {
        self.piece_index_and_local_offset(dofs).0
    }

    /// Map a distance offset to the piece containing it and the road-center
    /// distance into that piece (trackwise).
    ///
    /// # Panics
    /// If `dofs` is outside `[0, center_length()]`.
    pub fn piece_index_and_local_offset(&self, dofs: Meters) -> (usize, Meters) {
        self.assert_valid_dofs(dofs);
        let count = self.pieces.len();
        // entry_dofs[0] == 0 <= dofs, so the partition point is at least 1
        let i = self.entry_dofs[..count].partition_point(|&entry| entry <= dofs) - 1;
        // rounding can push the local offset just past the end of the piece
        let local = (dofs - self.entry_dofs[i]).min(self.pieces[i].center_length());
        (i, local)
    }

    /// Wrap a distance offset into `[0, center_length())`.
    ///
    /// # Panics
    /// If `dofs` is not finite.
    pub fn normalize_dofs(&self, dofs: Meters) -> Meters {
        normalize_cyclic(dofs, self.center_length())
    }

    /// Convert a track pose to a Cartesian world pose.
    ///
    /// # Panics
    /// If `dofs` is not finite or `|delta_angle| > π`.
    pub fn to_cartesian_pose(&self, tp: TrackPose) -> Pose {
        is_facing_trackwise(tp.delta_angle);
        let dofs = self.normalize_dofs(tp.dofs);
        let (i, local) = self.piece_index_and_local_offset(dofs);
        let piece = &self.pieces[i];

        let fraction = local / piece.center_length();
        let mut pose = self.entry_poses[i].advance(piece.partial_delta_pose(fraction));
        pose = pose.advance(Pose::offset(0.0, tp.cofs));
        pose.theta = crate::normalize_angle(pose.theta + tp.delta_angle);
        pose
    }

    /// # Panics
    /// If `|delta_angle| > π`.
    pub fn driving_direction_is_trackwise(&self, delta_angle: f64) -> bool {
        is_facing_trackwise(delta_angle)
    }

    /// Shortest distance between two distance offsets around the loop.
    /// Symmetric, and always in `[0, center_length() / 2]`.
    pub fn shortest_cyclic_distance(&self, dofs1: Meters, dofs2: Meters) -> Meters {
        let len = self.center_length();
        let d = (self.normalize_dofs(dofs1) - self.normalize_dofs(dofs2)).abs();
        d.min(len - d)
    }

    /// Distance offset to cover to reach `dofs`, driving in the direction the
    /// pose faces. A target just behind the pose needs most of a lap.
    /// Always in `[0, center_length())`.
    pub fn distance_to_reach_driving_forward(&self, pose: TrackPose, dofs: Meters) -> Meters {
        if is_facing_trackwise(pose.delta_angle) {
            self.normalize_dofs(dofs - pose.dofs)
        } else {
            self.normalize_dofs(pose.dofs - dofs)
        }
    }

    /// Path length needed to drive from `pose` to `dofs` at lateral offset
    /// `pose.cofs`, in the direction the pose faces. Scales by curve radius
    /// through every piece crossed. Always >= 0.
    ///
    /// # Panics
    /// If either distance offset is outside `[0, center_length()]` or
    /// `|pose.delta_angle| > π`.
    pub fn driving_distance(&self, pose: TrackPose, dofs: Meters) -> Meters {
        self.assert_valid_dofs(pose.dofs);
        self.assert_valid_dofs(dofs);
        // center_length() and 0 are the same point on the loop
        let (mut from, mut to) = (self.normalize_dofs(pose.dofs), self.normalize_dofs(dofs));
        if !is_facing_trackwise(pose.delta_angle) {
            std::mem::swap(&mut from, &mut to);
        }
        let (i1, local1) = self.piece_index_and_local_offset(from);
        let (i2, local2) = self.piece_index_and_local_offset(to);

        if i1 == i2 && to >= from {
            let piece = &self.pieces[i1];
            let mut dist = to - from;
            if !piece.is_straight() {
                dist *= piece.curve_radius(pose.cofs) / piece.curve_radius(0.0);
            }
            return dist;
        }

        let count = self.pieces.len();
        let mut span = (i2 + count - i1) % count;
        if span == 0 {
            span = count;
        }
        let mut dist = 0.0;
        for step in 0..span {
            let piece = &self.pieces[(i1 + step) % count];
            if step == 0 {
                dist += piece.length(pose.cofs) * ((piece.center_length() - local1) / piece.center_length());
            } else {
                dist += piece.length(pose.cofs);
            }
        }
        let last = &self.pieces[i2];
        dist + last.length(pose.cofs) * (local2 / last.center_length())
    }

    /// Like [`Track::driving_distance`], but a target more than half a lap
    /// ahead (at `pose.cofs`) counts as behind, giving a negative result.
    /// Bounded by `length(pose.cofs) / 2` in magnitude.
    pub fn driving_delta_distance(&self, pose: TrackPose, dofs: Meters) -> Meters {
        let len = self.length(pose.cofs);
        let dd = self.driving_distance(pose, dofs);
        if dd > len / 2.0 { dd - len } else { dd }
    }

    /// Signed distance offset from `pose` to `dofs`, with the pose as origin
    /// and its facing as forward. Targets more than half a lap ahead count as
    /// behind. Bounded by `center_length() / 2` in magnitude.
    pub fn driving_delta_dofs(&self, pose: TrackPose, dofs: Meters) -> Meters {
        let ahead = self.distance_to_reach_driving_forward(pose, dofs);
        if ahead > self.center_length() / 2.0 {
            ahead - self.center_length()
        } else {
            ahead
        }
    }

    /// Signed lateral offset from `pose` to `cofs`, with positive to the left
    /// of the pose's facing. Flips sign when facing counter-trackwise.
    pub fn driving_delta_cofs(&self, pose: TrackPose, cofs: Meters) -> Meters {
        let delta = cofs - pose.cofs;
        if is_facing_trackwise(pose.delta_angle) {
            delta
        } else {
            -delta
        }
    }
}
