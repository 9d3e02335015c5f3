//! Track regions: rectangles in track space
//!
//! A region starts at corner `c1` and extends trackwise by `length` and
//! leftwards (+cofs) by `width`. Over curved pieces it bends with the track.
//! Regions may wrap past the finish line and may be wider than the track.

use std::fmt;

use super::coord::{TrackPoint, normalize_cyclic};
use super::layout::Track;
use crate::units::Meters;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    c1: TrackPoint,
    length: Meters,
    width: Meters,
    /// Center length of the track the region was built on
    track_length: Meters,
}

impl Region {
    /// # Panics
    /// If `c1.dofs` is outside `[0, track.center_length())`, or `length` or
    /// `width` is not positive.
    pub fn new(track: &Track, c1: TrackPoint, length: Meters, width: Meters) -> Self {
        let track_length = track.center_length();
        assert!(c1.dofs >= 0.0, "Region: c1.dofs={} invalid; must be >= 0", c1.dofs);
        assert!(
            c1.dofs < track_length,
            "Region: c1.dofs={} invalid; must be < track center length {}",
            c1.dofs,
            track_length
        );
        assert!(length > 0.0, "Region: length={length} invalid; must be > 0");
        assert!(width > 0.0, "Region: width={width} invalid; must be > 0");
        Self {
            c1,
            length,
            width,
            track_length,
        }
    }

    /// Start corner; inside the region
    pub fn c1(&self) -> TrackPoint {
        self.c1
    }

    /// End corner, with dofs normalized; just outside the region
    pub fn c2(&self) -> TrackPoint {
        TrackPoint::new(
            normalize_cyclic(self.c1.dofs + self.length, self.track_length),
            self.c1.cofs + self.width,
        )
    }

    pub fn length(&self) -> Meters {
        self.length
    }

    pub fn width(&self) -> Meters {
        self.width
    }

    pub fn crosses_finish_line(&self) -> bool {
        self.c1.dofs + self.length >= self.track_length
    }

    /// True if `p` is inside `[c1, c2)` on both axes. `p.dofs` may be outside
    /// `[0, track length)`; it is normalized first.
    pub fn contains_point(&self, p: TrackPoint) -> bool {
        if p.cofs < self.c1.cofs || p.cofs >= self.c1.cofs + self.width {
            return false;
        }
        if self.length >= self.track_length {
            return true;
        }

        let dofs = normalize_cyclic(p.dofs, self.track_length);
        if self.crosses_finish_line() {
            dofs >= self.c1.dofs || dofs < self.c2().dofs
        } else {
            dofs >= self.c1.dofs && dofs < self.c1.dofs + self.length
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region{{c1: ({:.3}, {:.3}), length: {:.3}, width: {:.3}}}",
            self.c1.dofs, self.c1.cofs, self.length, self.width
        )
    }
}
