//! Track geometry
//!
//! A track is one closed loop of road pieces. Positions on it are expressed
//! in track space (see [`coord`]) and converted to world space on demand.

pub mod catalog;
pub mod coord;
pub mod layout;
pub mod region;
pub mod road_piece;

pub use catalog::{MAX_STRAIGHT_REPEAT, custom_track_names, starter_kit_track_names};
pub use coord::{TrackPoint, TrackPose, TrackVel, is_facing_trackwise, normalize_cyclic};
pub use layout::Track;
pub use region::Region;
pub use road_piece::RoadPiece;
