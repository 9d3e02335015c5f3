//! Ready-made tracks
//!
//! - Modular tracks from topology strings of `S`/`L`/`R` tokens
//! - The starter-kit layouts, by name, with direction and straight-run variants
//! - A handful of custom layouts built from non-modular pieces

use std::f64::consts::{FRAC_PI_4, PI};

use super::layout::Track;
use super::road_piece::RoadPiece;
use crate::consts::{MOD_CURVE_LEN, MOD_START_LONG_LEN, MOD_START_SHORT_LEN, MOD_STRAIGHT_LEN};
use crate::error::SetupError;
use crate::units::{Meters, TURN_90_LEFT, TURN_90_RIGHT};

/// Starter-kit topologies. `cap` is shorthand for `microloop`.
const STARTER_KIT_TRACKS: &[(&str, &str)] = &[
    ("cap", "SLLSLL"),
    ("lcap", "SLLSLL"),
    ("rcap", "SRRSRR"),
    ("microloop", "SLLSLL"),
    ("lmicroloop", "SLLSLL"),
    ("rmicroloop", "SRRSRR"),
    ("capsule", "SLLSSLLS"),
    ("lcapsule", "SLLSSLLS"),
    ("rcapsule", "SRRSSRRS"),
    ("quadra", "SLSLSLSL"),
    ("lquadra", "SLSLSLSL"),
    ("rquadra", "SRSRSRSR"),
    ("point", "SLSLSLRLLS"),
    ("lpoint", "SLSLSLRLLS"),
    ("rpoint", "SRSRSRLRRS"),
    ("wedge", "SLSLLRLL"),
    ("lwedge", "SLSLLRLL"),
    ("rwedge", "SRSRRLRR"),
    ("hook", "SSLSLLRSLL"),
    ("lhook", "SSLSLLRSLL"),
    ("rhook", "SSRSRRLSRR"),
    ("overpass", "SLLLSRRR"),
    ("loverpass", "SLLLSRRR"),
    ("roverpass", "SRRRSLLL"),
    ("loopback", "SLSRRRSSLL"),
    ("lloopback", "SLSRRRSSLL"),
    ("rloopback", "SRSLLLSSRR"),
];

/// Largest straight repeat count a starter-kit name can ask for
pub const MAX_STRAIGHT_REPEAT: usize = 16;

const CUSTOM_TRACKS: &[&str] = &[
    "go",
    "minicap",
    "miniocto",
    "miniquadra",
    "minirhom",
    "minitrap",
    "oval",
    "triangle",
];

/// Sorted names accepted by [`Track::starter_kit`], without the `_N` suffix
pub fn starter_kit_track_names() -> Vec<&'static str> {
    let mut names: Vec<_> = STARTER_KIT_TRACKS.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names
}

/// Sorted names accepted by [`Track::custom`]
pub fn custom_track_names() -> Vec<&'static str> {
    CUSTOM_TRACKS.to_vec()
}

impl Track {
    /// Build a track from standard modular pieces:
    /// - `S`: straight
    /// - `L`: 90-degree left turn
    /// - `R`: 90-degree right turn
    ///
    /// The first token must be `S`; it becomes the short half of the start
    /// piece, and the long half is appended as the last road piece. So
    /// `"SRRSSRRS"` is a right capsule of nine pieces.
    pub fn modular(width: Meters, max_cofs: Meters, topology: &str) -> Result<Track, SetupError> {
        let mut tokens = topology.chars();
        match tokens.next() {
            None => return Err(SetupError::EmptyTopology),
            Some('S') => {}
            Some(_) => return Err(SetupError::TopologyMustStartStraight(topology.to_string())),
        }

        let mut pieces = Vec::with_capacity(topology.len() + 1);
        pieces.push(RoadPiece::straight(MOD_START_SHORT_LEN));
        for (index, token) in tokens.enumerate() {
            let piece = match token {
                'S' => RoadPiece::straight(MOD_STRAIGHT_LEN),
                'L' => RoadPiece::new(MOD_CURVE_LEN, TURN_90_LEFT),
                'R' => RoadPiece::new(MOD_CURVE_LEN, TURN_90_RIGHT),
                _ => {
                    return Err(SetupError::UnknownTopologyToken {
                        token,
                        index: index + 1,
                        topology: topology.to_string(),
                    });
                }
            };
            pieces.push(piece);
        }
        pieces.push(RoadPiece::straight(MOD_START_LONG_LEN));

        Track::new(width, max_cofs, pieces)
    }

    /// Build one of the starter-kit tracks. The name has the form `name_N`:
    /// - `name`: see [`starter_kit_track_names`]; an `l` or `r` prefix picks
    ///   the direction of the first curve
    /// - `_N` (optional): every straight is repeated N times, for N in
    ///   `1..=MAX_STRAIGHT_REPEAT`. Only some layouts still close with this.
    ///
    /// Names are case-insensitive.
    pub fn starter_kit(width: Meters, max_cofs: Meters, name: &str) -> Result<Track, SetupError> {
        let lower = name.to_lowercase();
        let (base, repeat) = match lower.split_once('_') {
            Some((base, n)) => match n.parse::<usize>() {
                Ok(repeat @ 1..=MAX_STRAIGHT_REPEAT) => (base, repeat),
                _ => return Err(SetupError::UnknownTrackName(name.to_string())),
            },
            None => (lower.as_str(), 1),
        };
        let topology = STARTER_KIT_TRACKS
            .iter()
            .find(|(kit_name, _)| *kit_name == base)
            .map(|(_, topo)| *topo)
            .ok_or_else(|| SetupError::UnknownTrackName(name.to_string()))?;

        let topology = topology.replace('S', &"S".repeat(repeat));
        Track::modular(width, max_cofs, &topology)
    }

    /// Build a track that is not made from the modular pieces. See
    /// [`custom_track_names`].
    pub fn custom(width: Meters, max_cofs: Meters, name: &str) -> Result<Track, SetupError> {
        // "mini" tracks use short straights and 45-degree turns
        let straight = RoadPiece::straight(0.3);
        let curve = RoadPiece::new(0.3, FRAC_PI_4);

        let pieces = match name.to_lowercase().as_str() {
            "miniocto" => [straight, curve].repeat(8),
            "miniquadra" => [straight, straight, curve, curve].repeat(4),
            "minicap" => [[straight; 4], [curve; 4]].concat().repeat(2),
            "minirhom" => [
                &[straight, straight, curve, curve, curve][..],
                &[straight, straight, curve],
            ]
            .concat()
            .repeat(2),
            "minitrap" => [&[straight, straight, curve, curve, curve][..], &[straight, curve]]
                .concat()
                .repeat(2),
            "triangle" => {
                let corner = RoadPiece::new(0.3, PI / 3.0);
                [RoadPiece::straight(1.0), corner, corner].repeat(3)
            }
            "go" => return Track::modular(width, max_cofs, "SSSSLSLSLSRLSRSRRRLLSSSLSLSL"),
            "oval" => {
                let bend = RoadPiece::new(0.45, PI / 3.0);
                vec![
                    RoadPiece::straight(0.30),
                    RoadPiece::straight(1.20),
                    bend,
                    bend,
                    bend,
                    RoadPiece::straight(1.50),
                    bend,
                    bend,
                    bend,
                ]
            }
            _ => return Err(SetupError::UnknownTrackName(name.to_string())),
        };
        Track::new(width, max_cofs, pieces)
    }

    /// Build a track by starter-kit name, then custom name, then as a raw
    /// modular topology string.
    pub fn named(width: Meters, max_cofs: Meters, name: &str) -> Result<Track, SetupError> {
        match Track::starter_kit(width, max_cofs, name) {
            Err(SetupError::UnknownTrackName(_)) => {}
            built => return built,
        }
        match Track::custom(width, max_cofs, name) {
            Err(SetupError::UnknownTrackName(_)) => {}
            built => return built,
        }
        Track::modular(width, max_cofs, name).map_err(|err| match err {
            SetupError::TopologyMustStartStraight(_) | SetupError::UnknownTopologyToken { .. } => {
                SetupError::UnknownTrackName(name.to_string())
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::meters_are_near;

    const WIDTH: Meters = 0.2;

    #[test]
    fn test_modular_piece_layout() {
        let track = Track::modular(WIDTH, 0.0, "SRRSSRRS").unwrap();
        assert_eq!(track.piece_count(), 9);
        assert_eq!(track.piece(0).center_length(), MOD_START_SHORT_LEN);
        assert_eq!(track.piece(8).center_length(), MOD_START_LONG_LEN);
        assert_eq!(track.piece(1).turn_angle(), TURN_90_RIGHT);
        assert!(track.piece(3).is_straight());
        assert_eq!(track.piece(3).center_length(), MOD_STRAIGHT_LEN);
    }

    #[test]
    fn test_modular_errors() {
        assert!(matches!(Track::modular(WIDTH, 0.0, ""), Err(SetupError::EmptyTopology)));
        assert!(matches!(
            Track::modular(WIDTH, 0.0, "LLSSLLSS"),
            Err(SetupError::TopologyMustStartStraight(_))
        ));
        match Track::modular(WIDTH, 0.0, "SLLSXLLS") {
            Err(SetupError::UnknownTopologyToken { token, index, .. }) => {
                assert_eq!(token, 'X');
                assert_eq!(index, 4);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(matches!(
            Track::modular(WIDTH, 0.0, "SLLSLLS"),
            Err(SetupError::NotALoop { .. })
        ));
    }

    #[test]
    fn test_all_starter_kit_tracks_close() {
        for name in starter_kit_track_names() {
            let track = Track::starter_kit(WIDTH, 0.0, name);
            assert!(track.is_ok(), "{name}: {:?}", track.err());
        }
    }

    #[test]
    fn test_all_custom_tracks_close() {
        for name in custom_track_names() {
            let track = Track::custom(WIDTH, 0.0, name);
            assert!(track.is_ok(), "{name}: {:?}", track.err());
        }
    }

    #[test]
    fn test_starter_kit_variants() {
        let capsule = Track::starter_kit(WIDTH, 0.0, "Capsule").unwrap();
        let doubled = Track::starter_kit(WIDTH, 0.0, "capsule_2").unwrap();
        assert_eq!(doubled.piece_count(), capsule.piece_count() + 4);
        assert!(meters_are_near(
            doubled.center_length(),
            capsule.center_length() + 4.0 * MOD_STRAIGHT_LEN,
            1e-9
        ));

        let right = Track::starter_kit(WIDTH, 0.0, "rcapsule").unwrap();
        assert!(meters_are_near(right.center_length(), capsule.center_length(), 1e-9));
        assert!(right.piece(1).turn_angle() < 0.0);

        assert!(matches!(
            Track::starter_kit(WIDTH, 0.0, "figure8"),
            Err(SetupError::UnknownTrackName(_))
        ));
    }

    #[test]
    fn test_starter_kit_repeat_bounds() {
        let max = format!("capsule_{MAX_STRAIGHT_REPEAT}");
        let track = Track::starter_kit(WIDTH, 0.0, &max).unwrap();
        assert_eq!(track.piece_count(), 5 + 4 * MAX_STRAIGHT_REPEAT);

        let too_many = format!("capsule_{}", MAX_STRAIGHT_REPEAT + 1);
        let names = [
            "capsule_0",
            "capsule_1000000000",
            too_many.as_str(),
            "capsule_x",
            "capsule_",
            "capsule_-1",
        ];
        for name in names {
            match Track::starter_kit(WIDTH, 0.0, name) {
                Err(SetupError::UnknownTrackName(got)) => assert_eq!(got, name),
                other => panic!("{name}: unexpected result {other:?}"),
            }
            assert!(matches!(
                Track::named(WIDTH, 0.0, name),
                Err(SetupError::UnknownTrackName(_))
            ));
        }
    }

    #[test]
    fn test_named_lookup_order() {
        let kit = Track::named(WIDTH, 0.0, "quadra").unwrap();
        assert_eq!(kit.piece_count(), 9);
        let custom = Track::named(WIDTH, 0.0, "miniocto").unwrap();
        assert_eq!(custom.piece_count(), 16);
        let raw = Track::named(WIDTH, 0.0, "SSLLSSLL").unwrap();
        assert_eq!(raw.piece_count(), 9);

        assert!(matches!(
            Track::named(WIDTH, 0.0, "nowhere"),
            Err(SetupError::UnknownTrackName(_))
        ));
        // a valid topology that does not close keeps its geometric error
        assert!(matches!(
            Track::named(WIDTH, 0.0, "SLSLSL"),
            Err(SetupError::NotALoop { .. })
        ));
    }

    #[test]
    fn test_name_lists_sorted() {
        let kit = starter_kit_track_names();
        assert!(kit.windows(2).all(|w| w[0] <= w[1]));
        assert!(kit.contains(&"rloopback"));
        let custom = custom_track_names();
        assert!(custom.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(custom.len(), 8);
    }
}
