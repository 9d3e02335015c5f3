//! Setup configuration
//!
//! Everything needed to build a [`System`]: the track, the vehicles and the
//! time step, plus the demo's seed and run length. Loaded from JSON; any
//! field left out takes its default.

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::sim::{CollisionDetector, IdealSimulator, System, Vehicle, VehicleType};
use crate::track::{Track, TrackPose};
use crate::units::{Meters, SimTime};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Track ===
    /// Starter kit name, custom track name or modular topology string
    pub track: String,
    /// Road width
    pub width: Meters,
    /// Max lateral offset from road center (0 = width/2)
    pub max_cofs: Meters,

    // === Vehicles ===
    /// Vehicle type codes, one per vehicle
    pub vehicles: Vec<String>,

    // === Simulation ===
    /// Time step in nanoseconds
    pub dt_nanos: u64,
    /// Demo command script seed
    pub seed: u64,
    /// Demo run length
    pub ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track: "capsule".to_string(),
            width: 0.2,
            max_cofs: 0.0,

            vehicles: vec!["gs".to_string(), "sk".to_string()],

            dt_nanos: 10 * SimTime::MILLISECOND,
            seed: 42,
            ticks: 6000,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SetupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn time_step(&self) -> SimTime {
        SimTime::from_nanos(self.dt_nanos)
    }

    pub fn build_track(&self) -> Result<Track, SetupError> {
        Track::named(self.width, self.max_cofs, &self.track)
    }

    /// Build a system with the ideal simulator and rectangle collision
    /// detection. Vehicles start at road center, facing trackwise, spread
    /// evenly around the track in the order listed.
    pub fn build_system(&self) -> Result<System, SetupError> {
        let track = self.build_track()?;
        let len = track.center_length();
        let count = self.vehicles.len();

        let mut vehicles = Vec::with_capacity(count);
        for (i, code) in self.vehicles.iter().enumerate() {
            let mut veh = Vehicle::new(VehicleType::from_code(code)?, len);
            veh.reposition(TrackPose::new(i as f64 * len / count as f64, 0.0, 0.0));
            vehicles.push(veh);
        }

        let collider = CollisionDetector::new(&vehicles);
        System::new(track, vehicles, Box::new(IdealSimulator::new()), Box::new(collider))
            .with_time_step(self.time_step())
    }
}
