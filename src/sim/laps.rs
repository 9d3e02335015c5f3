//! Lap counting and per-lap metrics
//!
//! A lap completes when a vehicle crosses the finish line after driving at
//! least [`MIN_LAP_FRACTION`] of the track's center length since the last
//! crossing. The threshold keeps a vehicle that wiggles back and forth over
//! the line from scoring laps. A vehicle that u-turns mid-lap still gets
//! credit for the distance it drove, in either direction.

use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;
use crate::track::Track;
use crate::units::{Meters, MetersPerSec, SimTime};

/// Fraction of the center length a vehicle must drive for a lap to count
pub const MIN_LAP_FRACTION: f64 = 0.7;

/// Drive dofs below which a vehicle counts as "at the finish line"
const FINISH_LINE_WINDOW: Meters = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedLap {
    /// 1-based
    pub lap_number: usize,
    pub lap_time: SimTime,
    /// Driving direction when the lap finished
    pub is_trackwise: bool,
    /// Odometer distance driven during the lap
    pub path_length: Meters,
    pub min_speed: MetersPerSec,
    pub max_speed: MetersPerSec,
}

#[derive(Debug, Clone)]
struct LapState {
    start_odom: Meters,
    start_time: SimTime,
    min_speed: MetersPerSec,
    max_speed: MetersPerSec,
    done: Vec<CompletedLap>,
    num_reported: usize,
}

impl LapState {
    fn start(now: SimTime, veh: &Vehicle) -> Self {
        let speed = veh.cur_drive_speed();
        Self {
            start_odom: veh.odom(),
            start_time: now,
            min_speed: speed,
            max_speed: speed,
            done: Vec::new(),
            num_reported: 0,
        }
    }
}

/// Estimated time the vehicle crossed the finish line, `drive_dofs` ago at
/// the current speed
fn line_crossing_time(now: SimTime, drive_dofs: Meters, speed: MetersPerSec) -> SimTime {
    if speed > 0.0 {
        now - SimTime::from_secs_f64(drive_dofs / speed)
    } else {
        now
    }
}

/// Tracks completed laps for every vehicle in a system
#[derive(Debug, Clone)]
pub struct LapMetrics {
    record_trackwise: bool,
    record_counter_trackwise: bool,
    states: Vec<LapState>,
}

impl LapMetrics {
    /// Start counting from the vehicles' current positions. Laps finished in
    /// a direction whose flag is false are not recorded.
    pub fn new(
        now: SimTime,
        vehicles: &[Vehicle],
        record_trackwise: bool,
        record_counter_trackwise: bool,
    ) -> Self {
        Self {
            record_trackwise,
            record_counter_trackwise,
            states: vehicles.iter().map(|v| LapState::start(now, v)).collect(),
        }
    }

    /// Call once per tick, after the vehicles have moved
    ///
    /// # Panics
    /// If the number of vehicles changed since construction.
    pub fn update(&mut self, now: SimTime, track: &Track, vehicles: &[Vehicle]) {
        assert_eq!(
            vehicles.len(),
            self.states.len(),
            "LapMetrics: vehicle count changed"
        );
        let min_lap_length = MIN_LAP_FRACTION * track.center_length();

        for (id, (veh, state)) in vehicles.iter().zip(self.states.iter_mut()).enumerate() {
            let speed = veh.cur_drive_speed();
            state.min_speed = state.min_speed.min(speed);
            state.max_speed = state.max_speed.max(speed);

            let drive_dofs = veh.cur_drive_dofs();
            if drive_dofs >= FINISH_LINE_WINDOW {
                continue;
            }

            let lap_length = veh.odom() - state.start_odom;
            if lap_length >= min_lap_length {
                let is_trackwise = veh.is_facing_trackwise();
                let record = if is_trackwise {
                    self.record_trackwise
                } else {
                    self.record_counter_trackwise
                };
                if record {
                    let lap = CompletedLap {
                        lap_number: state.done.len() + 1,
                        lap_time: line_crossing_time(now, drive_dofs, speed) - state.start_time,
                        is_trackwise,
                        // the part past the finish line belongs to the next lap
                        path_length: lap_length - drive_dofs,
                        min_speed: state.min_speed,
                        max_speed: state.max_speed,
                    };
                    log::debug!(
                        "Vehicle {} lap {}: {} over {:.3} m",
                        id,
                        lap.lap_number,
                        lap.lap_time,
                        lap.path_length
                    );
                    state.done.push(lap);
                }
            }

            // Near the line, restart the lap every tick
            state.start_odom = veh.odom() - drive_dofs;
            state.start_time = line_crossing_time(now, drive_dofs, speed);
            state.min_speed = speed;
            state.max_speed = speed;
        }
    }

    /// # Panics
    /// If `vehicle` is not a valid vehicle index.
    pub fn laps_completed(&self, vehicle: usize) -> usize {
        self.state(vehicle).done.len()
    }

    /// Every recorded lap for a vehicle, oldest first
    ///
    /// # Panics
    /// If `vehicle` is not a valid vehicle index.
    pub fn completed_laps(&self, vehicle: usize) -> &[CompletedLap] {
        &self.state(vehicle).done
    }

    /// Laps recorded since the last call for the same vehicle
    ///
    /// # Panics
    /// If `vehicle` is not a valid vehicle index.
    pub fn new_completed_laps(&mut self, vehicle: usize) -> &[CompletedLap] {
        let state = self.state_mut(vehicle);
        let from = state.num_reported;
        state.num_reported = state.done.len();
        &state.done[from..]
    }

    fn state(&self, vehicle: usize) -> &LapState {
        assert!(
            vehicle < self.states.len(),
            "LapMetrics: vehicle {} invalid",
            vehicle
        );
        &self.states[vehicle]
    }

    fn state_mut(&mut self, vehicle: usize) -> &mut LapState {
        assert!(
            vehicle < self.states.len(),
            "LapMetrics: vehicle {} invalid",
            vehicle
        );
        &mut self.states[vehicle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ideal::{IdealSimulator, Simulator};
    use crate::sim::vehicle::VehicleType;
    use crate::track::TrackPose;
    use std::f64::consts::PI;

    struct Fixture {
        track: Track,
        vehicles: Vec<Vehicle>,
        sim: IdealSimulator,
        now: SimTime,
    }

    impl Fixture {
        fn new(num_vehicles: usize) -> Self {
            let track = Track::modular(0.2, 0.0, "SLLSSLLS").unwrap();
            let vehicles = (0..num_vehicles)
                .map(|_| Vehicle::new(VehicleType::from_code("gs").unwrap(), track.center_length()))
                .collect();
            Self {
                track,
                vehicles,
                sim: IdealSimulator::new(),
                now: SimTime::ZERO,
            }
        }

        fn run(&mut self, metrics: &mut LapMetrics, ticks: usize) {
            for _ in 0..ticks {
                self.now += SIM_DT;
                self.sim.tick(SIM_DT, &self.track, &mut self.vehicles);
                metrics.update(self.now, &self.track, &self.vehicles);
            }
        }

        fn ticks_per_lap(&self, speed: MetersPerSec) -> usize {
            (self.track.center_length() / speed / SIM_DT.as_secs_f64()).ceil() as usize
        }
    }

    #[test]
    fn test_counts_trackwise_laps() {
        let mut fx = Fixture::new(1);
        let mut metrics = LapMetrics::new(fx.now, &fx.vehicles, true, true);
        fx.vehicles[0].set_cmd_drive_speed(1.0, 1000.0);

        let per_lap = fx.ticks_per_lap(1.0);
        fx.run(&mut metrics, per_lap * 3 + 5);

        assert_eq!(metrics.laps_completed(0), 3);
        let len = fx.track.center_length();
        for (i, lap) in metrics.completed_laps(0).iter().enumerate() {
            assert_eq!(lap.lap_number, i + 1);
            assert!(lap.is_trackwise);
            assert!((lap.path_length - len).abs() < 0.02, "{lap:?}");
            assert!((lap.lap_time.as_secs_f64() - len).abs() < 0.01, "{lap:?}");
            assert_eq!(lap.min_speed, 1.0);
            assert_eq!(lap.max_speed, 1.0);
        }
    }

    #[test]
    fn test_new_laps_drained_per_vehicle() {
        let mut fx = Fixture::new(2);
        let mut metrics = LapMetrics::new(fx.now, &fx.vehicles, true, true);
        fx.vehicles[0].set_cmd_drive_speed(1.0, 1000.0);

        let per_lap = fx.ticks_per_lap(1.0);
        fx.run(&mut metrics, per_lap + 5);
        assert_eq!(metrics.new_completed_laps(0).len(), 1);
        assert!(metrics.new_completed_laps(0).is_empty());
        assert!(metrics.new_completed_laps(1).is_empty());

        fx.run(&mut metrics, per_lap * 2);
        let new = metrics.new_completed_laps(0);
        assert_eq!(new.len(), 2);
        assert_eq!(new[0].lap_number, 2);
        assert_eq!(metrics.laps_completed(1), 0);
    }

    #[test]
    fn test_counter_trackwise_laps() {
        let mut fx = Fixture::new(1);
        fx.vehicles[0].reposition(TrackPose::new(0.0, 0.0, PI));
        let mut metrics = LapMetrics::new(fx.now, &fx.vehicles, true, true);
        fx.vehicles[0].set_cmd_drive_speed(1.0, 1000.0);

        let per_lap = fx.ticks_per_lap(1.0);
        fx.run(&mut metrics, per_lap * 2 + 5);
        assert_eq!(metrics.laps_completed(0), 2);
        assert!(metrics.completed_laps(0).iter().all(|lap| !lap.is_trackwise));
    }

    #[test]
    fn test_direction_filter() {
        let mut fx = Fixture::new(1);
        fx.vehicles[0].reposition(TrackPose::new(0.0, 0.0, PI));
        let mut metrics = LapMetrics::new(fx.now, &fx.vehicles, true, false);
        fx.vehicles[0].set_cmd_drive_speed(1.0, 1000.0);

        let per_lap = fx.ticks_per_lap(1.0);
        fx.run(&mut metrics, per_lap * 2 + 5);
        assert_eq!(metrics.laps_completed(0), 0);
    }

    #[test]
    fn test_wiggling_over_finish_line_is_not_a_lap() {
        let mut fx = Fixture::new(1);
        let mut metrics = LapMetrics::new(fx.now, &fx.vehicles, true, true);
        let len = fx.track.center_length();

        for i in 0..20 {
            let dofs = if i % 2 == 0 { len - 0.05 } else { 0.05 };
            fx.vehicles[0].reposition(TrackPose::new(dofs, 0.0, 0.0));
            fx.run(&mut metrics, 1);
        }
        assert_eq!(metrics.laps_completed(0), 0);
    }

    #[test]
    #[should_panic(expected = "vehicle 2 invalid")]
    fn test_bad_vehicle_panics() {
        let fx = Fixture::new(2);
        let metrics = LapMetrics::new(fx.now, &fx.vehicles, true, true);
        metrics.laps_completed(2);
    }
}
