//! The complete robotics system: track, vehicles, motion and collisions
//!
//! One tick is strictly ordered: advance the clock, move every vehicle, then
//! refresh collisions. Nothing else mutates the system between ticks.

use super::collision::VehicleCollider;
use super::ideal::Simulator;
use super::vehicle::Vehicle;
use crate::consts::SIM_DT;
use crate::error::SetupError;
use crate::track::Track;
use crate::units::SimTime;

pub struct System {
    /// Length of one tick
    dt: SimTime,
    now: SimTime,
    track: Track,
    vehicles: Vec<Vehicle>,
    simulator: Box<dyn Simulator>,
    collider: Box<dyn VehicleCollider>,
}

impl System {
    /// New system with the default time step ([`SIM_DT`]), starting at time
    /// zero
    pub fn new(
        track: Track,
        vehicles: Vec<Vehicle>,
        simulator: Box<dyn Simulator>,
        collider: Box<dyn VehicleCollider>,
    ) -> Self {
        log::info!(
            "System: {} vehicles on a {:.3} m track, dt = {}",
            vehicles.len(),
            track.center_length(),
            SIM_DT
        );
        Self {
            dt: SIM_DT,
            now: SimTime::ZERO,
            track,
            vehicles,
            simulator,
            collider,
        }
    }

    /// Replace the time step. Fails on a zero step.
    pub fn with_time_step(mut self, dt: SimTime) -> Result<Self, SetupError> {
        if dt == SimTime::ZERO {
            return Err(SetupError::InvalidTimeStep);
        }
        self.dt = dt;
        Ok(self)
    }

    pub fn time_step(&self) -> SimTime {
        self.dt
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// # Panics
    /// If `i` is not a valid vehicle index.
    pub fn vehicle(&self, i: usize) -> &Vehicle {
        self.assert_valid_vehicle(i);
        &self.vehicles[i]
    }

    /// # Panics
    /// If `i` is not a valid vehicle index.
    pub fn vehicle_mut(&mut self, i: usize) -> &mut Vehicle {
        self.assert_valid_vehicle(i);
        &mut self.vehicles[i]
    }

    fn assert_valid_vehicle(&self, i: usize) {
        assert!(
            i < self.vehicles.len(),
            "vehicle index {} is not valid for system with {} vehicles",
            i,
            self.vehicles.len()
        );
    }

    pub fn collider(&self) -> &dyn VehicleCollider {
        self.collider.as_ref()
    }

    pub fn collider_mut(&mut self) -> &mut dyn VehicleCollider {
        self.collider.as_mut()
    }

    /// Run one time step of motion and collision detection
    pub fn tick(&mut self) {
        self.now += self.dt;
        self.simulator.tick(self.dt, &self.track, &mut self.vehicles);
        self.collider.update(self.now, &self.track, &self.vehicles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::CollisionDetector;
    use crate::sim::ideal::IdealSimulator;
    use crate::sim::vehicle::VehicleType;
    use crate::track::TrackPose;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use std::f64::consts::PI;

    fn build(codes: &[&str]) -> System {
        let track = Track::modular(0.2, 0.0, "SLLSSLLS").unwrap();
        let vehicles: Vec<_> = codes
            .iter()
            .map(|code| Vehicle::new(VehicleType::from_code(code).unwrap(), track.center_length()))
            .collect();
        let collider = CollisionDetector::new(&vehicles);
        System::new(track, vehicles, Box::new(IdealSimulator::new()), Box::new(collider))
    }

    /// Random but reproducible speed and lane commands
    fn drive_script(sys: &mut System, seed: u64, ticks: usize) -> Vec<(SimTime, usize, usize)> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut impacts = Vec::new();
        for t in 0..ticks {
            if t % 25 == 0 {
                for i in 0..sys.vehicles().len() {
                    let speed = rng.random_range(0.1..1.0);
                    let cofs = rng.random_range(-0.08..0.08);
                    let veh = sys.vehicle_mut(i);
                    veh.set_cmd_drive_speed(speed, 2.0);
                    veh.set_cmd_track_cofs(cofs, 0.2);
                    if rng.random_bool(0.02) {
                        veh.cmd_uturn(crate::consts::DEFAULT_UTURN_RADIUS);
                    }
                }
            }
            sys.tick();
            for ev in sys.collider_mut().new_collisions() {
                impacts.push((ev.impact_time, ev.vehicles[0].id, ev.vehicles[1].id));
            }
        }
        impacts
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut sys = build(&["gs"]);
        assert_eq!(sys.now(), SimTime::ZERO);
        sys.tick();
        sys.tick();
        assert_eq!(sys.now(), SimTime::from_millis(20));
        assert_eq!(sys.time_step(), SIM_DT);
    }

    #[test]
    fn test_custom_time_step() {
        let mut sys = build(&["gs"]).with_time_step(SimTime::from_millis(5)).unwrap();
        sys.vehicle_mut(0).set_cmd_drive_speed(1.0, 1000.0);
        sys.tick();
        assert_eq!(sys.now(), SimTime::from_millis(5));
        assert!((sys.vehicle(0).cur_track_pose().dofs - 0.0025).abs() < 1e-12);

        assert!(matches!(
            build(&["gs"]).with_time_step(SimTime::ZERO),
            Err(SetupError::InvalidTimeStep)
        ));
    }

    #[test]
    fn test_head_on_collision_reported_once() {
        let mut sys = build(&["gs", "xr"]);
        sys.vehicle_mut(0).reposition(TrackPose::new(1.2, 0.0, 0.0));
        sys.vehicle_mut(1).reposition(TrackPose::new(1.5, 0.01, PI));
        for i in 0..2 {
            sys.vehicle_mut(i).set_cmd_drive_speed(0.5, 100.0);
        }

        let mut new_events = Vec::new();
        for _ in 0..100 {
            sys.tick();
            new_events.extend(sys.collider_mut().new_collisions());
        }
        // the short car passes alongside the long one; one event for the whole overlap
        assert_eq!(new_events.len(), 1);
        let ev = new_events[0];
        assert!(ev.vehicles[0].is_front());
        assert!(ev.vehicles[1].is_front());
        assert!(sys.collider().current_collisions().is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut sys1 = build(&["gs", "sk", "xr", "th"]);
        let mut sys2 = build(&["gs", "sk", "xr", "th"]);
        let impacts1 = drive_script(&mut sys1, 7, 3000);
        let impacts2 = drive_script(&mut sys2, 7, 3000);

        assert_eq!(impacts1, impacts2);
        for (v1, v2) in sys1.vehicles().iter().zip(sys2.vehicles()) {
            assert_eq!(v1.cur_track_pose(), v2.cur_track_pose());
            assert_eq!(v1.odom(), v2.odom());
        }
    }

    #[test]
    #[should_panic(expected = "not valid for system")]
    fn test_bad_vehicle_index_panics() {
        build(&["gs"]).vehicle(3);
    }
}
