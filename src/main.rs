//! Trackdrive demo
//!
//! Builds a system from settings (a JSON file given as the first argument, or
//! the defaults), drives every vehicle with a seeded random command script
//! and reports collisions and laps.
//!
//! ```text
//! RUST_LOG=info trackdrive [settings.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use trackdrive::Settings;
    use trackdrive::consts::DEFAULT_UTURN_RADIUS;
    use trackdrive::sim::LapMetrics;

    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {path}");
            Settings::from_json(&std::fs::read_to_string(&path)?)?
        }
        None => Settings::default(),
    };

    let mut sys = settings.build_system()?;
    let mut laps = LapMetrics::new(sys.now(), sys.vehicles(), true, true);
    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let max_cofs = sys.track().max_lateral_offset();
    let num_vehicles = sys.vehicles().len();
    let mut num_collisions = 0usize;

    for t in 0..settings.ticks {
        // New commands every two seconds of simulated time
        if t % 200 == 0 {
            for i in 0..num_vehicles {
                let speed = rng.random_range(0.2..1.2);
                let cofs = rng.random_range(-max_cofs..=max_cofs);
                let uturn = rng.random_bool(0.05);
                let veh = sys.vehicle_mut(i);
                veh.set_cmd_drive_speed(speed, 1.0);
                veh.set_cmd_track_cofs(cofs, 0.1);
                if uturn {
                    veh.cmd_uturn(DEFAULT_UTURN_RADIUS);
                }
            }
        }

        sys.tick();
        laps.update(sys.now(), sys.track(), sys.vehicles());

        num_collisions += sys.collider_mut().new_collisions().len();
        for i in 0..num_vehicles {
            for lap in laps.new_completed_laps(i) {
                log::info!(
                    "{} vehicle {} ({}) finished lap {} in {}",
                    sys.now(),
                    i,
                    sys.vehicle(i).vehicle_type(),
                    lap.lap_number,
                    lap.lap_time
                );
            }
        }
    }

    println!(
        "{} on track {:?} ({:.3} m), {} collisions",
        sys.now(),
        settings.track,
        sys.track().center_length(),
        num_collisions
    );
    for (i, veh) in sys.vehicles().iter().enumerate() {
        let best = laps
            .completed_laps(i)
            .iter()
            .map(|lap| lap.lap_time)
            .min();
        println!(
            "  vehicle {} {:<12} odom {:8.3} m, {} laps, best {}",
            i,
            veh.vehicle_type().info().full_name,
            veh.odom(),
            laps.laps_completed(i),
            best.map_or_else(|| "-".to_string(), |t| t.to_string())
        );
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no wasm binary
}
