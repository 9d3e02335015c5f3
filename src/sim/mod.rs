//! Deterministic vehicle simulation
//!
//! Everything here is pure and deterministic:
//! - Fixed time step only
//! - Stable iteration order (by vehicle index)
//! - No wall-clock time, no hidden randomness

pub mod collision;
pub mod follow;
pub mod ideal;
pub mod laps;
pub mod system;
pub mod vehicle;

pub use collision::{CollisionDetector, CollisionEvent, VehicleCollider, VehicleCollisionInfo};
pub use follow::Follower;
pub use ideal::{IdealSimulator, Simulator};
pub use laps::{CompletedLap, LapMetrics};
pub use system::System;
pub use vehicle::{Vehicle, VehicleType, VehicleTypeInfo};
