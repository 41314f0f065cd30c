//! Tank drive module
//!
//! Two independently actuated sides (left and right), each driven by a lead motor controller with
//! an encoder. Teleop drives the sides open-loop, autonomous moves use the controllers' closed
//! loop through [`MotionTask`]s.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arcade;
mod gearshift;
mod geometry;
mod motion;
mod params;
mod primitives;
mod tank_drive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use serde::Serialize;

// Internal
pub use arcade::*;
pub use gearshift::*;
pub use geometry::*;
pub use motion::*;
pub use params::*;
pub use primitives::*;
pub use tank_drive::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the drive subsystem, used as the requirement of drive commands.
pub const DRIVE_SUBSYSTEM: &str = "drive";

/// Degrees in one full rotation.
pub const DEG_PER_REV: f64 = 360.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A drive shared between the robot and the motion tasks driving it.
pub type SharedDrive<M> = Arc<Mutex<TankDrive<M>>>;

/// Snapshot of the drive state, published for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveSnapshot {
    /// Units: encoder degrees
    pub left_pos_deg: f64,
    /// Units: encoder degrees
    pub right_pos_deg: f64,
    /// Units: native units / 100 ms
    pub left_vel: f64,
    /// Units: native units / 100 ms
    pub right_vel: f64,
    /// Units: degrees, [0, 360)
    pub heading_deg: f64,
    pub high_gear: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One side of the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// Possible errors that can occur while building or using the drive.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Invalid gear ratio {0}, must be strictly positive")]
    InvalidGearRatio(f64),

    #[error("Invalid wheel circumference {0} cm, must be strictly positive")]
    InvalidWheelCircumference(f64),

    #[error("Invalid encoder resolution {0} native units per revolution, must be strictly positive")]
    InvalidEncoderResolution(f64),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap a drive so it can be shared with motion tasks.
pub fn share<M>(drive: TankDrive<M>) -> SharedDrive<M> {
    Arc::new(Mutex::new(drive))
}

/// Lock a shared drive.
///
/// A panic while the drive was held doesn't leave it in an unusable state (every
/// command overwrites the controllers' demands), so poisoning is ignored.
pub fn lock<M>(drive: &SharedDrive<M>) -> MutexGuard<'_, TankDrive<M>> {
    drive.lock().unwrap_or_else(PoisonError::into_inner)
}
