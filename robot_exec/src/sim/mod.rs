//! Simulated equipment
//!
//! Stand-ins for the motor controllers, shifter, joystick, dashboard and control system, used when
//! running away from the robot and throughout the tests.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod control_system;
mod joystick;
mod motor;
mod shifter;
mod telemetry;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use control_system::*;
pub use joystick::*;
pub use motor::*;
pub use shifter::*;
pub use telemetry::*;
