//! # Robot interface crate.
//!
//! Provides the contracts of all equipment and services the robot control core talks to but does
//! not own: motor controllers, the competition control system, input listeners, the dashboard and
//! the gear shifting mechanism.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Competition mode and control system observation
pub mod mode;

/// Motor controller (actuator) interface
pub mod motor;

/// Operator input listener dispatch
pub mod listener;

/// Dashboard/telemetry sink
pub mod telemetry;

/// Gear shifting mechanism
pub mod shifter;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use listener::{ListenerManager, RecountError};
pub use mode::{ControlSystem, ParseModeError, RobotMode};
pub use motor::{ControlMode, MotorController, Reverse};
pub use shifter::{Gear, Shifter};
pub use telemetry::TelemetrySink;
