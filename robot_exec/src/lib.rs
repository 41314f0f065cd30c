//! # Robot library.
//!
//! This library allows other crates in the workspace, and the robot executable, to access items
//! defined inside the robot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command framework - runs commands and sequences of commands against the robot's subsystems
pub mod command;

/// Demonstration robot - a tank drive robot running on simulated hardware
pub mod demo;

/// Drive module - teleop and closed-loop autonomous control of a tank drive
pub mod drive;

/// Robot executable parameters
pub mod params;

/// Mode scheduler - dispatches the robot's hooks according to the control system's mode
pub mod sched;

/// Simulated hardware and control system
pub mod sim;
