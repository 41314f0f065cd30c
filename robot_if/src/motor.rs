//! # Motor controller interface
//!
//! Smart motor controllers (one lead controller per drive side) run their own closed loop on the
//! attached quadrature encoder. Positions are in native sensor units, velocities in native sensor
//! units per 100 ms.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Control mode of a motor controller, determines how [`MotorController::set`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Open loop, demand is a power fraction in [-1, 1]
    PercentOutput,

    /// Closed loop positional PID, demand is a position in native units
    Position,

    /// Closed loop motion profiled position, demand is a position in native units. The profile
    /// uses the cruise velocity and acceleration set with
    /// [`MotorController::configure_motion_magic`].
    MotionMagic,
}

/// Polarity options applied to a controller while it is in closed-loop control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reverse {
    /// Neither output nor sensor reversed
    None,
    /// Sensor phase reversed only
    Encoder,
    /// Output reversed only
    Output,
    /// Both output and sensor phase reversed
    Both,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A motor controller with an attached encoder.
///
/// All calls are synchronous and non-blocking from the caller's point of view.
pub trait MotorController {
    /// Change the control mode of the controller.
    fn set_control_mode(&mut self, mode: ControlMode);

    /// Get the current control mode.
    fn control_mode(&self) -> ControlMode;

    /// Set the demand, interpreted according to the current control mode.
    fn set(&mut self, demand: f64);

    /// Get the last demand set on the controller.
    fn demand(&self) -> f64;

    /// Configure the motion profile used by [`ControlMode::MotionMagic`].
    ///
    /// Units: native units / 100 ms, and native units / 100 ms / s.
    fn configure_motion_magic(&mut self, cruise_velocity: f64, acceleration: f64);

    /// Current sensed position.
    ///
    /// Units: native units
    fn sensor_position(&self) -> f64;

    /// Current sensed velocity.
    ///
    /// Units: native units / 100 ms
    fn sensor_velocity(&self) -> f64;

    /// Overwrite the sensed position, used to zero the encoder.
    fn set_sensor_position(&mut self, position: f64);

    /// Reverse the output polarity. Only affects closed-loop control.
    fn set_output_inverted(&mut self, inverted: bool);

    /// Reverse the sensor phase.
    fn set_sensor_phase(&mut self, reversed: bool);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Reverse {
    /// Returns `true` if the output is reversed in this mode.
    pub fn output(&self) -> bool {
        matches!(self, Reverse::Output | Reverse::Both)
    }

    /// Returns `true` if the sensor phase is reversed in this mode.
    pub fn sensor(&self) -> bool {
        matches!(self, Reverse::Encoder | Reverse::Both)
    }

    /// Apply this reverse mode to a controller.
    pub fn apply<M: MotorController + ?Sized>(&self, motor: &mut M) {
        motor.set_output_inverted(self.output());
        motor.set_sensor_phase(self.sensor());
    }
}

impl Default for Reverse {
    fn default() -> Self {
        Reverse::None
    }
}
