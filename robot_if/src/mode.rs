//! # Robot modes
//!
//! The competition control system places the robot in exactly one of four modes at any time. The
//! robot observes the mode once per scheduler cycle through a [`ControlSystem`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating mode commanded by the competition control system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotMode {
    /// Actuators are disabled by the control system
    Disabled,

    /// The robot runs its selected autonomous program
    Autonomous,

    /// The robot is driven by the operators
    Teleop,

    /// Test mode, used for calibration and bring-up
    Test,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseModeError {
    #[error("Unknown robot mode \"{0}\", expected one of disabled, autonomous, teleop, test")]
    UnknownMode(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Observer of the competition control system.
///
/// All calls are made from the scheduler thread.
pub trait ControlSystem {
    /// Get the mode the control system currently demands.
    fn mode(&self) -> RobotMode;

    /// Returns `true` if a new control packet has arrived since the last call.
    ///
    /// This is an edge signal: a second call without a new packet in between returns `false`.
    fn is_new_control_data(&mut self) -> bool;

    /// Block until new control data arrives.
    fn wait_for_data(&mut self);

    /// Returns `true` if the robot program should leave its main loop.
    ///
    /// A real field connection never asks for this, the process is simply killed.
    fn is_shutdown_requested(&self) -> bool {
        false
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Display for RobotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RobotMode::Disabled => "Disabled",
            RobotMode::Autonomous => "Autonomous",
            RobotMode::Teleop => "Teleop",
            RobotMode::Test => "Test",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for RobotMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" => Ok(RobotMode::Disabled),
            "autonomous" | "auto" => Ok(RobotMode::Autonomous),
            "teleop" => Ok(RobotMode::Teleop),
            "test" => Ok(RobotMode::Test),
            other => Err(ParseModeError::UnknownMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("disabled".parse::<RobotMode>().unwrap(), RobotMode::Disabled);
        assert_eq!(" Autonomous ".parse::<RobotMode>().unwrap(), RobotMode::Autonomous);
        assert_eq!("auto".parse::<RobotMode>().unwrap(), RobotMode::Autonomous);
        assert_eq!("TELEOP".parse::<RobotMode>().unwrap(), RobotMode::Teleop);
        assert_eq!("test".parse::<RobotMode>().unwrap(), RobotMode::Test);
        assert!("practice".parse::<RobotMode>().is_err());
    }
}
