//! # Robot Executable Parameters
//!
//! Parameters for the robot executable, loaded from `robot_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;
use std::time::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::drive::MotionPrimitive;
use crate::sched::SchedConfig;
use crate::sim::JoystickAxes;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RobotExecParams {
    /// Minimum period of an autonomous cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Period of the dashboard update task.
    ///
    /// Units: seconds
    pub dashboard_period_s: f64,

    /// Time to wait after a fatal error before exiting, so the error can be delivered.
    ///
    /// Units: seconds
    pub fail_grace_period_s: f64,

    /// Period at which the simulated control system issues control packets.
    ///
    /// Units: seconds
    pub control_packet_period_s: f64,

    /// Mode script run when none is given on the command line, relative to the software root.
    pub mode_script: PathBuf,

    /// Name of the autonomous program to run, the default program is used if not set.
    #[serde(default)]
    pub auto_program: Option<String>,

    /// Power fraction used by the autonomous programs.
    pub auto_power: f64,

    /// Timeout of each autonomous move.
    ///
    /// Units: seconds
    pub move_timeout_s: f64,

    /// Legs driven by the `path` autonomous program.
    #[serde(default)]
    pub path: Vec<MotionPrimitive>,

    /// Position the simulated joystick is held in.
    #[serde(default)]
    pub joystick: JoystickAxes,
}

#[derive(Debug, Error, PartialEq)]
pub enum ExecParamsError {
    #[error("{0} must be a finite, non-negative number of seconds, found {1}")]
    InvalidDuration(&'static str, f64),

    #[error("auto_power must be between 0 and 1, found {0}")]
    InvalidPower(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotExecParams {
    /// Check the loaded values can be used, the duration accessors assume this has passed.
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        let durations = [
            ("cycle_period_s", self.cycle_period_s),
            ("dashboard_period_s", self.dashboard_period_s),
            ("fail_grace_period_s", self.fail_grace_period_s),
            ("control_packet_period_s", self.control_packet_period_s),
            ("move_timeout_s", self.move_timeout_s),
        ];

        for (name, value) in durations.iter() {
            if Duration::try_from_secs_f64(*value).is_err() {
                return Err(ExecParamsError::InvalidDuration(*name, *value));
            }
        }

        if !(0.0..=1.0).contains(&self.auto_power) {
            return Err(ExecParamsError::InvalidPower(self.auto_power));
        }

        Ok(())
    }

    pub fn sched_config(&self) -> SchedConfig {
        SchedConfig {
            cycle_period: seconds(self.cycle_period_s),
            dashboard_period: seconds(self.dashboard_period_s),
            fail_grace_period: seconds(self.fail_grace_period_s),
            auto_program: self.auto_program.clone(),
        }
    }

    pub fn control_packet_period(&self) -> Duration {
        seconds(self.control_packet_period_s)
    }

    pub fn move_timeout(&self) -> Duration {
        seconds(self.move_timeout_s)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Unvalidated values fall back to zero rather than panicking.
fn seconds(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = r#"
        cycle_period_s = 0.02
        dashboard_period_s = 0.1
        fail_grace_period_s = 0.2
        control_packet_period_s = 0.02
        mode_script = "scripts/demo.mode"
        auto_power = 0.5
        "#;

    #[test]
    fn test_invalid_exec_params() {
        let parse = |extra: &str| -> RobotExecParams {
            util::params::from_str(&format!("{}\n{}", MINIMAL, extra)).unwrap()
        };

        assert_eq!(parse("move_timeout_s = 4.0").validate(), Ok(()));

        let p = parse("move_timeout_s = -1.0");
        assert_eq!(p.validate(), Err(ExecParamsError::InvalidDuration("move_timeout_s", -1.0)));
        assert_eq!(p.move_timeout(), Duration::ZERO);

        let mut p = parse("move_timeout_s = 4.0");
        p.move_timeout_s = f64::INFINITY;
        assert!(matches!(p.validate(), Err(ExecParamsError::InvalidDuration("move_timeout_s", _))));
        assert_eq!(p.move_timeout(), Duration::ZERO);

        p.move_timeout_s = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = parse("move_timeout_s = 4.0");
        p.fail_grace_period_s = -0.2;
        assert_eq!(
            p.validate(),
            Err(ExecParamsError::InvalidDuration("fail_grace_period_s", -0.2))
        );
        assert_eq!(p.sched_config().fail_grace_period, Duration::ZERO);

        let mut p = parse("move_timeout_s = 4.0");
        p.auto_power = 1.5;
        assert_eq!(p.validate(), Err(ExecParamsError::InvalidPower(1.5)));
    }

    #[test]
    fn test_load_exec_params() {
        let params: RobotExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.02
            dashboard_period_s = 0.1
            fail_grace_period_s = 0.2
            control_packet_period_s = 0.02
            mode_script = "scripts/demo.mode"
            auto_power = 0.5
            move_timeout_s = 4.0

            [[path]]
            distance_cm = 100.0
            speed_fraction = 0.5

            [[path]]
            distance_cm = -50.0
            speed_fraction = 0.25
            "#
        ).unwrap();

        assert!(params.auto_program.is_none());
        assert_eq!(params.path.len(), 2);
        assert_eq!(params.path[1].distance_cm, -50.0);
        assert_eq!(params.joystick, JoystickAxes::default());

        let config = params.sched_config();
        assert_eq!(config.dashboard_period, Duration::from_millis(100));
        assert_eq!(params.move_timeout(), Duration::from_secs(4));
    }
}
