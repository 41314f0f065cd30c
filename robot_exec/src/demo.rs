//! # Demonstration robot
//!
//! A tank drive robot running on simulated hardware. Teleop drives from a simulated joystick and
//! autonomous offers a handful of programs built from the drive's motion primitives.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use robot_if::{ListenerManager, TelemetrySink};
use crate::command::CommandSequence;
use crate::drive::{
    self,
    arc_turn, drive_forward, forward_segments, radius_arc_turn, turn_in_place,
    Direction, DriveParams, DriveSnapshot, SharedDrive, TankDrive,
};
use crate::params::RobotExecParams;
use crate::sched::{AutoChooser, Robot, RobotError, SnapshotCell};
use crate::sim::{JoystickHandle, LogTelemetry, SimJoystick, SimMotor, SimShifter};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Side length of the square driven by the `square` program.
///
/// Units: centimeters
const SQUARE_SIDE_CM: f64 = 100.0;

/// Radius of the arc driven by the `arc` program.
///
/// Units: centimeters
const ARC_RADIUS_CM: f64 = 60.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct DemoRobot {
    drive_params: DriveParams,
    exec_params: RobotExecParams,

    drive: Option<SharedDrive<SimMotor>>,
    joystick: Option<JoystickHandle>,

    snapshot: SnapshotCell<DriveSnapshot>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DemoRobot {
    pub fn new(drive_params: DriveParams, exec_params: RobotExecParams) -> Self {
        Self {
            drive_params,
            exec_params,
            drive: None,
            joystick: None,
            snapshot: SnapshotCell::new(),
        }
    }

    pub fn drive(&self) -> Option<&SharedDrive<SimMotor>> {
        self.drive.as_ref()
    }

    fn publish_snapshot(&self) {
        if let Some(d) = self.drive.as_ref() {
            self.snapshot.publish(drive::lock(d).snapshot());
        }
    }

    /// Square of forward moves joined by right angle turns.
    fn square(&self, drive: &SharedDrive<SimMotor>) -> CommandSequence {
        let power = self.exec_params.auto_power;
        let timeout = self.exec_params.move_timeout();

        (0..4).fold(CommandSequence::new("square"), |seq, _| {
            seq.then(Box::new(drive_forward(drive, SQUARE_SIDE_CM, power, timeout)))
                .then(Box::new(turn_in_place(drive, 90.0, Direction::Right, power, timeout)))
        })
    }

    /// Quarter turn pivoting on the left side, then back on a wide arc.
    fn arc(&self, drive: &SharedDrive<SimMotor>) -> CommandSequence {
        let power = self.exec_params.auto_power;
        let timeout = self.exec_params.move_timeout();

        CommandSequence::new("arc")
            .then(Box::new(arc_turn(drive, 90.0, Direction::Left, power, timeout)))
            .then(Box::new(radius_arc_turn(drive, ARC_RADIUS_CM, 90.0, Direction::Right, power, timeout)))
    }
}

impl Robot for DemoRobot {
    fn construct_hardware(&mut self) -> Result<(), RobotError> {
        let free_speed = self.drive_params.sim.free_speed;

        let mut tank = TankDrive::new(
            SimMotor::new(free_speed),
            SimMotor::new(free_speed),
            &self.drive_params
        )?;

        if let Some(gs) = self.drive_params.gearshift {
            tank.add_gearshift(Box::new(SimShifter::new()), gs);
        }

        self.drive = Some(drive::share(tank));
        info!("Drive constructed");

        Ok(())
    }

    fn setup_listeners(&mut self) -> Result<Vec<Box<dyn ListenerManager>>, RobotError> {
        let (joystick, handle) = SimJoystick::new(self.exec_params.joystick);
        self.joystick = Some(handle);

        Ok(vec![Box::new(joystick)])
    }

    fn construct_auto_programs(&mut self, chooser: &mut AutoChooser) {
        let drive = match self.drive.as_ref() {
            Some(d) => d.clone(),
            None => {
                warn!("No drive constructed, no auto programs available");
                return
            }
        };

        let power = self.exec_params.auto_power;
        let timeout = self.exec_params.move_timeout();

        chooser.add_default("forward", Box::new(drive_forward(&drive, SQUARE_SIDE_CM, power, timeout)));
        chooser.add_candidate("square", Box::new(self.square(&drive)));
        chooser.add_candidate("arc", Box::new(self.arc(&drive)));

        if !self.exec_params.path.is_empty() {
            chooser.add_candidate(
                "path",
                Box::new(forward_segments("path", &drive, &self.exec_params.path, timeout))
            );
        }
    }

    fn dashboard_updater(&mut self) -> Option<Box<dyn FnMut() + Send>> {
        let snapshot = self.snapshot.clone();
        let mut telemetry = LogTelemetry::default();

        Some(Box::new(move || {
            let s = match snapshot.latest() {
                Some(s) => s,
                None => return
            };

            telemetry.put_number("drive/left_pos_deg", s.left_pos_deg);
            telemetry.put_number("drive/right_pos_deg", s.right_pos_deg);
            telemetry.put_number("drive/left_vel", s.left_vel);
            telemetry.put_number("drive/right_vel", s.right_vel);
            telemetry.put_number("drive/heading_deg", s.heading_deg);
            telemetry.put_bool("drive/high_gear", s.high_gear);

            match serde_json::to_string(&s) {
                Ok(j) => telemetry.put_string("drive/snapshot", &j),
                Err(e) => warn!("Cannot serialise the drive snapshot: {}", e)
            }
        }))
    }

    fn disabled_init(&mut self) {
        if let Some(d) = self.drive.as_ref() {
            drive::lock(d).stop();
        }
    }

    fn disabled_periodic(&mut self) {
        self.publish_snapshot();
    }

    fn autonomous_periodic(&mut self) {
        self.publish_snapshot();
    }

    fn teleop_periodic(&mut self) {
        if let (Some(d), Some(js)) = (self.drive.as_ref(), self.joystick.as_ref()) {
            let axes = js.read();
            let mut d = drive::lock(d);

            d.arcade_drive(axes.turn, axes.forward, axes.throttle, axes.full_speed);

            if self.drive_params.gearshift.is_some() {
                d.autoshift();
            }
        }

        self.publish_snapshot();
    }

    fn test_periodic(&mut self) {
        self.publish_snapshot();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;
    use robot_if::{ControlMode, MotorController};
    use crate::drive::{testing, GearShiftParams, Side};
    use crate::sim::JoystickAxes;

    fn exec_params() -> RobotExecParams {
        RobotExecParams {
            cycle_period_s: 0.02,
            dashboard_period_s: 0.1,
            fail_grace_period_s: 0.1,
            control_packet_period_s: 0.02,
            mode_script: PathBuf::from("scripts/demo.mode"),
            auto_program: None,
            auto_power: 0.5,
            move_timeout_s: 5.0,
            path: vec![],
            joystick: JoystickAxes { turn: 0.0, forward: 1.0, throttle: 1.0, full_speed: true },
        }
    }

    #[test]
    fn test_auto_programs() {
        let mut robot = DemoRobot::new(testing::params(), exec_params());
        let mut chooser = AutoChooser::new();

        // Nothing to drive yet
        robot.construct_auto_programs(&mut chooser);
        assert!(chooser.is_empty());

        robot.construct_hardware().unwrap();
        robot.construct_auto_programs(&mut chooser);
        assert_eq!(chooser.len(), 3);
        assert_eq!(chooser.selected_name(), Some("forward"));

        let square = robot.square(robot.drive().unwrap());
        assert_eq!(square.len(), 8);
    }

    #[test]
    fn test_path_program() {
        let mut params = exec_params();
        params.path = vec![
            drive::MotionPrimitive { distance_cm: 50.0, speed_fraction: 0.5 },
        ];

        let mut robot = DemoRobot::new(testing::params(), params);
        robot.construct_hardware().unwrap();

        let mut chooser = AutoChooser::new();
        robot.construct_auto_programs(&mut chooser);
        assert_eq!(chooser.len(), 4);
        assert!(chooser.select("path"));
    }

    #[test]
    fn test_invalid_drive_fails_construction() {
        let mut params = testing::params();
        params.motion.native_units_per_rev = 0.0;

        let mut robot = DemoRobot::new(params, exec_params());
        assert!(robot.construct_hardware().is_err());
    }

    #[test]
    fn test_teleop_drives_from_joystick() {
        let mut params = testing::params();
        params.gearshift = Some(GearShiftParams { shift_up_speed: 1e9, shift_down_speed: 1e8 });

        let mut robot = DemoRobot::new(params, exec_params());
        robot.construct_hardware().unwrap();
        let mut listeners = robot.setup_listeners().unwrap();
        assert_eq!(listeners.len(), 1);

        for l in listeners.iter_mut() {
            l.tick();
        }
        robot.teleop_periodic();

        {
            let d = drive::lock(robot.drive().unwrap());
            assert_eq!(d.motor(Side::Left).control_mode(), ControlMode::PercentOutput);
            assert_eq!(d.motor(Side::Left).demand(), 1.0);
            // Right side is inverted by default
            assert_eq!(d.motor(Side::Right).demand(), -1.0);
            assert!(!d.is_in_high_gear());
        }

        assert!(robot.snapshot.latest().is_some());

        robot.disabled_init();
        let d = drive::lock(robot.drive().unwrap());
        assert_eq!(d.motor(Side::Left).demand(), 0.0);
    }

    #[test]
    fn test_dashboard_updater_reads_snapshot() {
        let mut robot = DemoRobot::new(testing::params(), exec_params());
        robot.construct_hardware().unwrap();

        let mut update = robot.dashboard_updater().unwrap();

        // Nothing published yet
        update();

        robot.disabled_periodic();
        update();
        assert!(robot.snapshot.latest().is_some());
    }
}
