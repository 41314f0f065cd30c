//! Autonomous closed-loop motion tasks
//!
//! A [`MotionTask`] drives each side of the drive to a target encoder angle using the controllers'
//! motion profiled closed loop, then polls the error every cycle until the move has converged or
//! timed out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use robot_if::MotorController;
use util::maths::clamp;
use crate::command::Command;
use super::{lock, SharedDrive, Side, DRIVE_SUBSYSTEM};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const DRIVE_REQUIREMENTS: &[&str] = &[DRIVE_SUBSYSTEM];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything needed to describe one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveParams {
    pub end_mode: MoveEndMode,

    /// Target of the left side.
    ///
    /// Units: encoder degrees
    pub left_deg: f64,

    /// Target of the right side.
    ///
    /// Units: encoder degrees
    pub right_deg: f64,

    /// Fraction of the maximum speed to move at, in [0, 1]
    pub power: f64,

    /// Apply the drive's per-side speed scalars
    pub use_scalars: bool,

    pub timeout: Duration,
}

/// Debounced convergence check of a move.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    end_mode: MoveEndMode,
    threshold_deg: f64,
    debounce_count: u32,

    /// Consecutive cycles the end condition has held for
    hits: u32,

    left_done: bool,
    right_done: bool,
}

/// A closed-loop move of the drive.
pub struct MotionTask<M> {
    name: String,
    drive: SharedDrive<M>,
    params: MoveParams,

    /// Drive ownership token, `None` until initialised
    token: Option<u64>,
    start_time: Option<Instant>,
    monitor: Option<ConvergenceMonitor>,
    outcome: Option<MotionOutcome>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// When a move is considered complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveEndMode {
    /// Both sides must reach their targets
    Both,

    /// Either side reaching its target is enough
    Either,
}

/// How a motion task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotionOutcome {
    /// The end condition held for the debounce count
    Converged,

    /// The timeout expired first
    TimedOut,

    /// The task was cancelled
    Interrupted,

    /// Another motion task took over the drive
    Superseded,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConvergenceMonitor {
    pub fn new(end_mode: MoveEndMode, threshold_deg: f64, debounce_count: u32) -> Self {
        Self {
            end_mode,
            threshold_deg,
            debounce_count,
            hits: 0,
            left_done: false,
            right_done: false,
        }
    }

    /// Update with the current error of each side, returns `true` once the
    /// end condition has held on more than `debounce_count` consecutive
    /// updates.
    ///
    /// A side with a zero target is always done.
    pub fn update(
        &mut self,
        left_error_deg: f64,
        right_error_deg: f64,
        left_target_zero: bool,
        right_target_zero: bool
    ) -> bool {
        self.left_done = left_target_zero || left_error_deg.abs() < self.threshold_deg;
        self.right_done = right_target_zero || right_error_deg.abs() < self.threshold_deg;

        let holds = match self.end_mode {
            MoveEndMode::Both => self.left_done && self.right_done,
            MoveEndMode::Either => self.left_done || self.right_done,
        };

        if holds {
            self.hits += 1;
        }
        else {
            self.hits = 0;
        }

        self.hits > self.debounce_count
    }

    pub fn left_done(&self) -> bool {
        self.left_done
    }

    pub fn right_done(&self) -> bool {
        self.right_done
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}

impl<M: MotorController> MotionTask<M> {
    pub fn new(name: &str, drive: SharedDrive<M>, params: MoveParams) -> Self {
        Self {
            name: name.to_string(),
            drive,
            params,
            token: None,
            start_time: None,
            monitor: None,
            outcome: None,
        }
    }

    pub fn params(&self) -> &MoveParams {
        &self.params
    }

    /// How the task finished, `None` while still running.
    pub fn outcome(&self) -> Option<MotionOutcome> {
        self.outcome
    }

    /// Convergence state of the last poll, `None` before initialisation.
    pub fn monitor(&self) -> Option<&ConvergenceMonitor> {
        self.monitor.as_ref()
    }

    /// Cruise speed of each side.
    ///
    /// Each side moves at `max_speed * power * scalar`, with the power clamped to `[0, 1]`. If
    /// the targets differ in magnitude the side with the shorter move is slowed in proportion so
    /// both sides arrive together. A side with no move gets no speed.
    fn cruise_speeds(&self, max_speed: f64, left_scalar: f64, right_scalar: f64) -> (f64, f64) {
        let p = &self.params;
        let (left_scalar, right_scalar) = if p.use_scalars {
            (left_scalar, right_scalar)
        }
        else {
            (1.0, 1.0)
        };

        let power = clamp(p.power, 0.0, 1.0);
        let mut left = max_speed * power * left_scalar;
        let mut right = max_speed * power * right_scalar;

        let (left_dist, right_dist) = (p.left_deg.abs(), p.right_deg.abs());

        if left_dist == 0.0 {
            left = 0.0;
        }
        if right_dist == 0.0 {
            right = 0.0;
        }

        if left_dist > 0.0 && right_dist > 0.0 {
            if left_dist > right_dist {
                right *= right_dist / left_dist;
            }
            else if right_dist > left_dist {
                left *= left_dist / right_dist;
            }
        }

        (left, right)
    }

    fn finish(&mut self, outcome: MotionOutcome) -> bool {
        self.outcome = Some(outcome);
        true
    }
}

impl<M: MotorController> Command for MotionTask<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> &[&'static str] {
        DRIVE_REQUIREMENTS
    }

    fn initialize(&mut self) {
        self.start_time = Some(Instant::now());
        self.outcome = None;

        let settle_time_s;
        {
            let mut drive = lock(&self.drive);

            self.token = Some(drive.begin_motion());
            drive.configure_for_auto();
            drive.clear_encoders();

            let config = *drive.motion_config();
            let (left_speed, right_speed) = self.cruise_speeds(
                config.robot_max_speed,
                drive.speed_scalar(Side::Left),
                drive.speed_scalar(Side::Right)
            );

            drive.move_side(Side::Left, self.params.left_deg, left_speed);
            drive.move_side(Side::Right, self.params.right_deg, right_speed);

            self.monitor = Some(ConvergenceMonitor::new(
                self.params.end_mode,
                config.movement_error_threshold_deg,
                config.debounce_count
            ));
            settle_time_s = config.settle_time_s;
        }

        info!(
            "{}: moving left {:.1} deg, right {:.1} deg at {:.0}% power",
            self.name, self.params.left_deg, self.params.right_deg, self.params.power * 100.0
        );

        // Give the controllers time to take the new targets before polling
        if let Ok(settle) = Duration::try_from_secs_f64(settle_time_s) {
            thread::sleep(settle);
        }
    }

    fn is_finished(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }

        let (start_time, token) = match (self.start_time, self.token) {
            (Some(s), Some(t)) => (s, t),
            _ => return false
        };

        if start_time.elapsed() > self.params.timeout {
            warn!(
                "{}: overtime, stopping after {:.2} s",
                self.name,
                self.params.timeout.as_secs_f64()
            );
            return self.finish(MotionOutcome::TimedOut);
        }

        let errors = {
            let drive = lock(&self.drive);

            if drive.is_motion_owner(token) {
                let left_pos = drive.side_position_deg(Side::Left);
                let right_pos = drive.side_position_deg(Side::Right);

                debug!(
                    "{}: position left {:.1} right {:.1} deg, target left {:.1} right {:.1} deg",
                    self.name, left_pos, right_pos, self.params.left_deg, self.params.right_deg
                );

                Some((left_pos - self.params.left_deg, right_pos - self.params.right_deg))
            }
            else {
                None
            }
        };

        let (left_error, right_error) = match errors {
            Some(e) => e,
            None => {
                info!("{}: superseded by another motion", self.name);
                return self.finish(MotionOutcome::Superseded);
            }
        };

        let converged = match self.monitor.as_mut() {
            Some(m) => m.update(
                left_error,
                right_error,
                self.params.left_deg == 0.0,
                self.params.right_deg == 0.0
            ),
            None => false
        };

        debug!("{}: error left {:.1} right {:.1} deg", self.name, left_error, right_error);

        if converged {
            self.finish(MotionOutcome::Converged)
        }
        else {
            false
        }
    }

    fn end(&mut self) {
        if let Some(token) = self.token {
            // A superseded task must leave the new owner's motion alone
            if lock(&self.drive).end_motion(token) {
                debug!("{}: ended, {:?}", self.name, self.outcome);
            }
        }
    }

    fn interrupted(&mut self) {
        let token = self.token.unwrap_or(0);
        lock(&self.drive).abort_motion(token);
        self.outcome = Some(MotionOutcome::Interrupted);

        info!("{}: interrupted", self.name);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use robot_if::ControlMode;
    use crate::drive::{share, testing::params, TankDrive};
    use crate::sim::SimMotor;

    /// 720 encoder degrees
    const NATIVE_720: f64 = 8192.0;

    fn shared_drive() -> (SharedDrive<SimMotor>, SimMotor, SimMotor) {
        let (l, r) = (SimMotor::stationary(), SimMotor::stationary());
        let d = TankDrive::new(l.clone(), r.clone(), &params()).unwrap();
        (share(d), l, r)
    }

    fn move_params(end_mode: MoveEndMode, left_deg: f64, right_deg: f64) -> MoveParams {
        MoveParams {
            end_mode,
            left_deg,
            right_deg,
            power: 0.5,
            use_scalars: false,
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_monitor_needs_consecutive_hits() {
        let mut m = ConvergenceMonitor::new(MoveEndMode::Both, 10.0, 15);

        for _ in 0..10 {
            assert!(!m.update(1.0, 1.0, false, false));
        }

        // One side out of tolerance resets the count
        assert!(!m.update(1.0, 50.0, false, false));
        assert_eq!(m.hits(), 0);
        assert!(m.left_done());
        assert!(!m.right_done());

        for _ in 0..15 {
            assert!(!m.update(-9.0, 2.0, false, false));
        }
        assert!(m.update(-9.0, 2.0, false, false));
    }

    #[test]
    fn test_monitor_either() {
        let mut m = ConvergenceMonitor::new(MoveEndMode::Either, 10.0, 3);

        for _ in 0..3 {
            assert!(!m.update(500.0, 0.5, false, false));
        }
        assert!(m.update(500.0, 0.5, false, false));
        assert!(!m.left_done());
        assert!(m.right_done());
    }

    #[test]
    fn test_monitor_zero_target_is_done() {
        let mut m = ConvergenceMonitor::new(MoveEndMode::Both, 10.0, 0);
        assert!(m.update(0.0, 300.0, false, true));
    }

    #[test]
    fn test_forward_move_converges() {
        let (drive, l, r) = shared_drive();

        // 96 cm on a 48 cm wheel is 720 degrees
        let target = lock(&drive).geometry().cm_to_enc_degrees(96.0);
        assert_eq!(target, 720.0);

        let mut task = MotionTask::new("fwd", drive.clone(), move_params(MoveEndMode::Both, target, target));
        task.initialize();

        assert_eq!(l.control_mode(), ControlMode::MotionMagic);
        assert_eq!(l.demand(), NATIVE_720);
        assert_eq!(r.demand(), NATIVE_720);
        assert_eq!(l.cruise_velocity(), 1500.0);

        // Not there yet
        assert!(!task.is_finished());

        l.force_position(NATIVE_720 - 10.0);
        r.force_position(NATIVE_720 + 5.0);

        for _ in 0..15 {
            assert!(!task.is_finished());
        }
        assert!(task.is_finished());
        assert_eq!(task.outcome(), Some(MotionOutcome::Converged));

        let monitor = task.monitor().unwrap();
        assert!(monitor.left_done() && monitor.right_done());

        task.end();
        assert_eq!(l.control_mode(), ControlMode::PercentOutput);
        assert_eq!(l.demand(), 0.0);
        assert_eq!(r.demand(), 0.0);
    }

    #[test]
    fn test_timeout_forces_finish() {
        let (drive, l, _) = shared_drive();

        let mut p = move_params(MoveEndMode::Both, 720.0, 720.0);
        p.timeout = Duration::from_millis(200);
        let mut task = MotionTask::new("slow", drive, p);

        task.initialize();
        assert!(!task.is_finished());

        thread::sleep(Duration::from_millis(250));
        assert!(task.is_finished());
        assert_eq!(task.outcome(), Some(MotionOutcome::TimedOut));

        task.end();
        assert_eq!(l.control_mode(), ControlMode::PercentOutput);
        assert_eq!(l.demand(), 0.0);
    }

    #[test]
    fn test_interrupted_stops() {
        let (drive, l, r) = shared_drive();

        let mut task = MotionTask::new("int", drive, move_params(MoveEndMode::Both, 720.0, -720.0));
        task.initialize();
        l.force_position(3000.0);
        task.is_finished();

        task.interrupted();
        assert_eq!(task.outcome(), Some(MotionOutcome::Interrupted));
        for m in [&l, &r].iter() {
            assert_eq!(m.control_mode(), ControlMode::PercentOutput);
            assert_eq!(m.demand(), 0.0);
        }

        // Interrupting before initialisation is still safe
        let (drive, l, _) = shared_drive();
        let mut task = MotionTask::new("never", drive, move_params(MoveEndMode::Both, 1.0, 1.0));
        task.interrupted();
        assert_eq!(l.control_mode(), ControlMode::PercentOutput);
    }

    #[test]
    fn test_superseded_task_leaves_new_motion() {
        let (drive, l, _) = shared_drive();

        let mut first = MotionTask::new("first", drive.clone(), move_params(MoveEndMode::Both, 90.0, 90.0));
        let mut second = MotionTask::new("second", drive.clone(), move_params(MoveEndMode::Both, 180.0, 180.0));

        first.initialize();
        second.initialize();

        assert!(first.is_finished());
        assert_eq!(first.outcome(), Some(MotionOutcome::Superseded));
        first.end();

        assert_eq!(l.control_mode(), ControlMode::MotionMagic);
        assert_eq!(l.demand(), 2048.0);
        assert!(!second.is_finished());
    }

    #[test]
    fn test_cruise_speeds() {
        let (drive, l, r) = shared_drive();
        lock(&drive).set_speed_scalars(0.5, 1.0);

        // Shorter side slowed so both arrive together, scalars ignored
        let mut task = MotionTask::new("arc", drive.clone(), move_params(MoveEndMode::Both, 400.0, 200.0));
        task.initialize();
        assert_eq!(l.cruise_velocity(), 1500.0);
        assert_eq!(r.cruise_velocity(), 750.0);

        // Zero distance side held in position
        let mut p = move_params(MoveEndMode::Both, 0.0, 300.0);
        p.use_scalars = true;
        let mut task = MotionTask::new("pivot", drive.clone(), p);
        task.initialize();
        assert_eq!(l.control_mode(), ControlMode::Position);
        assert_eq!(r.control_mode(), ControlMode::MotionMagic);
        assert_eq!(r.cruise_velocity(), 1500.0);

        // Scalars applied
        let mut p = move_params(MoveEndMode::Both, 300.0, 300.0);
        p.use_scalars = true;
        let mut task = MotionTask::new("scaled", drive.clone(), p);
        task.initialize();
        assert_eq!(l.cruise_velocity(), 750.0);
        assert_eq!(r.cruise_velocity(), 1500.0);

        // Power outside [0, 1] is clamped
        let mut p = move_params(MoveEndMode::Both, 300.0, 300.0);
        p.power = -0.5;
        let mut task = MotionTask::new("negative", drive.clone(), p);
        task.initialize();
        assert_eq!(l.cruise_velocity(), 0.0);
        assert_eq!(r.cruise_velocity(), 0.0);

        let mut p = move_params(MoveEndMode::Both, 300.0, 300.0);
        p.power = 1.5;
        let mut task = MotionTask::new("over", drive, p);
        task.initialize();
        assert_eq!(l.cruise_velocity(), 3000.0);
        assert_eq!(r.cruise_velocity(), 3000.0);
    }
}
