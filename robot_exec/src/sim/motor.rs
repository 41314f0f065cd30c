//! Simulated motor controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

// Internal
use robot_if::{ControlMode, MotorController};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocities are expressed per 100 ms.
const VEL_PERIODS_PER_S: f64 = 10.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated motor controller with an encoder.
///
/// Clones share the same simulated motor, so a test can keep a handle to a
/// motor after giving it to a drive. The position is integrated from wall
/// clock time whenever the motor is read or commanded. In open loop the
/// motor turns at `demand * free_speed`, in closed loop it moves towards the
/// target at the cruise velocity (motion profiled) or the free speed
/// (positional).
#[derive(Clone)]
pub struct SimMotor {
    state: Arc<Mutex<SimMotorState>>,
}

struct SimMotorState {
    mode: ControlMode,
    demand: f64,
    cruise_velocity: f64,
    acceleration: f64,

    output_inverted: bool,
    sensor_phase: bool,

    position: f64,
    velocity: f64,

    /// Units: native units / 100 ms, `None` for a motor that never moves on
    /// its own.
    free_speed: Option<f64>,
    last_update: Instant,

    num_mode_changes: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimMotor {
    /// Create a motor turning at `free_speed` (native units / 100 ms) at full power.
    pub fn new(free_speed: f64) -> Self {
        Self::with_free_speed(Some(free_speed))
    }

    /// Create a motor which only moves when told to with
    /// [`SimMotor::force_position`].
    pub fn stationary() -> Self {
        Self::with_free_speed(None)
    }

    fn with_free_speed(free_speed: Option<f64>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimMotorState {
                mode: ControlMode::PercentOutput,
                demand: 0.0,
                cruise_velocity: 0.0,
                acceleration: 0.0,
                output_inverted: false,
                sensor_phase: false,
                position: 0.0,
                velocity: 0.0,
                free_speed,
                last_update: Instant::now(),
                num_mode_changes: 0,
            }))
        }
    }

    /// Lock the state, bringing the simulated position up to date.
    fn state(&self) -> MutexGuard<'_, SimMotorState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.update();
        state
    }

    /// Teleport the sensed position.
    pub fn force_position(&self, position: f64) {
        self.state().position = position;
    }

    pub fn cruise_velocity(&self) -> f64 {
        self.state().cruise_velocity
    }

    pub fn acceleration(&self) -> f64 {
        self.state().acceleration
    }

    pub fn output_inverted(&self) -> bool {
        self.state().output_inverted
    }

    pub fn sensor_phase(&self) -> bool {
        self.state().sensor_phase
    }

    /// Number of times the control mode has been set, changed or not.
    pub fn num_mode_changes(&self) -> usize {
        self.state().num_mode_changes
    }
}

impl SimMotorState {
    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f64();
        self.last_update = now;

        let free_speed = match self.free_speed {
            Some(s) => s,
            None => return
        };

        self.velocity = match self.mode {
            ControlMode::PercentOutput => {
                // Open loop, a reversed sensor sees the motion backwards
                let v = self.demand * free_speed;
                if self.sensor_phase { -v } else { v }
            },
            ControlMode::Position | ControlMode::MotionMagic => {
                let speed = match self.mode {
                    ControlMode::MotionMagic => self.cruise_velocity,
                    _ => free_speed
                };
                let step = speed * VEL_PERIODS_PER_S * dt;
                let error = self.demand - self.position;

                if error.abs() <= step {
                    self.position = self.demand;
                    0.0
                }
                else {
                    speed * error.signum()
                }
            }
        };

        if self.position != self.demand || self.mode == ControlMode::PercentOutput {
            self.position += self.velocity * VEL_PERIODS_PER_S * dt;
        }
    }
}

impl MotorController for SimMotor {
    fn set_control_mode(&mut self, mode: ControlMode) {
        let mut state = self.state();
        state.mode = mode;
        state.num_mode_changes += 1;
    }

    fn control_mode(&self) -> ControlMode {
        self.state().mode
    }

    fn set(&mut self, demand: f64) {
        self.state().demand = demand;
    }

    fn demand(&self) -> f64 {
        self.state().demand
    }

    fn configure_motion_magic(&mut self, cruise_velocity: f64, acceleration: f64) {
        let mut state = self.state();
        state.cruise_velocity = cruise_velocity;
        state.acceleration = acceleration;
    }

    fn sensor_position(&self) -> f64 {
        self.state().position
    }

    fn sensor_velocity(&self) -> f64 {
        self.state().velocity
    }

    fn set_sensor_position(&mut self, position: f64) {
        self.state().position = position;
    }

    fn set_output_inverted(&mut self, inverted: bool) {
        self.state().output_inverted = inverted;
    }

    fn set_sensor_phase(&mut self, reversed: bool) {
        self.state().sensor_phase = reversed;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stationary_motor() {
        let mut m = SimMotor::stationary();
        m.set(1.0);
        thread::sleep(Duration::from_millis(5));
        assert_eq!(m.sensor_position(), 0.0);

        m.force_position(100.0);
        assert_eq!(m.sensor_position(), 100.0);
    }

    #[test]
    fn test_open_loop_motion() {
        let mut m = SimMotor::new(1000.0);
        m.set(0.5);
        thread::sleep(Duration::from_millis(50));

        // 500 native / 100 ms for at least 50 ms
        assert!(m.sensor_position() >= 240.0);
        assert_eq!(m.sensor_velocity(), 500.0);

        // Reversed sensor reads backwards
        m.set_sensor_phase(true);
        assert!(m.sensor_velocity() < 0.0);
    }

    #[test]
    fn test_closed_loop_reaches_target() {
        let mut m = SimMotor::new(10_000.0);
        m.configure_motion_magic(10_000.0, 5000.0);
        m.set_control_mode(ControlMode::MotionMagic);
        m.set(500.0);

        // 10000 native / 100 ms covers 500 in 5 ms
        thread::sleep(Duration::from_millis(20));
        assert_eq!(m.sensor_position(), 500.0);
        assert_eq!(m.sensor_velocity(), 0.0);

        // Clones share the motor
        let handle = m.clone();
        m.set_control_mode(ControlMode::PercentOutput);
        m.set(0.0);
        m.set_sensor_position(0.0);
        assert_eq!(handle.sensor_position(), 0.0);
        assert_eq!(handle.num_mode_changes(), 2);
    }
}
