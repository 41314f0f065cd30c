//! Simulated operator joystick

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex, PoisonError};
use log::{debug, trace};
use serde::Deserialize;

use robot_if::{ListenerManager, RecountError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arcade stick inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JoystickAxes {
    pub turn: f64,
    pub forward: f64,
    pub throttle: f64,
    pub full_speed: bool,
}

/// A joystick held in a fixed position.
///
/// Each tick publishes the held axes to the [`JoystickHandle`]s, the way a
/// real listener manager would dispatch its axis listeners.
pub struct SimJoystick {
    held: JoystickAxes,
    latest: Arc<Mutex<JoystickAxes>>,
    num_ticks: u64,
}

/// Read side of a [`SimJoystick`], given to the robot.
#[derive(Clone)]
pub struct JoystickHandle {
    latest: Arc<Mutex<JoystickAxes>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimJoystick {
    /// Create a joystick held at `held`. The handle reads neutral axes until
    /// the first tick.
    pub fn new(held: JoystickAxes) -> (Self, JoystickHandle) {
        let latest = Arc::new(Mutex::new(JoystickAxes::default()));

        (
            Self { held, latest: latest.clone(), num_ticks: 0 },
            JoystickHandle { latest }
        )
    }
}

impl ListenerManager for SimJoystick {
    fn tick(&mut self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = self.held;
        self.num_ticks += 1;
        trace!("Joystick tick {}", self.num_ticks);
    }

    fn recount_controls(&mut self) -> Result<(), RecountError> {
        debug!("Simulated joystick controls: turn, forward, throttle, full speed");
        Ok(())
    }
}

impl JoystickHandle {
    pub fn read(&self) -> JoystickAxes {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
