//! Parameters structure for the tank drive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the tank drive, loaded from `drive.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveParams {
    pub geometry: GeometryParams,

    pub motion: MotionConfig,

    #[serde(default)]
    pub teleop: TeleopParams,

    #[serde(default)]
    pub speed_scalars: SpeedScalars,

    /// Thresholds for automatic gear shifting, `None` if the drive has no
    /// gearbox.
    #[serde(default)]
    pub gearshift: Option<GearShiftParams>,

    #[serde(default)]
    pub sim: SimDriveParams,
}

/// Physical dimensions of the drive.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryParams {
    /// Circumference of the wheels.
    ///
    /// Units: centimeters
    pub wheel_circumference_cm: f64,

    /// Turns of the wheel per turn of the encoder shaft.
    pub gear_ratio: f64,

    /// Distance between the front and back wheels of one side.
    ///
    /// Units: centimeters
    pub wheel_base_cm: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: centimeters
    pub track_cm: f64,
}

/// Tuning of the autonomous motion engine.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MotionConfig {
    /// Encoder resolution.
    ///
    /// Units: native units per revolution of the encoder shaft
    pub native_units_per_rev: f64,

    /// Cruise velocity of a motion profile at full power.
    ///
    /// Units: native units / 100 ms
    pub robot_max_speed: f64,

    /// Acceleration of a motion profile.
    ///
    /// Units: native units / 100 ms / s
    pub acceleration: f64,

    /// A side whose absolute error is below this threshold is considered to
    /// have reached its target.
    ///
    /// Units: encoder degrees
    pub movement_error_threshold_deg: f64,

    /// Number of consecutive cycles the end condition must hold for before a
    /// move is finished.
    pub debounce_count: u32,

    /// Time the controllers are given to accept new closed-loop targets
    /// before convergence is polled.
    ///
    /// Units: seconds
    pub settle_time_s: f64,

    /// Multiplier applied to arc turn distances to correct for the
    /// systematic under-travel of arc turns.
    pub arc_turn_correction: f64,
}

/// Tuning of the teleop (arcade) drive.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TeleopParams {
    /// Multiplier applied to the forward input unless full speed is requested.
    pub forward_damping: f64,

    /// Lowest throttle value once mapped into [0, 1].
    pub throttle_floor: f64,

    /// Mapped throttle values above this snap to 1.0.
    pub throttle_snap: f64,

    /// Stick inputs with a magnitude below this are ignored.
    pub deadband: f64,
}

/// Multipliers applied to each side's speed in autonomous moves, used to make
/// the robot drive straight when one side's gearbox is stiffer than the other.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpeedScalars {
    pub left: f64,
    pub right: f64,
}

/// Gear shifting thresholds.
///
/// `shift_up_speed` should be at least `shift_down_speed`, this isn't checked.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GearShiftParams {
    /// Units: native units / 100 ms
    pub shift_up_speed: f64,

    /// Units: native units / 100 ms
    pub shift_down_speed: f64,
}

/// Behaviour of the simulated motors used when no hardware is present.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimDriveParams {
    /// Speed of a simulated motor at full open-loop power.
    ///
    /// Units: native units / 100 ms
    pub free_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TeleopParams {
    fn default() -> Self {
        Self {
            forward_damping: 0.65,
            throttle_floor: 0.3,
            throttle_snap: 0.8,
            deadband: 0.0,
        }
    }
}

impl Default for SimDriveParams {
    fn default() -> Self {
        Self {
            free_speed: 4000.0,
        }
    }
}

impl Default for SpeedScalars {
    fn default() -> Self {
        Self {
            left: 1.0,
            right: 1.0,
        }
    }
}
