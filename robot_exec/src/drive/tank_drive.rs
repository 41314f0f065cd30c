//! Implementation of the tank drive actuation pair

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, trace, warn};

// Internal
use robot_if::{ControlMode, Gear, MotorController, Reverse, Shifter};
use util::maths::clamp;
use super::{
    arcade_powers,
    DriveError, DriveGeometry, DriveParams, DriveSnapshot, GearShift, GearShiftParams,
    MotionConfig, Side, TeleopParams,
    DEG_PER_REV,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One side of the drive.
struct DriveSide<M> {
    motor: M,

    /// Negate open-loop powers written to this side
    teleop_inverted: bool,

    /// Polarity applied to the controller in closed-loop configuration
    auto_reverse: Reverse,

    /// Multiplier in [0, 1] applied to autonomous cruise speeds
    speed_scalar: f64,
}

/// A drive with two independently actuated sides.
pub struct TankDrive<M> {
    left: DriveSide<M>,
    right: DriveSide<M>,

    geometry: DriveGeometry,
    motion: MotionConfig,
    teleop: TeleopParams,

    /// Last configuration applied to the controllers, `None` before the first
    /// command.
    config: Option<DriveConfig>,

    gearshift: Option<GearShift>,

    /// Token of the motion task currently owning the drive
    motion_token: u64,
    motion_active: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Configuration the controllers are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveConfig {
    /// Open loop, teleop inversion applied in software
    Teleop,

    /// Closed loop, per-side reverse modes applied to the controllers
    Auto,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: MotorController> TankDrive<M> {
    /// Create a new drive from the two lead controllers.
    ///
    /// The right side starts inverted.
    pub fn new(left: M, right: M, params: &DriveParams) -> Result<Self, DriveError> {
        let geometry = DriveGeometry::new(&params.geometry)?;

        if !(params.motion.native_units_per_rev > 0.0) {
            return Err(DriveError::InvalidEncoderResolution(params.motion.native_units_per_rev));
        }

        let side = |motor: M| DriveSide {
            motor,
            teleop_inverted: false,
            auto_reverse: Reverse::None,
            speed_scalar: 1.0,
        };

        let mut drive = Self {
            left: side(left),
            right: side(right),
            geometry,
            motion: params.motion,
            teleop: params.teleop,
            config: None,
            gearshift: None,
            motion_token: 0,
            motion_active: false,
        };

        drive.set_reversed(false);
        drive.set_speed_scalars(params.speed_scalars.left, params.speed_scalars.right);

        Ok(drive)
    }

    pub fn geometry(&self) -> &DriveGeometry {
        &self.geometry
    }

    pub fn motion_config(&self) -> &MotionConfig {
        &self.motion
    }

    pub fn config(&self) -> Option<DriveConfig> {
        self.config
    }

    pub fn motor(&self, side: Side) -> &M {
        &self.side(side).motor
    }

    fn side(&self, side: Side) -> &DriveSide<M> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut DriveSide<M> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    // ---- TELEOP ----

    /// Drive from arcade style stick inputs.
    ///
    /// See [`arcade_powers`] for the shaping applied to the inputs.
    pub fn arcade_drive(&mut self, turn: f64, forward: f64, throttle: f64, full_speed: bool) {
        let powers = arcade_powers(turn, forward, throttle, full_speed, &self.teleop);

        trace!("Arcade drive powers: left {:.3}, right {:.3}", powers.left, powers.right);

        self.tank_drive(powers.left, powers.right);
    }

    /// Write open-loop powers to each side, applying only the teleop inversion.
    pub fn tank_drive(&mut self, left_power: f64, right_power: f64) {
        self.configure_for_teleop();

        for (side, power) in [(Side::Left, left_power), (Side::Right, right_power)].iter() {
            let s = self.side_mut(*side);
            let power = if s.teleop_inverted { -power } else { *power };
            s.motor.set(power);
        }
    }

    /// Command zero open-loop power on both sides.
    ///
    /// The controllers stay enabled so no re-enable step is needed afterwards.
    pub fn stop(&mut self) {
        self.configure_for_teleop();
        self.left.motor.set(0.0);
        self.right.motor.set(0.0);
    }

    /// Set which side is inverted, both for teleop and for closed-loop
    /// control. `false` inverts the right side (the default), `true` the left.
    ///
    /// Only the closed-loop output polarity is flipped, the encoders keep
    /// their phase. Use [`TankDrive::set_auto_reverse`] for a reversed sensor.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.set_teleop_inverted(reversed, !reversed);

        let (inv, norm) = (Reverse::Output, Reverse::None);
        if reversed {
            self.set_auto_reverse(inv, norm);
        }
        else {
            self.set_auto_reverse(norm, inv);
        }
    }

    /// Set the teleop (open-loop) inversion of each side.
    pub fn set_teleop_inverted(&mut self, left: bool, right: bool) {
        self.left.teleop_inverted = left;
        self.right.teleop_inverted = right;
    }

    /// Set the closed-loop reverse mode of each side.
    ///
    /// Takes effect the next time the drive is configured.
    pub fn set_auto_reverse(&mut self, left: Reverse, right: Reverse) {
        self.left.auto_reverse = left;
        self.right.auto_reverse = right;
        self.config = None;
    }

    /// Put both controllers in open-loop mode, if they aren't already.
    pub fn configure_for_teleop(&mut self) {
        if self.config == Some(DriveConfig::Teleop) {
            return;
        }

        for s in [&mut self.left, &mut self.right].iter_mut() {
            s.motor.set_control_mode(ControlMode::PercentOutput);
            // Keep the sensor phase so positions read the same in both configurations
            s.motor.set_sensor_phase(s.auto_reverse.sensor());
        }

        trace!("Drive configured for teleop");
        self.config = Some(DriveConfig::Teleop);
    }

    /// Apply the closed-loop reverse modes, if they aren't already applied.
    ///
    /// Control modes are set per move by [`TankDrive::move_side`].
    pub fn configure_for_auto(&mut self) {
        if self.config == Some(DriveConfig::Auto) {
            return;
        }

        for s in [&mut self.left, &mut self.right].iter_mut() {
            let reverse = s.auto_reverse;
            reverse.apply(&mut s.motor);
        }

        trace!("Drive configured for auto");
        self.config = Some(DriveConfig::Auto);
    }

    // ---- AUTONOMOUS ----

    /// Set the multiplier applied to each side's autonomous speed, clamped to [0, 1].
    pub fn set_speed_scalars(&mut self, left: f64, right: f64) {
        self.left.speed_scalar = clamp(left, 0.0, 1.0);
        self.right.speed_scalar = clamp(right, 0.0, 1.0);
    }

    pub fn speed_scalar(&self, side: Side) -> f64 {
        self.side(side).speed_scalar
    }

    /// Zero both encoders.
    pub fn clear_encoders(&mut self) {
        self.left.motor.set_sensor_position(0.0);
        self.right.motor.set_sensor_position(0.0);
    }

    /// Start a closed-loop move of one side to `target_deg` at `cruise_speed`.
    ///
    /// A zero target uses plain positional control instead of a motion
    /// profile, as profiles degenerate over zero distance.
    pub fn move_side(&mut self, side: Side, target_deg: f64, cruise_speed: f64) {
        let target = self.enc_degrees_to_native(target_deg);
        let accel = self.motion.acceleration;
        let s = self.side_mut(side);

        if target_deg == 0.0 {
            s.motor.set_control_mode(ControlMode::Position);
            s.motor.set(0.0);
        }
        else {
            s.motor.configure_motion_magic(cruise_speed, accel);
            s.motor.set_control_mode(ControlMode::MotionMagic);
            s.motor.set(target);
        }

        debug!(
            "{:?} side moving to {:.1} deg ({:.0} native) at {:.0}",
            side, target_deg, target, cruise_speed
        );
    }

    /// Take ownership of the drive for a new motion, stopping any motion
    /// already in progress. Returns the token identifying the new owner.
    pub fn begin_motion(&mut self) -> u64 {
        if self.motion_active {
            debug!("Stopping motion {} to start a new one", self.motion_token);
            self.stop();
        }

        self.motion_token += 1;
        self.motion_active = true;
        self.motion_token
    }

    /// Returns `true` if `token` identifies the motion currently owning the drive.
    pub fn is_motion_owner(&self, token: u64) -> bool {
        self.motion_active && self.motion_token == token
    }

    /// Stop the drive and release it if `token` still owns it. Returns
    /// `false`, without touching the controllers, if another motion has
    /// taken over.
    pub fn end_motion(&mut self, token: u64) -> bool {
        if !self.is_motion_owner(token) {
            return false;
        }

        self.stop();
        self.motion_active = false;
        true
    }

    /// Stop the drive unconditionally, releasing it if `token` owns it.
    pub fn abort_motion(&mut self, token: u64) {
        self.stop();
        if self.is_motion_owner(token) {
            self.motion_active = false;
        }
    }

    // ---- SENSING ----

    fn native_to_enc_degrees(&self, native: f64) -> f64 {
        native * DEG_PER_REV / self.motion.native_units_per_rev
    }

    fn enc_degrees_to_native(&self, enc_deg: f64) -> f64 {
        enc_deg * self.motion.native_units_per_rev / DEG_PER_REV
    }

    /// Position of a side's encoder.
    ///
    /// Units: encoder degrees
    pub fn side_position_deg(&self, side: Side) -> f64 {
        self.native_to_enc_degrees(self.side(side).motor.sensor_position())
    }

    /// Velocity of a side's encoder.
    ///
    /// Units: native units / 100 ms
    pub fn side_velocity(&self, side: Side) -> f64 {
        self.side(side).motor.sensor_velocity()
    }

    /// Heading estimated from the distance travelled by each side since the
    /// encoders were last cleared.
    ///
    /// Units: degrees, [0, 360)
    pub fn robot_heading(&self) -> f64 {
        self.geometry.heading_deg(
            self.side_position_deg(Side::Left),
            self.side_position_deg(Side::Right)
        )
    }

    pub fn snapshot(&self) -> DriveSnapshot {
        DriveSnapshot {
            left_pos_deg: self.side_position_deg(Side::Left),
            right_pos_deg: self.side_position_deg(Side::Right),
            left_vel: self.side_velocity(Side::Left),
            right_vel: self.side_velocity(Side::Right),
            heading_deg: self.robot_heading(),
            high_gear: self.gearshift.as_ref().map_or(false, |g| g.gear() == Gear::High),
        }
    }

    // ---- GEAR SHIFTING ----

    /// Attach a gear shifting mechanism, starting in low gear.
    pub fn add_gearshift(&mut self, shifter: Box<dyn Shifter>, params: GearShiftParams) {
        self.gearshift = Some(GearShift::new(shifter, params));
    }

    /// Shift according to the current side velocities.
    pub fn autoshift(&mut self) {
        let (left_vel, right_vel) = (self.side_velocity(Side::Left), self.side_velocity(Side::Right));

        match self.gearshift.as_mut() {
            Some(g) => {
                g.autoshift(left_vel, right_vel);
            },
            None => warn!("Cannot autoshift, the drive has no gearshift")
        }
    }

    pub fn shift_to_high(&mut self) {
        self.shift_to(Gear::High)
    }

    pub fn shift_to_low(&mut self) {
        self.shift_to(Gear::Low)
    }

    fn shift_to(&mut self, gear: Gear) {
        match self.gearshift.as_mut() {
            Some(g) => g.shift_to(gear),
            None => warn!("Cannot shift to {:?} gear, the drive has no gearshift", gear)
        }
    }

    pub fn toggle_gear(&mut self) {
        match self.gearshift.as_mut() {
            Some(g) => g.toggle(),
            None => warn!("Cannot toggle gear, the drive has no gearshift")
        }
    }

    /// Returns `true` if the drive is in high gear.
    ///
    /// A drive without a gearshift reports `false`, but asking is almost
    /// certainly a mistake so it's logged as an error.
    pub fn is_in_high_gear(&self) -> bool {
        match self.gearshift.as_ref() {
            Some(g) => g.gear() == Gear::High,
            None => {
                error!("Gear state requested from a drive with no gearshift");
                false
            }
        }
    }
}
