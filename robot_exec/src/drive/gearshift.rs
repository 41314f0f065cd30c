//! Two speed gearbox shifting

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use robot_if::{Gear, Shifter};
use super::GearShiftParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shifting mechanism plus the gear it was last put in.
pub struct GearShift {
    shifter: Box<dyn Shifter>,
    params: GearShiftParams,
    gear: Gear,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Decide which gear the drive should be in given the current gear and the
/// measured velocity of each side.
///
/// Rules, first match wins:
///  1. High gear and the sides turning in opposite directions (spinning in
///     place): low gear.
///  2. Low gear and both sides faster than the shift up speed: high gear.
///  3. High gear and both sides slower than the shift down speed: low gear.
///
/// Speeds are compared by magnitude so driving backwards shifts the same way
/// as driving forwards.
pub fn select_gear(current: Gear, left_vel: f64, right_vel: f64, params: &GearShiftParams) -> Gear {
    let (left_speed, right_speed) = (left_vel.abs(), right_vel.abs());

    match current {
        Gear::High if left_vel * right_vel < 0.0 => Gear::Low,
        Gear::Low if left_speed > params.shift_up_speed && right_speed > params.shift_up_speed
            => Gear::High,
        Gear::High if left_speed < params.shift_down_speed && right_speed < params.shift_down_speed
            => Gear::Low,
        g => g,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GearShift {
    /// Attach a shifter, which is immediately put into low gear.
    pub fn new(mut shifter: Box<dyn Shifter>, params: GearShiftParams) -> Self {
        shifter.engage(Gear::Low);

        Self {
            shifter,
            params,
            gear: Gear::Low,
        }
    }

    pub fn gear(&self) -> Gear {
        self.gear
    }

    /// Engage the given gear. Does nothing if already in that gear.
    pub fn shift_to(&mut self, gear: Gear) {
        if gear != self.gear {
            debug!("Shifting to {:?} gear", gear);
            self.shifter.engage(gear);
            self.gear = gear;
        }
    }

    /// Toggle between low and high gear.
    pub fn toggle(&mut self) {
        let gear = match self.gear {
            Gear::Low => Gear::High,
            Gear::High => Gear::Low,
        };
        self.shift_to(gear);
    }

    /// Evaluate the shifting rules against the measured side velocities and
    /// engage the chosen gear, returning it.
    pub fn autoshift(&mut self, left_vel: f64, right_vel: f64) -> Gear {
        let gear = select_gear(self.gear, left_vel, right_vel, &self.params);
        self.shift_to(gear);
        gear
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimShifter;

    const PARAMS: GearShiftParams = GearShiftParams {
        shift_up_speed: 2000.0,
        shift_down_speed: 1000.0,
    };

    #[test]
    fn test_select_gear() {
        // Both sides fast in low gear
        assert_eq!(select_gear(Gear::Low, 2500.0, 2100.0, &PARAMS), Gear::High);
        assert_eq!(select_gear(Gear::Low, -2500.0, -2100.0, &PARAMS), Gear::High);

        // Only one side fast
        assert_eq!(select_gear(Gear::Low, 2500.0, 1500.0, &PARAMS), Gear::Low);

        // Spinning in place at speed always drops out of high gear
        assert_eq!(select_gear(Gear::High, 2500.0, -2500.0, &PARAMS), Gear::Low);

        // Both slow in high gear
        assert_eq!(select_gear(Gear::High, 900.0, 500.0, &PARAMS), Gear::Low);

        // Between the thresholds with matching signs nothing changes
        for &gear in &[Gear::Low, Gear::High] {
            assert_eq!(select_gear(gear, 1500.0, 1200.0, &PARAMS), gear);
            assert_eq!(select_gear(gear, -1500.0, -1800.0, &PARAMS), gear);
        }
    }

    #[test]
    fn test_autoshift_engages_shifter() {
        let shifter = SimShifter::new();
        let mut gs = GearShift::new(Box::new(shifter.clone()), PARAMS);

        assert_eq!(shifter.engaged(), Some(Gear::Low));

        assert_eq!(gs.autoshift(3000.0, 3000.0), Gear::High);
        assert_eq!(shifter.engaged(), Some(Gear::High));
        assert_eq!(shifter.num_shifts(), 2);

        // Staying in gear doesn't re-engage
        gs.autoshift(3000.0, 3000.0);
        assert_eq!(shifter.num_shifts(), 2);

        gs.autoshift(3000.0, -3000.0);
        assert_eq!(gs.gear(), Gear::Low);

        gs.toggle();
        assert_eq!(shifter.engaged(), Some(Gear::High));
    }
}
