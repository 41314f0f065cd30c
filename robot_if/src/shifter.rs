//! # Gear shifter interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Gears of a two speed drive gearbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    Low,
    High,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The mechanism (usually a pneumatic piston) that physically changes gear.
pub trait Shifter: Send {
    /// Engage the given gear.
    fn engage(&mut self, gear: Gear);
}
