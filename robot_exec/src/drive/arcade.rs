//! Arcade drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::{clamp_pos_neg_1, lin_map, thresh};

use super::TeleopParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-side open-loop powers, before any inversion is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidePowers {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a throttle axis in [-1, 1] onto a power multiplier.
///
/// The axis is first mapped into [0, 1]; anything below the floor is raised to
/// the floor and anything above the snap point becomes 1.0.
pub fn throttle_scale(throttle: f64, params: &TeleopParams) -> f64 {
    let scale = lin_map((-1.0, 1.0), (0.0, 1.0), throttle);

    if scale < params.throttle_floor {
        params.throttle_floor
    }
    else if scale > params.throttle_snap {
        1.0
    }
    else {
        scale
    }
}

/// Convert arcade stick inputs into side powers.
///
/// - `turn` - horizontal stick axis, positive drives the right side faster
/// - `forward` - vertical stick axis, positive drives forward
/// - `throttle` - throttle axis in [-1, 1]
/// - `full_speed` - skip the forward damping
pub fn arcade_powers(
    turn: f64,
    forward: f64,
    throttle: f64,
    full_speed: bool,
    params: &TeleopParams
) -> SidePowers {
    let mut turn = thresh(turn, params.deadband);
    let mut forward = thresh(forward, params.deadband);

    if !full_speed {
        forward *= params.forward_damping;
    }

    let scale = throttle_scale(throttle, params);
    forward *= scale;
    turn *= scale;

    SidePowers {
        left: clamp_pos_neg_1(forward - turn),
        right: clamp_pos_neg_1(forward + turn),
    }
}
