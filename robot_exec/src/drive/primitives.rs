//! Motion primitives
//!
//! Every movement kind reduces to a [`MoveParams`] for a [`MotionTask`]. The `*_params` functions
//! compute those parameters from the drive geometry, the remaining functions build the task for a
//! shared drive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::PI;
use std::time::Duration;
use serde::Deserialize;

// Internal
use robot_if::MotorController;
use crate::command::CommandSequence;
use super::{
    lock,
    DriveGeometry, MotionTask, MoveEndMode, MoveParams, SharedDrive,
    DEG_PER_REV,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One straight leg of a path.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionPrimitive {
    /// Units: centimeters, negative drives backwards
    pub distance_cm: f64,

    /// Fraction of the maximum speed, in [0, 1]
    pub speed_fraction: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Both sides move `distance_cm`, with the speed scalars applied.
pub fn forward_params(geometry: &DriveGeometry, distance_cm: f64, power: f64, timeout: Duration)
    -> MoveParams
{
    let d = geometry.cm_to_enc_degrees(distance_cm);

    MoveParams {
        end_mode: MoveEndMode::Both,
        left_deg: d,
        right_deg: d,
        power,
        use_scalars: true,
        timeout,
    }
}

/// Rotate `degrees` about the centre of the robot, the sides moving in
/// opposite directions around the turning circle.
pub fn in_place_turn_params(
    geometry: &DriveGeometry,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MoveParams {
    let d = geometry.cm_to_enc_degrees(
        geometry.turning_circle_circumference_cm() * degrees / DEG_PER_REV
    );

    let (left_deg, right_deg) = match direction {
        Direction::Right => (d, -d),
        Direction::Left => (-d, d),
    };

    MoveParams {
        end_mode: MoveEndMode::Both,
        left_deg,
        right_deg,
        power,
        use_scalars: false,
        timeout,
    }
}

/// Turn `degrees` by driving only the side opposite the turn direction,
/// pivoting about the stationary side.
///
/// The distance is scaled by `correction` since arc turns under-travel. The
/// undriven axle needs an omni wheel (or similar) for the pivot to work.
pub fn arc_turn_params(
    geometry: &DriveGeometry,
    correction: f64,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MoveParams {
    let d = geometry.cm_to_enc_degrees(arc_length_cm(geometry.track_cm(), degrees)) * correction;

    let (left_deg, right_deg) = match direction {
        Direction::Right => (d, 0.0),
        Direction::Left => (0.0, d),
    };

    MoveParams {
        end_mode: MoveEndMode::Both,
        left_deg,
        right_deg,
        power,
        use_scalars: false,
        timeout,
    }
}

/// Turn `degrees` along an arc of `radius_cm`, measured to the centre of the
/// robot, with both sides driven.
pub fn radius_arc_turn_params(
    geometry: &DriveGeometry,
    correction: f64,
    radius_cm: f64,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MoveParams {
    let half_track = geometry.track_cm() / 2.0;
    let inner = geometry.cm_to_enc_degrees(arc_length_cm(radius_cm - half_track, degrees)) * correction;
    let outer = geometry.cm_to_enc_degrees(arc_length_cm(radius_cm + half_track, degrees)) * correction;

    let (left_deg, right_deg) = match direction {
        Direction::Right => (outer, inner),
        Direction::Left => (inner, outer),
    };

    MoveParams {
        end_mode: MoveEndMode::Both,
        left_deg,
        right_deg,
        power,
        use_scalars: false,
        timeout,
    }
}

/// Length of an arc of `degrees` on a circle of `radius_cm`.
fn arc_length_cm(radius_cm: f64, degrees: f64) -> f64 {
    2.0 * PI * radius_cm * degrees / DEG_PER_REV
}

pub fn drive_forward<M: MotorController>(
    drive: &SharedDrive<M>,
    distance_cm: f64,
    power: f64,
    timeout: Duration
) -> MotionTask<M> {
    let params = forward_params(lock(drive).geometry(), distance_cm, power, timeout);
    MotionTask::new(&format!("Forward {:.0} cm", distance_cm), drive.clone(), params)
}

pub fn turn_in_place<M: MotorController>(
    drive: &SharedDrive<M>,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MotionTask<M> {
    let params = in_place_turn_params(lock(drive).geometry(), degrees, direction, power, timeout);
    MotionTask::new(&format!("Turn {:.0} deg {:?}", degrees, direction), drive.clone(), params)
}

pub fn arc_turn<M: MotorController>(
    drive: &SharedDrive<M>,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MotionTask<M> {
    let params = {
        let d = lock(drive);
        arc_turn_params(
            d.geometry(), d.motion_config().arc_turn_correction, degrees, direction, power, timeout
        )
    };
    MotionTask::new(&format!("Arc {:.0} deg {:?}", degrees, direction), drive.clone(), params)
}

pub fn radius_arc_turn<M: MotorController>(
    drive: &SharedDrive<M>,
    radius_cm: f64,
    degrees: f64,
    direction: Direction,
    power: f64,
    timeout: Duration
) -> MotionTask<M> {
    let params = {
        let d = lock(drive);
        radius_arc_turn_params(
            d.geometry(),
            d.motion_config().arc_turn_correction,
            radius_cm,
            degrees,
            direction,
            power,
            timeout
        )
    };
    MotionTask::new(
        &format!("Arc {:.0} deg {:?} on {:.0} cm", degrees, direction, radius_cm),
        drive.clone(),
        params
    )
}

/// A sequence of forward moves, one per primitive, each with the given timeout.
pub fn forward_segments<M: MotorController + 'static>(
    name: &str,
    drive: &SharedDrive<M>,
    segments: &[MotionPrimitive],
    timeout: Duration
) -> CommandSequence {
    segments.iter().fold(CommandSequence::new(name), |seq, s| {
        seq.then(Box::new(drive_forward(drive, s.distance_cm, s.speed_fraction, timeout)))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::Command;
    use crate::drive::{share, testing::params, TankDrive};
    use crate::sim::SimMotor;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn geometry() -> DriveGeometry {
        DriveGeometry::new(&params().geometry).unwrap()
    }

    #[test]
    fn test_forward() {
        let p = forward_params(&geometry(), 96.0, 0.5, TIMEOUT);

        assert_eq!(p.left_deg, 720.0);
        assert_eq!(p.right_deg, 720.0);
        assert_eq!(p.end_mode, MoveEndMode::Both);
        assert!(p.use_scalars);
    }

    #[test]
    fn test_in_place_turn() {
        let g = geometry();
        let p = in_place_turn_params(&g, 90.0, Direction::Left, 0.5, TIMEOUT);

        let expected = g.cm_to_enc_degrees(g.turning_circle_circumference_cm() * 0.25);
        assert!((p.right_deg - expected).abs() < 1e-9);
        assert_eq!(p.left_deg, -p.right_deg);
        assert!(!p.use_scalars);

        let p = in_place_turn_params(&g, 90.0, Direction::Right, 0.5, TIMEOUT);
        assert!(p.left_deg > 0.0 && p.right_deg < 0.0);
    }

    #[test]
    fn test_arc_turn() {
        let g = geometry();
        let p = arc_turn_params(&g, 1.06, 90.0, Direction::Right, 0.5, TIMEOUT);

        // Quarter circle with the track as radius
        let expected = g.cm_to_enc_degrees(2.0 * PI * 30.0 / 4.0) * 1.06;
        assert!((p.left_deg - expected).abs() < 1e-9);
        assert_eq!(p.right_deg, 0.0);

        let p = arc_turn_params(&g, 1.06, 90.0, Direction::Left, 0.5, TIMEOUT);
        assert_eq!(p.left_deg, 0.0);
        assert!((p.right_deg - expected).abs() < 1e-9);
    }

    #[test]
    fn test_radius_arc_turn() {
        let g = geometry();
        let p = radius_arc_turn_params(&g, 1.0, 100.0, 90.0, Direction::Left, 0.5, TIMEOUT);

        assert!((p.left_deg - g.cm_to_enc_degrees(2.0 * PI * 85.0 / 4.0)).abs() < 1e-9);
        assert!((p.right_deg - g.cm_to_enc_degrees(2.0 * PI * 115.0 / 4.0)).abs() < 1e-9);

        let q = radius_arc_turn_params(&g, 1.06, 100.0, 90.0, Direction::Right, 0.5, TIMEOUT);
        assert!((q.left_deg - p.right_deg * 1.06).abs() < 1e-9);
        assert!((q.right_deg - p.left_deg * 1.06).abs() < 1e-9);
    }

    #[test]
    fn test_task_constructors() {
        let drive = share(
            TankDrive::new(SimMotor::stationary(), SimMotor::stationary(), &params()).unwrap()
        );

        let task = drive_forward(&drive, 96.0, 0.4, TIMEOUT);
        assert_eq!(task.params().left_deg, 720.0);
        assert_eq!(task.name(), "Forward 96 cm");

        let task = arc_turn(&drive, 90.0, Direction::Left, 0.4, TIMEOUT);
        assert_eq!(task.params().left_deg, 0.0);

        let seq = forward_segments(
            "path",
            &drive,
            &[
                MotionPrimitive { distance_cm: 48.0, speed_fraction: 0.5 },
                MotionPrimitive { distance_cm: -24.0, speed_fraction: 0.3 },
            ],
            TIMEOUT
        );
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.requirements(), &[crate::drive::DRIVE_SUBSYSTEM]);
    }
}
