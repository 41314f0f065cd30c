//! Drive geometry and unit conversions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;
use util::maths::normalize_angle_deg;

use super::{DriveError, GeometryParams, DEG_PER_REV};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Immutable geometry of a tank drive.
///
/// Wheel circumference and gear ratio are guaranteed to be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    wheel_circumference_cm: f64,
    gear_ratio: f64,
    wheel_base_cm: f64,
    track_cm: f64,
    turning_circle_circumference_cm: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveGeometry {
    /// Build the geometry, checking that the gear ratio and wheel circumference are valid.
    pub fn new(params: &GeometryParams) -> Result<Self, DriveError> {
        // Written as negated comparisons so NaN is rejected too
        if !(params.gear_ratio > 0.0) {
            return Err(DriveError::InvalidGearRatio(params.gear_ratio));
        }
        if !(params.wheel_circumference_cm > 0.0) {
            return Err(DriveError::InvalidWheelCircumference(params.wheel_circumference_cm));
        }

        // Diameter of the circle the wheels trace when turning in place
        let turning_circle_diameter_cm =
            (params.track_cm.powi(2) + params.wheel_base_cm.powi(2)).sqrt();

        Ok(Self {
            wheel_circumference_cm: params.wheel_circumference_cm,
            gear_ratio: params.gear_ratio,
            wheel_base_cm: params.wheel_base_cm,
            track_cm: params.track_cm,
            turning_circle_circumference_cm: turning_circle_diameter_cm * PI,
        })
    }

    pub fn wheel_circumference_cm(&self) -> f64 {
        self.wheel_circumference_cm
    }

    pub fn gear_ratio(&self) -> f64 {
        self.gear_ratio
    }

    pub fn wheel_base_cm(&self) -> f64 {
        self.wheel_base_cm
    }

    pub fn track_cm(&self) -> f64 {
        self.track_cm
    }

    /// Circumference of the circle traced by the wheels when turning in place.
    pub fn turning_circle_circumference_cm(&self) -> f64 {
        self.turning_circle_circumference_cm
    }

    /// Convert cm of robot movement to encoder movement in degrees.
    pub fn cm_to_enc_degrees(&self, cm: f64) -> f64 {
        (cm * DEG_PER_REV) / (self.wheel_circumference_cm * self.gear_ratio)
    }

    /// Convert encoder movement in degrees to cm of robot movement.
    pub fn enc_degrees_to_cm(&self, enc_deg: f64) -> f64 {
        (enc_deg / DEG_PER_REV) * self.wheel_circumference_cm * self.gear_ratio
    }

    /// Estimate the angle the robot has turned through from the distance
    /// travelled by each side, in encoder degrees.
    ///
    /// Range: [0, 360), 0 is straight ahead.
    pub fn heading_deg(&self, left_enc_deg: f64, right_enc_deg: f64) -> f64 {
        let difference_cm =
            self.enc_degrees_to_cm(left_enc_deg) - self.enc_degrees_to_cm(right_enc_deg);

        normalize_angle_deg((difference_cm / self.turning_circle_circumference_cm) * DEG_PER_REV)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn geometry(circ: f64, ratio: f64) -> DriveGeometry {
        DriveGeometry::new(&GeometryParams {
            wheel_circumference_cm: circ,
            gear_ratio: ratio,
            wheel_base_cm: 30.0,
            track_cm: 30.0,
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_geometry() {
        let mut params = GeometryParams {
            wheel_circumference_cm: 48.0,
            gear_ratio: 0.0,
            wheel_base_cm: 30.0,
            track_cm: 30.0,
        };

        assert!(matches!(DriveGeometry::new(&params), Err(DriveError::InvalidGearRatio(_))));
        params.gear_ratio = -2.0;
        assert!(matches!(DriveGeometry::new(&params), Err(DriveError::InvalidGearRatio(_))));
        params.gear_ratio = std::f64::NAN;
        assert!(matches!(DriveGeometry::new(&params), Err(DriveError::InvalidGearRatio(_))));

        params.gear_ratio = 1.0;
        params.wheel_circumference_cm = 0.0;
        assert!(matches!(
            DriveGeometry::new(&params),
            Err(DriveError::InvalidWheelCircumference(_))
        ));
    }

    #[test]
    fn test_cm_to_enc_degrees() {
        let g = geometry(48.0, 1.0);
        assert_eq!(g.cm_to_enc_degrees(96.0), 720.0);
        assert_eq!(g.enc_degrees_to_cm(720.0), 96.0);

        let g = geometry(48.0, 2.0);
        assert_eq!(g.cm_to_enc_degrees(96.0), 360.0);
    }

    #[test]
    fn test_conversion_round_trip() {
        for &ratio in &[0.1, 0.5, 1.0, 1.0 / 3.0, 2.5, 12.75] {
            let g = geometry(47.88, ratio);
            for &d in &[-250.0, -1.0, 0.0, 0.001, 30.0, 96.0, 1234.5] {
                let back = g.enc_degrees_to_cm(g.cm_to_enc_degrees(d));
                assert!((back - d).abs() < 1e-9, "ratio {} dist {} came back as {}", ratio, d, back);
            }
        }
    }

    #[test]
    fn test_turning_circle() {
        let g = geometry(48.0, 1.0);
        let expected = (30f64.powi(2) * 2.0).sqrt() * PI;
        assert!((g.turning_circle_circumference_cm() - expected).abs() < 1e-12);
        assert!((g.turning_circle_circumference_cm() - 133.29).abs() < 0.01);
    }

    #[test]
    fn test_heading() {
        let g = geometry(48.0, 1.0);
        let circ = g.turning_circle_circumference_cm();

        assert_eq!(g.heading_deg(0.0, 0.0), 0.0);
        assert_eq!(g.heading_deg(500.0, 500.0), 0.0);

        // Left side a quarter of the turning circle ahead of the right: 90 degrees
        let quarter = g.cm_to_enc_degrees(circ / 4.0);
        assert!((g.heading_deg(quarter, 0.0) - 90.0).abs() < 1e-9);

        // The other way round wraps to 270
        assert!((g.heading_deg(0.0, quarter) - 270.0).abs() < 1e-9);
    }
}
