//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the inclusive range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Limit a value to `[-1, 1]`, the range of a motor power.
pub fn clamp_pos_neg_1<T>(value: T) -> T
where
    T: Float
{
    clamp(value, -T::one(), T::one())
}

/// Return zero if the magnitude of `value` is below the magnitude of
/// `threshold`, otherwise return `value` unchanged.
pub fn thresh<T>(value: T, threshold: T) -> T
where
    T: Float
{
    if value.abs() < threshold.abs() {
        T::zero()
    }
    else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Normalise an angle in degrees into the range `[0, 360)`.
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let theta = rem_euclid(angle, 360.0);

    // Round-off in rem_euclid can produce exactly 360
    if theta >= 360.0 {
        0.0
    }
    else {
        theta
    }
}
