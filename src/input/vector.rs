//! 2-D vector math shared by both joysticks
//!
//! Pure functions only. The same `Vector2` type carries raw pixel
//! displacements, normalized move vectors and absolute screen points; callers
//! track which one they hold.

use serde::{Deserialize, Serialize};
use std::ops::{Div, Mul, Sub};

/// A 2-D displacement or direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

/// Absolute on-screen position (same layout as a displacement)
pub type Point2 = Vector2;

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, scalar: f64) -> Vector2 {
        Vector2::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    fn div(self, scalar: f64) -> Vector2 {
        Vector2::new(self.x / scalar, self.y / scalar)
    }
}

/// Euclidean norm of `v`
pub fn distance(v: Vector2) -> f64 {
    v.x.hypot(v.y)
}

/// Clamp `v` to a circle of radius `r`.
///
/// Points inside (or on) the circle are returned bit-for-bit unchanged.
/// Points outside are rescaled to magnitude exactly `r`, keeping direction.
/// The zero vector is inside any circle with `r >= 0`, so there is no
/// division by zero.
///
/// # Example
/// ```
/// use twinstick_pad::input::vector::{clamp_to_radius, distance, Vector2};
///
/// let clamped = clamp_to_radius(Vector2::new(300.0, 400.0), 50.0);
/// assert!((distance(clamped) - 50.0).abs() < 1e-9);
///
/// let inside = Vector2::new(3.0, 4.0);
/// assert_eq!(clamp_to_radius(inside, 50.0), inside);
/// ```
pub fn clamp_to_radius(v: Vector2, r: f64) -> Vector2 {
    let magnitude = distance(v);

    if magnitude <= r || magnitude == 0.0 {
        return v;
    }

    // Outside the circle: scale back to the edge
    let r = r.max(0.0);
    v * (r / magnitude)
}

/// Unit vector pointing along `v`.
///
/// Must not be called with the zero vector; callers guard against it.
pub fn normalize(v: Vector2) -> Vector2 {
    v / distance(v)
}

/// Direction of `v` in radians, `atan2(y, x)`, range `(-π, π]`
pub fn angle_of(v: Vector2) -> f64 {
    let angle = v.y.atan2(v.x);
    // atan2(-0.0, x<0) yields -π, which sits outside the half-open range
    if angle == -std::f64::consts::PI {
        std::f64::consts::PI
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_pythagorean() {
        assert_eq!(distance(Vector2::new(30.0, 40.0)), 50.0);
        assert_eq!(distance(Vector2::ZERO), 0.0);
    }

    #[test]
    fn test_clamp_outside_hits_radius() {
        let v = clamp_to_radius(Vector2::new(-300.0, 0.0), 75.0);
        assert!((v.x + 75.0).abs() < 1e-9);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_clamp_zero_vector_passes_through() {
        assert_eq!(clamp_to_radius(Vector2::ZERO, 0.0), Vector2::ZERO);
        assert_eq!(clamp_to_radius(Vector2::ZERO, 10.0), Vector2::ZERO);
    }

    #[test]
    fn test_clamp_zero_radius_collapses() {
        let v = clamp_to_radius(Vector2::new(12.0, -5.0), 0.0);
        assert_eq!(distance(v), 0.0);
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize(Vector2::new(0.0, -8.0));
        assert_eq!(n, Vector2::new(0.0, -1.0));
    }

    #[test]
    fn test_angle_quadrants() {
        use std::f64::consts::{FRAC_PI_2, PI};

        assert_eq!(angle_of(Vector2::new(1.0, 0.0)), 0.0);
        assert!((angle_of(Vector2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle_of(Vector2::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert!((angle_of(Vector2::new(0.0, -1.0)) + FRAC_PI_2).abs() < 1e-12);
        assert_eq!(angle_of(Vector2::new(-1.0, -0.0)), PI);
    }

    proptest! {
        #[test]
        fn prop_clamp_never_exceeds_radius(
            x in -1.0e4f64..1.0e4,
            y in -1.0e4f64..1.0e4,
            r in 0.0f64..500.0,
        ) {
            let clamped = clamp_to_radius(Vector2::new(x, y), r);
            prop_assert!(distance(clamped) <= r + 1e-9);
        }

        #[test]
        fn prop_clamp_is_identity_inside(
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            extra in 0.0f64..100.0,
        ) {
            let v = Vector2::new(x, y);
            let r = distance(v) + extra;
            prop_assert_eq!(clamp_to_radius(v, r), v);
        }

        #[test]
        fn prop_angle_reconstructs_direction(
            x in -1.0e3f64..1.0e3,
            y in -1.0e3f64..1.0e3,
        ) {
            let v = Vector2::new(x, y);
            prop_assume!(distance(v) > 1e-6);

            let angle = angle_of(v);
            let rebuilt = Vector2::new(angle.cos(), angle.sin()) * distance(v);

            // Parallel and same-facing: zero cross product, positive dot product
            let cross = rebuilt.x * v.y - rebuilt.y * v.x;
            let dot = rebuilt.x * v.x + rebuilt.y * v.y;
            prop_assert!(cross.abs() <= 1e-6 * distance(v).powi(2).max(1.0));
            prop_assert!(dot > 0.0);
            prop_assert!(angle > -std::f64::consts::PI && angle <= std::f64::consts::PI);
        }
    }
}
