//! Shared geometric primitives in viewport-pixel and content coordinates.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub const fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Rotates by `degrees`; positive angles turn clockwise on a y-down screen.
    pub fn rotated(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub const fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Self;

    fn add(self, rhs: Vector) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector> for Point {
    type Output = Self;

    fn sub(self, rhs: Vector) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_difference_and_offset_round_trip() {
        let a = Point::new(10.0, -4.0);
        let b = Point::new(3.0, 2.0);
        let delta = a - b;
        assert_eq!(delta, Vector::new(7.0, -6.0));
        assert_eq!(b + delta, a);
        assert_eq!(a - delta, b);
    }

    #[test]
    fn vector_rotation_quarter_turn_is_clockwise_on_screen() {
        let rotated = Vector::new(1.0, 0.0).rotated(90.0);
        assert!(rotated.x.abs() < 1e-12);
        assert!((rotated.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn size_usable_requires_positive_finite_dimensions() {
        assert!(Size::new(800.0, 600.0).is_usable());
        assert!(!Size::new(0.0, 600.0).is_usable());
        assert!(!Size::new(800.0, -1.0).is_usable());
        assert!(!Size::new(f64::NAN, 600.0).is_usable());
        assert!(!Size::new(f64::INFINITY, 600.0).is_usable());
    }

    #[test]
    fn size_center_is_half_extent() {
        assert_eq!(Size::new(800.0, 600.0).center(), Point::new(400.0, 300.0));
    }
}
