//! 2D point/vector primitive.
//!
//! `Point2D` is used interchangeably as a position and as a direction
//! vector, constructed through named constructors (`new`, `from_polar`)
//! rather than overloaded dispatch on argument shape.

use crate::consts::EPSILON;
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2D vector of finite 64-bit floats, used for both positions and
/// directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point2D {
	pub x: f64,
	pub y: f64,
}

impl Point2D {
	pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

	/// Construct from Cartesian coordinates.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Construct from polar coordinates: `magnitude` at `angle_radians` from
	/// the +x axis, measured counter-clockwise.
	pub fn from_polar(magnitude: f64, angle_radians: f64) -> Self {
		Self {
			x: magnitude * angle_radians.cos(),
			y: magnitude * angle_radians.sin(),
		}
	}

	/// Parse the canonical `"x,y"` fingerprint produced by [`Point2D::to_string`].
	pub fn from_string(s: &str) -> CadResult<Self> {
		let mut parts = s.trim().split(',');
		let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
			return Err(CadError::Domain(format!("point string must have exactly 2 coordinates: {s:?}")));
		};
		let x: f64 = x.parse().map_err(|_| CadError::Domain(format!("invalid x value in {s:?}")))?;
		let y: f64 = y.parse().map_err(|_| CadError::Domain(format!("invalid y value in {s:?}")))?;
		Ok(Self { x, y })
	}

	/// Canonical fingerprint, the inverse of [`Point2D::from_string`].
	pub fn to_string_fingerprint(&self) -> String {
		format!("{},{}", self.x, self.y)
	}

	pub fn magnitude(&self) -> f64 {
		self.magnitude_squared().sqrt()
	}

	pub fn magnitude_squared(&self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	/// Unit vector in this direction; the zero vector maps to zero (no fault).
	pub fn unit_vector(&self) -> Point2D {
		let mag = self.magnitude();
		if mag < EPSILON { Point2D::ZERO } else { Point2D::new(self.x / mag, self.y / mag) }
	}

	/// The vector rotated 90 degrees counter-clockwise.
	pub fn perpendicular_vector(&self) -> Point2D {
		Point2D::new(-self.y, self.x)
	}

	pub fn angle_radians(&self) -> f64 {
		self.y.atan2(self.x)
	}

	pub fn angle_degrees(&self) -> f64 {
		self.angle_radians().to_degrees()
	}

	pub fn dot(&self, other: Point2D) -> f64 {
		self.x * other.x + self.y * other.y
	}

	/// Scalar cross product (the z-component of the 3D cross product).
	pub fn cross(&self, other: Point2D) -> f64 {
		self.x * other.y - self.y * other.x
	}

	/// Angle between this vector and `other`, clamped to `[0, pi]`. Returns 0
	/// if either vector is (numerically) zero.
	pub fn angle_between_vectors(&self, other: Point2D) -> f64 {
		let (mag1, mag2) = (self.magnitude(), other.magnitude());
		if mag1 < EPSILON || mag2 < EPSILON {
			return 0.0;
		}
		let cos_angle = (self.dot(other) / (mag1 * mag2)).clamp(-1.0, 1.0);
		cos_angle.acos()
	}

	/// Component-wise division; fails with a domain error if either
	/// component of `other` is (numerically) zero.
	pub fn checked_div(&self, other: Point2D) -> CadResult<Point2D> {
		if other.x.abs() < EPSILON || other.y.abs() < EPSILON {
			return Err(CadError::Domain("division by zero component".into()));
		}
		Ok(Point2D::new(self.x / other.x, self.y / other.y))
	}

	/// Component-wise division by a scalar; fails if the scalar is
	/// (numerically) zero.
	pub fn checked_div_scalar(&self, scalar: f64) -> CadResult<Point2D> {
		if scalar.abs() < EPSILON {
			return Err(CadError::Domain("division by zero scalar".into()));
		}
		Ok(Point2D::new(self.x / scalar, self.y / scalar))
	}

	pub fn translate(&self, offset: Point2D) -> Point2D {
		*self + offset
	}

	pub fn rotate(&self, angle_radians: f64, center: Point2D) -> Point2D {
		let translated = *self - center;
		let (sin_a, cos_a) = angle_radians.sin_cos();
		let rotated = Point2D::new(translated.x * cos_a - translated.y * sin_a, translated.x * sin_a + translated.y * cos_a);
		rotated + center
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> Point2D {
		let translated = *self - center;
		Point2D::new(translated.x * factor.x, translated.y * factor.y) + center
	}

	pub fn scale_uniform(&self, factor: f64, center: Point2D) -> Point2D {
		self.scale(Point2D::new(factor, factor), center)
	}

	pub fn transform(&self, transform: &Transform2D) -> Point2D {
		transform.apply(*self)
	}

	/// True iff the signed triangle area for every triple drawn from
	/// `{self} ∪ points` is at most `tol`.
	pub fn is_collinear_to(&self, points: &[Point2D], tol: f64) -> bool {
		let mut all = Vec::with_capacity(points.len() + 1);
		all.extend_from_slice(points);
		all.push(*self);
		if all.len() < 3 {
			return true;
		}
		let p1 = all[0];
		let Some(&p2) = all[1..].iter().find(|&&p| (p - p1).magnitude() > EPSILON) else {
			return true;
		};
		all.iter().all(|&p| {
			if (p - p1).magnitude() <= EPSILON || (p - p2).magnitude() <= EPSILON {
				return true;
			}
			let area = ((p2.x - p1.x) * (p.y - p1.y) - (p.x - p1.x) * (p2.y - p1.y)).abs();
			area <= tol
		})
	}

	pub fn distance_to(&self, other: Point2D) -> f64 {
		(*self - other).magnitude()
	}
}

impl fmt::Display for Point2D {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Point2D({}, {})", self.x, self.y)
	}
}

impl PartialEq for Point2D {
	fn eq(&self, other: &Self) -> bool {
		(self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
	}
}

impl Add for Point2D {
	type Output = Point2D;
	fn add(self, rhs: Point2D) -> Point2D {
		Point2D::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point2D {
	type Output = Point2D;
	fn sub(self, rhs: Point2D) -> Point2D {
		Point2D::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Neg for Point2D {
	type Output = Point2D;
	fn neg(self) -> Point2D {
		Point2D::new(-self.x, -self.y)
	}
}

impl Mul<f64> for Point2D {
	type Output = Point2D;
	fn mul(self, rhs: f64) -> Point2D {
		Point2D::new(self.x * rhs, self.y * rhs)
	}
}

impl Mul<Point2D> for Point2D {
	type Output = Point2D;
	fn mul(self, rhs: Point2D) -> Point2D {
		Point2D::new(self.x * rhs.x, self.y * rhs.y)
	}
}

impl Div<f64> for Point2D {
	type Output = Point2D;
	fn div(self, rhs: f64) -> Point2D {
		Point2D::new(self.x / rhs, self.y / rhs)
	}
}

impl From<glam::DVec2> for Point2D {
	fn from(v: glam::DVec2) -> Self {
		Point2D::new(v.x, v.y)
	}
}

impl From<Point2D> for glam::DVec2 {
	fn from(p: Point2D) -> Self {
		glam::DVec2::new(p.x, p.y)
	}
}

impl crate::constraint::Constraints for Point2D {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![crate::constraint::Constrainable::point("point", *self)]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		match bag.get("point") {
			Some(crate::constraint::ConstrainableValue::Point(p)) => *p,
			_ => *self,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn round_trip_string() {
		let p = Point2D::new(3.5, -2.25);
		assert_eq!(Point2D::from_string(&p.to_string_fingerprint()).unwrap(), p);
	}

	#[test]
	fn polar_construction() {
		let p = Point2D::from_polar(2.0, std::f64::consts::FRAC_PI_2);
		assert!((p.x).abs() < 1e-9);
		assert!((p.y - 2.0).abs() < 1e-9);
	}

	#[test]
	fn zero_vector_unit_is_zero() {
		assert_eq!(Point2D::ZERO.unit_vector(), Point2D::ZERO);
	}

	#[test]
	fn perpendicular_is_ccw_90() {
		let p = Point2D::new(1.0, 0.0);
		assert_eq!(p.perpendicular_vector(), Point2D::new(0.0, 1.0));
	}

	#[test]
	fn checked_div_rejects_zero_component() {
		assert!(Point2D::new(1.0, 1.0).checked_div(Point2D::new(1.0, 0.0)).is_err());
	}

	#[test]
	fn collinear_triple() {
		let a = Point2D::new(0.0, 0.0);
		let b = Point2D::new(1.0, 1.0);
		let c = Point2D::new(2.0, 2.0);
		assert!(a.is_collinear_to(&[b, c], 1e-9));
		assert!(!a.is_collinear_to(&[b, Point2D::new(2.0, 3.0)], 1e-9));
	}

	#[test]
	fn translate_rotate_round_trip() {
		let p = Point2D::new(3.0, 4.0);
		let v = Point2D::new(1.0, -2.0);
		assert_eq!(p.translate(v).translate(-v), p);
	}
}
