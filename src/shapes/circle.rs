//! Circle.

use super::{Bounds, Ellipse, Polygon, Shape2D, ShapeKind};
use crate::consts::{DEFAULT_ARC_SEGMENTS, EPSILON};
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// `(center, radius >= 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
	pub center: Point2D,
	pub radius: f64,
}

impl Circle {
	pub fn new(center: Point2D, radius: f64) -> CadResult<Self> {
		if radius < 0.0 {
			return Err(CadError::Domain("circle radius must be non-negative".into()));
		}
		Ok(Self { center, radius })
	}

	pub fn circumference(&self) -> f64 {
		2.0 * std::f64::consts::PI * self.radius
	}

	pub fn area(&self) -> f64 {
		std::f64::consts::PI * self.radius * self.radius
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::new(Point2D::new(self.center.x - self.radius, self.center.y - self.radius), Point2D::new(self.center.x + self.radius, self.center.y + self.radius))
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		self.center.distance_to(point) <= self.radius + tol
	}

	pub fn point_at_angle(&self, angle_radians: f64) -> Point2D {
		self.center + Point2D::from_polar(self.radius, angle_radians)
	}

	/// Standard radical-line construction: disjoint, tangent (one point), or
	/// two points, selected on the distance between centers vs `|r1 ± r2|`.
	pub fn intersect_circle(&self, other: &Circle) -> Vec<Point2D> {
		let d = self.center.distance_to(other.center);
		if d <= EPSILON && (self.radius - other.radius).abs() <= EPSILON {
			return vec![];
		}
		if d > self.radius + other.radius + EPSILON || d < (self.radius - other.radius).abs() - EPSILON {
			return vec![];
		}
		let a = (self.radius * self.radius - other.radius * other.radius + d * d) / (2.0 * d);
		let h_sq = (self.radius * self.radius - a * a).max(0.0);
		let h = h_sq.sqrt();
		let dir = (other.center - self.center) / d;
		let mid = self.center + dir * a;
		if h <= EPSILON {
			return vec![mid];
		}
		let perp = dir.perpendicular_vector();
		vec![mid + perp * h, mid - perp * h]
	}

	/// 0/1/2 tangent points from an external (or on-circle, or internal) point.
	pub fn tangent_points_from_point(&self, p: Point2D) -> Vec<Point2D> {
		let d = self.center.distance_to(p);
		if d < self.radius - EPSILON {
			return vec![];
		}
		if (d - self.radius).abs() <= EPSILON {
			return vec![p];
		}
		let to_p = (p - self.center) / d;
		let angle = (self.radius / d).clamp(-1.0, 1.0).acos();
		let base_angle = to_p.angle_radians();
		vec![self.point_at_angle(base_angle + angle), self.point_at_angle(base_angle - angle)]
	}

	pub fn translate(&self, offset: Point2D) -> Circle {
		Circle { center: self.center.translate(offset), radius: self.radius }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Circle {
		Circle { center: self.center.rotate(angle, center), radius: self.radius }
	}

	/// Non-uniform scaling of a circle yields an ellipse via the
	/// three-corner-of-parallelogram construction: map the circle's
	/// rightmost and topmost points and the center, and read the resulting
	/// ellipse's axes off the transformed square.
	pub fn scale(&self, factor: Point2D, scale_center: Point2D) -> Shape2D {
		if (factor.x - factor.y).abs() <= EPSILON {
			return Shape2D::Circle(Circle { center: self.center.scale(factor, scale_center), radius: self.radius * factor.x.abs() });
		}
		let new_center = self.center.scale(factor, scale_center);
		let major = 2.0 * self.radius * factor.x.abs();
		let minor = 2.0 * self.radius * factor.y.abs();
		let (major, minor, rotation) = if major >= minor { (major, minor, 0.0) } else { (minor, major, std::f64::consts::FRAC_PI_2) };
		Shape2D::Ellipse(Ellipse::new(new_center, major, minor, rotation).expect("positive axes by construction"))
	}

	/// Arbitrary transform maps three corners of the inscribing square and
	/// reconstructs the image ellipse from the resulting parallelogram.
	pub fn transform(&self, t: &Transform2D) -> Shape2D {
		let center = t.apply(self.center);
		let right = t.apply(self.center + Point2D::new(self.radius, 0.0)) - center;
		let top = t.apply(self.center + Point2D::new(0.0, self.radius)) - center;
		ellipse_from_parallelogram(center, right, top)
	}

	pub fn decompose(&self, kinds: &[ShapeKind], tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Circle) {
			return Ok(vec![Shape2D::Circle(*self)]);
		}
		if kinds.contains(&ShapeKind::Polygon) {
			return Ok(vec![Shape2D::Polygon(self.to_polygon(segment_count_for_tolerance(self.radius, tol)))]);
		}
		if kinds.contains(&ShapeKind::Arc) {
			return Ok(vec![Shape2D::Arc(super::Arc::new(self.center, self.radius, 0.0, 2.0 * std::f64::consts::PI)?)]);
		}
		Err(super::decomposition_error(kinds))
	}

	pub fn to_polygon(&self, segments: usize) -> Polygon {
		let n = segments.max(3);
		let points = (0..n).map(|i| self.point_at_angle(2.0 * std::f64::consts::PI * i as f64 / n as f64)).collect();
		Polygon::new(points).expect("at least 3 segments")
	}
}

fn segment_count_for_tolerance(radius: f64, tol: f64) -> usize {
	if tol <= 0.0 || radius <= EPSILON {
		return DEFAULT_ARC_SEGMENTS;
	}
	let ratio = (1.0 - tol / radius).clamp(-1.0, 1.0);
	let half_angle = ratio.acos();
	if half_angle <= EPSILON {
		return DEFAULT_ARC_SEGMENTS;
	}
	let n = (std::f64::consts::PI / half_angle).ceil() as usize;
	n.clamp(8, 256)
}

pub(crate) fn ellipse_from_parallelogram(center: Point2D, right: Point2D, top: Point2D) -> Shape2D {
	// `right`/`top` are the images of two orthogonal radii; fit the unique
	// ellipse whose axes match the resulting parallelogram via the singular
	// value decomposition of the 2x2 map, computed directly for 2x2.
	let m00 = right.x;
	let m10 = right.y;
	let m01 = top.x;
	let m11 = top.y;
	let e = (m00 + m11) * 0.5;
	let f = (m00 - m11) * 0.5;
	let g = (m10 + m01) * 0.5;
	let h = (m10 - m01) * 0.5;
	let q = (e * e + h * h).sqrt();
	let r = (f * f + g * g).sqrt();
	let sx = q + r;
	let sy = (q - r).abs();
	let a1 = g.atan2(f);
	let a2 = h.atan2(e);
	let theta = (a2 - a1) * 0.5;
	let (semi_major, semi_minor, rotation) = if sx >= sy { (sx, sy, theta) } else { (sy, sx, theta + std::f64::consts::FRAC_PI_2) };
	// `sx`/`sy` are semi-axis lengths (since `right`/`top` are radius
	// vectors); `Ellipse` stores full axis lengths.
	let major = (2.0 * semi_major).max(EPSILON);
	let minor = (2.0 * semi_minor).max(EPSILON);
	Shape2D::Ellipse(Ellipse::new(center, major, minor, rotation).unwrap_or(Ellipse::new(center, major.max(minor), major.max(minor), 0.0).expect("non-degenerate fallback")))
}

impl crate::constraint::Constraints for Circle {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![crate::constraint::Constrainable::point("center", self.center), crate::constraint::Constrainable::scalar("radius", self.radius)]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut out = *self;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("center") {
			out.center = *p;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(r)) = bag.get("radius") {
			out.radius = *r;
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn intersect_circle_two_points() {
		let a = Circle::new(Point2D::new(0.0, 0.0), 5.0).unwrap();
		let b = Circle::new(Point2D::new(8.0, 0.0), 5.0).unwrap();
		let mut pts = a.intersect_circle(&b);
		pts.sort_by(|p, q| p.y.partial_cmp(&q.y).unwrap());
		assert_eq!(pts.len(), 2);
		assert!((pts[0].x - 4.0).abs() < 1e-9);
		assert!((pts[0].y - -3.0).abs() < 1e-9);
		assert!((pts[1].y - 3.0).abs() < 1e-9);
	}

	#[test]
	fn tangent_points_outside_point_returns_two() {
		let c = Circle::new(Point2D::ZERO, 5.0).unwrap();
		let tangents = c.tangent_points_from_point(Point2D::new(13.0, 0.0));
		assert_eq!(tangents.len(), 2);
		for t in tangents {
			assert!((t.distance_to(Point2D::ZERO) - 5.0).abs() < 1e-6);
			assert!((t - Point2D::new(13.0, 0.0)).dot(t - Point2D::ZERO).abs() < 1e-6);
		}
	}

	#[test]
	fn tangent_points_inside_point_returns_none() {
		let c = Circle::new(Point2D::ZERO, 5.0).unwrap();
		assert!(c.tangent_points_from_point(Point2D::new(1.0, 0.0)).is_empty());
	}

	#[test]
	fn uniform_scale_stays_circle() {
		let c = Circle::new(Point2D::ZERO, 5.0).unwrap();
		assert!(matches!(c.scale(Point2D::new(2.0, 2.0), Point2D::ZERO), Shape2D::Circle(_)));
	}

	#[test]
	fn non_uniform_scale_upgrades_to_ellipse() {
		let c = Circle::new(Point2D::ZERO, 5.0).unwrap();
		match c.scale(Point2D::new(2.0, 1.0), Point2D::ZERO) {
			Shape2D::Ellipse(e) => {
				assert!((e.major_axis - 20.0).abs() < 1e-9);
				assert!((e.minor_axis - 10.0).abs() < 1e-9);
			}
			other => panic!("expected Ellipse, got {other:?}"),
		}
	}
}
