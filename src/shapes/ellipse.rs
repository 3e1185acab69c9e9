//! Ellipse.
//!
//! `major_axis`/`minor_axis` are full axis lengths (diameters); semi-axes
//! (`a = major_axis/2`, `b = minor_axis/2`) are the quantities every formula
//! below actually needs.

use super::{Bounds, Polygon, Shape2D, ShapeKind};
use crate::consts::{ELLIPSE_NEWTON_MAX_ITERATIONS, EPSILON, NEWTON_COARSE_SAMPLES};
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// `(center, major_axis > 0, minor_axis > 0, rotation)` with
/// `major_axis >= minor_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
	pub center: Point2D,
	pub major_axis: f64,
	pub minor_axis: f64,
	pub rotation: f64,
}

impl Ellipse {
	pub fn new(center: Point2D, major_axis: f64, minor_axis: f64, rotation: f64) -> CadResult<Self> {
		if major_axis <= 0.0 || minor_axis <= 0.0 {
			return Err(CadError::Domain("ellipse axes must be positive".into()));
		}
		if major_axis < minor_axis - EPSILON {
			return Err(CadError::Domain("major_axis must be >= minor_axis".into()));
		}
		Ok(Self { center, major_axis, minor_axis, rotation })
	}

	fn semi_major(&self) -> f64 {
		self.major_axis * 0.5
	}

	fn semi_minor(&self) -> f64 {
		self.minor_axis * 0.5
	}

	pub fn eccentricity(&self) -> f64 {
		let (a, b) = (self.semi_major(), self.semi_minor());
		(1.0 - (b * b) / (a * a)).max(0.0).sqrt()
	}

	fn to_local(&self, p: Point2D) -> Point2D {
		(p - self.center).rotate(-self.rotation, Point2D::ZERO)
	}

	fn from_local(&self, p: Point2D) -> Point2D {
		p.rotate(self.rotation, Point2D::ZERO) + self.center
	}

	pub fn point_at_parameter(&self, t: f64) -> Point2D {
		self.from_local(Point2D::new(self.semi_major() * t.cos(), self.semi_minor() * t.sin()))
	}

	pub fn bounds(&self) -> Bounds {
		let (a, b) = (self.semi_major(), self.semi_minor());
		let (sin_r, cos_r) = self.rotation.sin_cos();
		let half_w = (a * cos_r).hypot(b * sin_r);
		let half_h = (a * sin_r).hypot(b * cos_r);
		Bounds::new(Point2D::new(self.center.x - half_w, self.center.y - half_h), Point2D::new(self.center.x + half_w, self.center.y + half_h))
	}

	/// Works in local coordinates against `(x/a)^2 + (y/b)^2 <= 1 + tol`.
	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		let local = self.to_local(point);
		let value = (local.x / self.semi_major()).powi(2) + (local.y / self.semi_minor()).powi(2);
		value <= 1.0 + tol
	}

	pub fn point_on_ellipse(&self, point: Point2D, tol: f64) -> bool {
		let local = self.to_local(point);
		let value = (local.x / self.semi_major()).powi(2) + (local.y / self.semi_minor()).powi(2);
		(value - 1.0).abs() <= tol
	}

	/// Forms the quadratic in the line parameter and retains real roots
	/// within the line's bounded `[0, 1]` interval.
	pub fn intersect_line(&self, line: &super::Line2D) -> Vec<Point2D> {
		let start = self.to_local(line.start);
		let dir = self.to_local(line.end) - self.to_local(line.start);
		let (a, b) = (self.semi_major(), self.semi_minor());
		let qa = (dir.x * dir.x) / (a * a) + (dir.y * dir.y) / (b * b);
		let qb = 2.0 * (start.x * dir.x / (a * a) + start.y * dir.y / (b * b));
		let qc = (start.x * start.x) / (a * a) + (start.y * start.y) / (b * b) - 1.0;
		if qa.abs() <= EPSILON {
			return vec![];
		}
		let discriminant = qb * qb - 4.0 * qa * qc;
		if discriminant < 0.0 {
			return vec![];
		}
		let sqrt_d = discriminant.sqrt();
		let mut out = Vec::with_capacity(2);
		for t in [(-qb + sqrt_d) / (2.0 * qa), (-qb - sqrt_d) / (2.0 * qa)] {
			if (-EPSILON..=1.0 + EPSILON).contains(&t) {
				out.push(line.start + (line.end - line.start) * t);
			}
		}
		out
	}

	/// Coarse sweep (16 samples) followed by bounded Newton (<=5 steps) on
	/// the parametric distance function.
	pub fn closest_point_to(&self, q: Point2D) -> Point2D {
		let local_q = self.to_local(q);
		let (a, b) = (self.semi_major(), self.semi_minor());
		let distance_sq_derivative = |t: f64| -> (f64, f64) {
			let (sin_t, cos_t) = t.sin_cos();
			let px = a * cos_t;
			let py = b * sin_t;
			let dpx = -a * sin_t;
			let dpy = b * cos_t;
			let ddx = -a * cos_t;
			let ddy = -b * sin_t;
			let f = (px - local_q.x) * dpx + (py - local_q.y) * dpy;
			let fp = dpx * dpx + (px - local_q.x) * ddx + dpy * dpy + (py - local_q.y) * ddy;
			(f, fp)
		};

		let mut best_t = 0.0;
		let mut best_dist = f64::INFINITY;
		for i in 0..NEWTON_COARSE_SAMPLES {
			let t = 2.0 * std::f64::consts::PI * i as f64 / NEWTON_COARSE_SAMPLES as f64;
			let p = Point2D::new(a * t.cos(), b * t.sin());
			let d = p.distance_to(local_q);
			if d < best_dist {
				best_dist = d;
				best_t = t;
			}
		}

		let mut t = best_t;
		for _ in 0..ELLIPSE_NEWTON_MAX_ITERATIONS {
			let (f, fp) = distance_sq_derivative(t);
			if fp.abs() <= EPSILON {
				break;
			}
			t -= f / fp;
		}
		self.from_local(Point2D::new(a * t.cos(), b * t.sin()))
	}

	pub fn translate(&self, offset: Point2D) -> Ellipse {
		Ellipse { center: self.center.translate(offset), ..*self }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Ellipse {
		Ellipse { center: self.center.rotate(angle, center), rotation: self.rotation + angle, ..*self }
	}

	/// An affine image of an ellipse is always an ellipse, so `scale` never
	/// needs to upgrade the shape's kind; it re-derives axes via the same
	/// parallelogram construction [`Circle::scale`] uses.
	pub fn scale(&self, factor: Point2D, scale_center: Point2D) -> Ellipse {
		let new_center = self.center.scale(factor, scale_center);
		let right = self.from_local(Point2D::new(self.semi_major(), 0.0)) - self.center;
		let top = self.from_local(Point2D::new(0.0, self.semi_minor())) - self.center;
		let scaled_right = Point2D::new(right.x * factor.x, right.y * factor.y);
		let scaled_top = Point2D::new(top.x * factor.x, top.y * factor.y);
		match super::circle::ellipse_from_parallelogram(new_center, scaled_right, scaled_top) {
			Shape2D::Ellipse(e) => e,
			_ => unreachable!("ellipse_from_parallelogram always returns an Ellipse"),
		}
	}

	pub fn transform(&self, t: &Transform2D) -> Ellipse {
		let center = t.apply(self.center);
		let right = t.apply(self.from_local(Point2D::new(self.semi_major(), 0.0))) - center;
		let top = t.apply(self.from_local(Point2D::new(0.0, self.semi_minor()))) - center;
		match super::circle::ellipse_from_parallelogram(center, right, top) {
			Shape2D::Ellipse(e) => e,
			_ => unreachable!("ellipse_from_parallelogram always returns an Ellipse"),
		}
	}

	pub fn decompose(&self, kinds: &[ShapeKind], tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Ellipse) {
			return Ok(vec![Shape2D::Ellipse(*self)]);
		}
		if kinds.contains(&ShapeKind::Polygon) {
			let n = segment_count_for_tolerance(self.semi_major(), tol);
			let points = (0..n).map(|i| self.point_at_parameter(2.0 * std::f64::consts::PI * i as f64 / n as f64)).collect();
			return Ok(vec![Shape2D::Polygon(Polygon::new(points).expect("at least 3 segments"))]);
		}
		Err(super::decomposition_error(kinds))
	}
}

fn segment_count_for_tolerance(semi_major: f64, tol: f64) -> usize {
	if tol <= 0.0 || semi_major <= EPSILON {
		return crate::consts::DEFAULT_ARC_SEGMENTS;
	}
	let ratio = (1.0 - tol / semi_major).clamp(-1.0, 1.0);
	let half_angle = ratio.acos();
	if half_angle <= EPSILON {
		return crate::consts::DEFAULT_ARC_SEGMENTS;
	}
	((std::f64::consts::PI / half_angle).ceil() as usize).clamp(8, 256)
}

impl crate::constraint::Constraints for Ellipse {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![
			crate::constraint::Constrainable::point("center", self.center),
			crate::constraint::Constrainable::scalar("major_axis", self.major_axis),
			crate::constraint::Constrainable::scalar("minor_axis", self.minor_axis),
			crate::constraint::Constrainable::scalar("rotation", self.rotation),
		]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut center = self.center;
		let mut major_axis = self.major_axis;
		let mut minor_axis = self.minor_axis;
		let mut rotation = self.rotation;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("center") {
			center = *p;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("major_axis") {
			major_axis = *v;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("minor_axis") {
			minor_axis = *v;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("rotation") {
			rotation = *v;
		}
		Ellipse::new(center, major_axis.max(minor_axis), major_axis.min(minor_axis), rotation).unwrap_or(*self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::shapes::line::Line2D;
	use pretty_assertions::assert_eq;

	#[test]
	fn intersect_line_two_points() {
		let e = Ellipse::new(Point2D::ZERO, 10.0, 6.0, 0.0).unwrap();
		let l = Line2D::new(Point2D::new(0.0, -10.0), Point2D::new(0.0, 10.0));
		let mut hits = e.intersect_line(&l);
		hits.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
		assert_eq!(hits.len(), 2);
		assert!((hits[0].y - -3.0).abs() < 1e-9);
		assert!((hits[1].y - 3.0).abs() < 1e-9);
	}

	#[test]
	fn contains_center_true_and_far_point_false() {
		let e = Ellipse::new(Point2D::ZERO, 10.0, 6.0, 0.0).unwrap();
		assert!(e.contains(Point2D::ZERO, 1e-9));
		assert!(!e.contains(Point2D::new(100.0, 100.0), 1e-9));
	}

	#[test]
	fn rejects_minor_greater_than_major() {
		assert!(Ellipse::new(Point2D::ZERO, 3.0, 5.0, 0.0).is_err());
	}

	#[test]
	fn closest_point_on_axis_is_vertex() {
		let e = Ellipse::new(Point2D::ZERO, 10.0, 6.0, 0.0).unwrap();
		let p = e.closest_point_to(Point2D::new(20.0, 0.0));
		assert!((p.x - 5.0).abs() < 1e-3);
		assert!(p.y.abs() < 1e-3);
	}
}
