//! Line segment.

use super::{Bounds, Shape2D, ShapeKind, polyline::PolyLine2D};
use crate::consts::EPSILON;
use crate::error::CadResult;
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// An ordered line segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line2D {
	pub start: Point2D,
	pub end: Point2D,
}

/// Result of [`Line2D::intersects_at`] between two segments/lines.
#[derive(Debug, Clone, PartialEq)]
pub enum LineIntersection {
	/// A single intersection point.
	Point(Point2D),
	/// The lines are collinear; the overlap interval is given in the first
	/// line's parameter space `[t_min, t_max]` (may be empty/non-overlapping
	/// if `t_min > t_max`).
	Collinear { t_min: f64, t_max: f64 },
}

impl Line2D {
	pub fn new(start: Point2D, end: Point2D) -> Self {
		Self { start, end }
	}

	pub fn direction(&self) -> Point2D {
		self.end - self.start
	}

	pub fn length(&self) -> f64 {
		self.direction().magnitude()
	}

	pub fn midpoint(&self) -> Point2D {
		(self.start + self.end) * 0.5
	}

	pub fn angle_radians(&self) -> f64 {
		self.direction().angle_radians()
	}

	pub fn unit_direction(&self) -> Point2D {
		self.direction().unit_vector()
	}

	pub fn perpendicular_direction(&self) -> Point2D {
		self.unit_direction().perpendicular_vector()
	}

	pub fn is_parallel_to(&self, other: &Line2D) -> bool {
		self.direction().cross(other.direction()).abs() <= EPSILON
	}

	pub fn is_perpendicular_to(&self, other: &Line2D) -> bool {
		self.direction().dot(other.direction()).abs() <= EPSILON
	}

	/// Intersect this line with `other`. `bounded = (bound_self, bound_other)`
	/// clips each line's parameter to `[0, 1]`; if clipping rules out the
	/// intersection, returns `None`.
	pub fn intersects_at(&self, other: &Line2D, bounded: (bool, bool)) -> Option<LineIntersection> {
		let u = self.direction();
		let v = other.direction();
		let w = self.start - other.start;
		let denom = u.cross(v);

		if denom.abs() <= EPSILON {
			// Parallel. Collinear iff w is also parallel to v (or either segment is degenerate).
			if w.cross(v).abs() > EPSILON {
				return None;
			}
			// Project other's endpoints into this line's parameter space.
			let len_sq = u.magnitude_squared();
			if len_sq <= EPSILON {
				return None;
			}
			let t0 = (other.start - self.start).dot(u) / len_sq;
			let t1 = (other.end - self.start).dot(u) / len_sq;
			let (mut t_min, mut t_max) = (t0.min(t1), t0.max(t1));
			if bounded.0 {
				t_min = t_min.max(0.0);
				t_max = t_max.min(1.0);
			}
			if bounded.1 {
				// `other`'s own [0,1] always maps to [t0,t1]; nothing further to clip.
			}
			return Some(LineIntersection::Collinear { t_min, t_max });
		}

		// self.start + t*u == other.start + s*v, with w = self.start - other.start
		let t = -w.cross(v) / denom;
		let s = -w.cross(u) / denom;

		if bounded.0 && !(-EPSILON..=1.0 + EPSILON).contains(&t) {
			return None;
		}
		if bounded.1 && !(-EPSILON..=1.0 + EPSILON).contains(&s) {
			return None;
		}
		Some(LineIntersection::Point(self.start + u * t))
	}

	/// Closest point on the (bounded) segment to `p`.
	pub fn closest_point_to(&self, p: Point2D) -> Point2D {
		let u = self.direction();
		let len_sq = u.magnitude_squared();
		if len_sq <= EPSILON {
			return self.start;
		}
		let t = ((p - self.start).dot(u) / len_sq).clamp(0.0, 1.0);
		self.start + u * t
	}

	pub fn distance_to_point(&self, p: Point2D) -> f64 {
		self.closest_point_to(p).distance_to(p)
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::from_points(&[self.start, self.end]).expect("a line always has two points")
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		self.distance_to_point(point) <= tol
	}

	pub fn translate(&self, offset: Point2D) -> Line2D {
		Line2D::new(self.start.translate(offset), self.end.translate(offset))
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Line2D {
		Line2D::new(self.start.rotate(angle, center), self.end.rotate(angle, center))
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> Line2D {
		Line2D::new(self.start.scale(factor, center), self.end.scale(factor, center))
	}

	pub fn transform(&self, t: &Transform2D) -> Line2D {
		Line2D::new(t.apply(self.start), t.apply(self.end))
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Line) {
			return Ok(vec![Shape2D::Line(*self)]);
		}
		if kinds.contains(&ShapeKind::PolyLine) {
			return Ok(vec![Shape2D::PolyLine(PolyLine2D::new(vec![self.start, self.end]).unwrap())]);
		}
		if kinds.contains(&ShapeKind::Bezier) {
			return Ok(vec![Shape2D::Bezier(super::BezierPath::from_line(*self))]);
		}
		Err(super::decomposition_error(kinds))
	}
}

impl crate::constraint::Constraints for Line2D {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![crate::constraint::Constrainable::point("start", self.start), crate::constraint::Constrainable::point("end", self.end)]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut out = *self;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("start") {
			out.start = *p;
		}
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("end") {
			out.end = *p;
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn perpendicular_lines_cross_at_origin() {
		let a = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
		let b = Line2D::new(Point2D::new(5.0, -5.0), Point2D::new(5.0, 5.0));
		let hit = a.intersects_at(&b, (true, true));
		assert_eq!(hit, Some(LineIntersection::Point(Point2D::new(5.0, 0.0))));
	}

	#[test]
	fn parallel_non_collinear_lines_have_no_intersection() {
		let a = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
		let b = Line2D::new(Point2D::new(0.0, 1.0), Point2D::new(1.0, 1.0));
		assert_eq!(a.intersects_at(&b, (false, false)), None);
	}

	#[test]
	fn collinear_overlap_reports_interval() {
		let a = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
		let b = Line2D::new(Point2D::new(5.0, 0.0), Point2D::new(15.0, 0.0));
		match a.intersects_at(&b, (false, false)) {
			Some(LineIntersection::Collinear { t_min, t_max }) => {
				assert!((t_min - 0.5).abs() < 1e-9);
				assert!((t_max - 1.5).abs() < 1e-9);
			}
			other => panic!("expected collinear overlap, got {other:?}"),
		}
	}

	#[test]
	fn closest_point_clamps_to_segment() {
		let l = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
		assert_eq!(l.closest_point_to(Point2D::new(-5.0, 3.0)), Point2D::new(0.0, 0.0));
		assert_eq!(l.closest_point_to(Point2D::new(15.0, 3.0)), Point2D::new(10.0, 0.0));
	}

	#[test]
	fn bounded_intersection_outside_unit_interval_is_none() {
		let a = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
		let b = Line2D::new(Point2D::new(5.0, -1.0), Point2D::new(5.0, 1.0));
		assert_eq!(a.intersects_at(&b, (true, true)), None);
	}
}
