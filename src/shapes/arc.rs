//! Circular arc.

use super::{Bounds, BezierPath, Shape2D, ShapeKind, circle::Circle, line::Line2D, polygon::Polygon, polyline::PolyLine2D};
use crate::consts::{ARC_TRANSFORM_SAMPLES, DEFAULT_ARC_SEGMENTS, EPSILON};
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// `(center, radius > 0, start_angle, span_angle)`. `start_angle` is
/// normalized to `[0, 2*PI)`; `span_angle` in `[-2*PI, 2*PI]` and its sign
/// encodes direction (positive = CCW).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
	pub center: Point2D,
	pub radius: f64,
	pub start_angle: f64,
	pub span_angle: f64,
}

fn normalize_angle(a: f64) -> f64 {
	let r = a % TAU;
	if r < 0.0 { r + TAU } else { r }
}

impl Arc {
	pub fn new(center: Point2D, radius: f64, start_angle: f64, span_angle: f64) -> CadResult<Self> {
		if radius <= 0.0 {
			return Err(CadError::Domain("arc radius must be positive".into()));
		}
		if span_angle.abs() > TAU + EPSILON {
			return Err(CadError::Domain("arc span_angle must be within [-2*pi, 2*pi]".into()));
		}
		Ok(Self { center, radius, start_angle: normalize_angle(start_angle), span_angle })
	}

	pub fn end_angle(&self) -> f64 {
		self.start_angle + self.span_angle
	}

	pub fn start_point(&self) -> Point2D {
		self.center + Point2D::from_polar(self.radius, self.start_angle)
	}

	pub fn end_point(&self) -> Point2D {
		self.center + Point2D::from_polar(self.radius, self.end_angle())
	}

	pub fn midpoint(&self) -> Point2D {
		self.point_at_angle(self.start_angle + self.span_angle * 0.5)
	}

	pub fn point_at_angle(&self, angle: f64) -> Point2D {
		self.center + Point2D::from_polar(self.radius, angle)
	}

	/// Normalizes `theta` to `[0, 2*PI)` and checks inclusion in the sweep,
	/// accounting for `span_angle`'s sign and the 0/2*PI wrap.
	pub fn contains_angle(&self, theta: f64) -> bool {
		let theta = normalize_angle(theta);
		if self.span_angle >= 0.0 {
			let delta = normalize_angle(theta - self.start_angle);
			delta <= self.span_angle + EPSILON
		} else {
			let delta = normalize_angle(self.start_angle - theta);
			delta <= -self.span_angle + EPSILON
		}
	}

	pub fn as_circle(&self) -> Circle {
		Circle { center: self.center, radius: self.radius }
	}

	/// Intersects the carrying circle, then filters by [`Arc::contains_angle`].
	pub fn intersect_line(&self, line: &Line2D) -> Vec<Point2D> {
		let circle = self.as_circle();
		let d = line.direction();
		let f = line.start - circle.center;
		let a = d.magnitude_squared();
		if a <= EPSILON {
			return vec![];
		}
		let b = 2.0 * f.dot(d);
		let c = f.magnitude_squared() - circle.radius * circle.radius;
		let discriminant = b * b - 4.0 * a * c;
		if discriminant < 0.0 {
			return vec![];
		}
		let sqrt_d = discriminant.sqrt();
		[(-b + sqrt_d) / (2.0 * a), (-b - sqrt_d) / (2.0 * a)]
			.into_iter()
			.filter(|&t| (-EPSILON..=1.0 + EPSILON).contains(&t))
			.map(|t| line.start + d * t)
			.filter(|&p| self.contains_angle((p - self.center).angle_radians()))
			.collect()
	}

	/// Circle-circle intersection of the carrying circles, filtered by both
	/// arcs' sweeps.
	pub fn intersect_arc(&self, other: &Arc) -> Vec<Point2D> {
		self.as_circle()
			.intersect_circle(&other.as_circle())
			.into_iter()
			.filter(|&p| self.contains_angle((p - self.center).angle_radians()) && other.contains_angle((p - other.center).angle_radians()))
			.collect()
	}

	/// Fits the unique circle through the three points via the intersection
	/// of the perpendicular bisectors of p1p2 and p2p3; the span runs from
	/// p1 to p3 through p2.
	pub fn from_three_points(p1: Point2D, p2: Point2D, p3: Point2D) -> CadResult<Arc> {
		let mid12 = (p1 + p2) * 0.5;
		let mid23 = (p2 + p3) * 0.5;
		let perp12 = (p2 - p1).perpendicular_vector();
		let perp23 = (p3 - p2).perpendicular_vector();
		let bisector1 = Line2D::new(mid12, mid12 + perp12);
		let bisector2 = Line2D::new(mid23, mid23 + perp23);

		let center = match bisector1.intersects_at(&bisector2, (false, false)) {
			Some(super::line::LineIntersection::Point(p)) => p,
			_ => return Err(CadError::DegenerateInput("the three points are collinear; no unique circle exists".into())),
		};

		let radius = center.distance_to(p1);
		let a1 = (p1 - center).angle_radians();
		let a2 = (p2 - center).angle_radians();
		let a3 = (p3 - center).angle_radians();
		let d2 = normalize_angle(a2 - a1);
		let d3 = normalize_angle(a3 - a1);
		let span = if d2 <= d3 { d3 } else { d3 - TAU };
		Arc::new(center, radius, a1, span)
	}

	/// A half-circle through `start` and a perimeter point, opening on the
	/// side of `perimeter_point`.
	pub fn from_line_and_perimeter_point(start: Point2D, end: Point2D, perimeter_point: Point2D) -> CadResult<Arc> {
		Arc::from_three_points(start, perimeter_point, end)
	}

	pub fn semicircle(center: Point2D, radius: f64, start_angle: f64) -> CadResult<Arc> {
		Arc::new(center, radius, start_angle, PI)
	}

	pub fn quarter_circle(center: Point2D, radius: f64, start_angle: f64) -> CadResult<Arc> {
		Arc::new(center, radius, start_angle, PI * 0.5)
	}

	/// Builds the arc tangent to both rays at their shared vertex, with the
	/// given radius.
	pub fn from_tangent_rays(vertex: Point2D, ray1_dir: Point2D, ray2_dir: Point2D, radius: f64) -> CadResult<Arc> {
		let u1 = ray1_dir.unit_vector();
		let u2 = ray2_dir.unit_vector();
		let bisector = (u1 + u2).unit_vector();
		if bisector == Point2D::ZERO {
			return Err(CadError::DegenerateInput("rays are opposite; no tangent arc bisector exists".into()));
		}
		let half_angle = (u1.dot(u2).clamp(-1.0, 1.0).acos()) * 0.5;
		if half_angle.abs() <= EPSILON {
			return Err(CadError::DegenerateInput("rays are collinear; no tangent arc exists".into()));
		}
		let dist_to_center = radius / half_angle.sin();
		let center = vertex + bisector * dist_to_center;
		let a1 = (vertex + u1 * (dist_to_center * half_angle.cos()) - center).angle_radians();
		let a2 = (vertex + u2 * (dist_to_center * half_angle.cos()) - center).angle_radians();
		let d = normalize_angle(a2 - a1);
		let span = if d <= PI { d } else { d - TAU };
		Arc::new(center, radius, a1, span)
	}

	pub fn reverse(&self) -> Arc {
		Arc { center: self.center, radius: self.radius, start_angle: normalize_angle(self.end_angle()), span_angle: -self.span_angle }
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::from_points(&self.sample_points(DEFAULT_ARC_SEGMENTS)).expect("an arc always samples at least one point")
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		let d = self.center.distance_to(point);
		if (d - self.radius).abs() > tol {
			return false;
		}
		self.contains_angle((point - self.center).angle_radians())
	}

	pub fn translate(&self, offset: Point2D) -> Arc {
		Arc { center: self.center.translate(offset), ..*self }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Arc {
		Arc { center: self.center.rotate(angle, center), start_angle: normalize_angle(self.start_angle + angle), ..*self }
	}

	/// Non-uniform scale upgrades the arc into a sampled [`BezierPath`].
	pub fn scale(&self, factor: Point2D, center: Point2D) -> Shape2D {
		if (factor.x - factor.y).abs() <= EPSILON {
			return Shape2D::Arc(Arc { center: self.center.scale(factor, center), radius: self.radius * factor.x.abs(), ..*self });
		}
		self.sampled_bezier(|p| p.scale(factor, center))
	}

	/// Arbitrary transform always upgrades to a sampled [`BezierPath`].
	pub fn transform(&self, t: &Transform2D) -> Shape2D {
		self.sampled_bezier(|p| t.apply(p))
	}

	fn sampled_bezier(&self, f: impl Fn(Point2D) -> Point2D) -> Shape2D {
		let points: Vec<Point2D> = self.sample_points(ARC_TRANSFORM_SAMPLES).into_iter().map(f).collect();
		let pl = PolyLine2D::new(points).expect("arc samples always yield >= 2 points");
		Shape2D::Bezier(BezierPath::from_polyline(&pl, 1.0 / 3.0).expect("polyline from arc samples always fits a bezier path"))
	}

	pub fn decompose(&self, kinds: &[ShapeKind], tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Arc) {
			return Ok(vec![Shape2D::Arc(*self)]);
		}
		if kinds.contains(&ShapeKind::PolyLine) {
			return Ok(vec![Shape2D::PolyLine(self.to_polyline(segment_count_for_tolerance(self.radius, tol)))]);
		}
		if kinds.contains(&ShapeKind::Bezier) {
			return Ok(vec![self.sampled_bezier(|p| p)]);
		}
		Err(super::decomposition_error(kinds))
	}

	pub fn to_polyline(&self, segments: usize) -> PolyLine2D {
		PolyLine2D::new(self.sample_points(segments.max(2))).expect("at least 2 samples")
	}

	pub fn to_polygon(&self) -> CadResult<Polygon> {
		Polygon::new(self.sample_points(DEFAULT_ARC_SEGMENTS))
	}

	fn sample_points(&self, segments: usize) -> Vec<Point2D> {
		let n = segments.max(1);
		(0..=n).map(|i| self.point_at_angle(self.start_angle + self.span_angle * i as f64 / n as f64)).collect()
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
	((PI / half_angle).ceil() as usize).clamp(4, 256)
}

impl crate::constraint::Constraints for Arc {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![
			crate::constraint::Constrainable::point("center", self.center),
			crate::constraint::Constrainable::scalar("radius", self.radius),
			crate::constraint::Constrainable::scalar("start_angle", self.start_angle),
			crate::constraint::Constrainable::scalar("span_angle", self.span_angle),
		]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut center = self.center;
		let mut radius = self.radius;
		let mut start_angle = self.start_angle;
		let mut span_angle = self.span_angle;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("center") {
			center = *p;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("radius") {
			radius = *v;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("start_angle") {
			start_angle = *v;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("span_angle") {
			span_angle = *v;
		}
		Arc::new(center, radius, start_angle, span_angle).unwrap_or(*self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn from_three_points_semicircle() {
		let arc = Arc::from_three_points(Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0), Point2D::new(-1.0, 0.0)).unwrap();
		assert!(arc.center.distance_to(Point2D::ZERO) < 1e-9);
		assert!((arc.radius - 1.0).abs() < 1e-9);
		assert!((arc.span_angle - PI).abs() < 1e-9);
	}

	#[test]
	fn contains_angle_respects_span_sign() {
		let arc = Arc::new(Point2D::ZERO, 1.0, 0.0, PI * 0.5).unwrap();
		assert!(arc.contains_angle(PI * 0.25));
		assert!(!arc.contains_angle(PI));

		let reversed = Arc::new(Point2D::ZERO, 1.0, 0.0, -PI * 0.5).unwrap();
		assert!(reversed.contains_angle(-PI * 0.25));
		assert!(!reversed.contains_angle(PI * 0.25 + 0.01));
	}

	#[test]
	fn non_uniform_scale_upgrades_to_bezier() {
		let arc = Arc::new(Point2D::ZERO, 5.0, 0.0, PI * 0.5).unwrap();
		assert!(matches!(arc.scale(Point2D::new(2.0, 1.0), Point2D::ZERO), Shape2D::Bezier(_)));
	}

	#[test]
	fn uniform_scale_stays_arc() {
		let arc = Arc::new(Point2D::ZERO, 5.0, 0.0, PI * 0.5).unwrap();
		assert!(matches!(arc.scale(Point2D::new(2.0, 2.0), Point2D::ZERO), Shape2D::Arc(_)));
	}

	#[test]
	fn reverse_swaps_endpoints() {
		let arc = Arc::new(Point2D::ZERO, 1.0, 0.0, PI * 0.5).unwrap();
		let reversed = arc.reverse();
		assert_eq!(reversed.start_point(), arc.end_point());
	}
}
