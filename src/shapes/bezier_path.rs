//! Composite cubic Bezier path.

use super::{Bounds, Polygon, Shape2D, ShapeKind, line::Line2D, polyline::PolyLine2D};
use crate::consts::{EPSILON, NEWTON_COARSE_SAMPLES, NEWTON_MAX_ITERATIONS};
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// Control points interpreted in cubic groups of 3+1 (`len % 3 == 1`); the
/// tail is padded with copies of the final point if the caller supplies a
/// list that doesn't already satisfy the invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
	control_points: Vec<Point2D>,
}

/// The magic constant for a 4-arc circle approximation.
const CIRCLE_KAPPA: f64 = 0.5522847498307936;

impl BezierPath {
	pub fn new(mut control_points: Vec<Point2D>) -> CadResult<Self> {
		if control_points.len() < 4 {
			return Err(CadError::Domain("a bezier path needs at least 4 control points".into()));
		}
		let remainder = (control_points.len() - 1) % 3;
		if remainder != 0 {
			let last = *control_points.last().unwrap();
			for _ in 0..(3 - remainder) {
				control_points.push(last);
			}
		}
		Ok(Self { control_points })
	}

	pub fn control_points(&self) -> &[Point2D] {
		&self.control_points
	}

	pub fn segment_count(&self) -> usize {
		(self.control_points.len() - 1) / 3
	}

	/// The 4 control points `(p0, c1, c2, p3)` of segment `index`.
	pub fn segment(&self, index: usize) -> [Point2D; 4] {
		let base = index * 3;
		[self.control_points[base], self.control_points[base + 1], self.control_points[base + 2], self.control_points[base + 3]]
	}

	pub fn is_closed(&self) -> bool {
		self.control_points.first().zip(self.control_points.last()).map(|(a, b)| *a == *b).unwrap_or(false)
	}

	/// `segment_index = floor(t*N)`, `u = t*N - segment_index`, clamped at
	/// the boundaries.
	fn locate(&self, t: f64) -> (usize, f64) {
		let n = self.segment_count();
		let t = t.clamp(0.0, 1.0);
		if t >= 1.0 {
			return (n - 1, 1.0);
		}
		let scaled = t * n as f64;
		let index = (scaled.floor() as usize).min(n - 1);
		(index, scaled - index as f64)
	}

	pub fn point_at_parameter(&self, t: f64) -> Point2D {
		let (index, u) = self.locate(t);
		cubic_bezier_point(&self.segment(index), u)
	}

	pub fn tangent_at_parameter(&self, t: f64) -> Point2D {
		let (index, u) = self.locate(t);
		cubic_bezier_tangent(&self.segment(index), u)
	}

	pub fn bounds(&self) -> Bounds {
		let sampled = self.to_polyline(8, 0.0);
		sampled.bounds()
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		if self.is_closed() {
			if let Ok(polygon) = self.to_polygon(16, 0.0) {
				return polygon.contains(point, tol);
			}
		}
		self.closest_point_to(point).distance_to(point) <= tol
	}

	pub fn translate(&self, offset: Point2D) -> BezierPath {
		BezierPath { control_points: self.control_points.iter().map(|p| p.translate(offset)).collect() }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> BezierPath {
		BezierPath { control_points: self.control_points.iter().map(|p| p.rotate(angle, center)).collect() }
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> BezierPath {
		BezierPath { control_points: self.control_points.iter().map(|p| p.scale(factor, center)).collect() }
	}

	pub fn transform(&self, t: &Transform2D) -> BezierPath {
		BezierPath { control_points: t.apply_many(&self.control_points) }
	}

	pub fn decompose(&self, kinds: &[ShapeKind], tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Bezier) {
			return Ok(vec![Shape2D::Bezier(self.clone())]);
		}
		if kinds.contains(&ShapeKind::Polygon) && self.is_closed() {
			return Ok(vec![Shape2D::Polygon(self.to_polygon(16, tol)?)]);
		}
		if kinds.contains(&ShapeKind::PolyLine) {
			return Ok(vec![Shape2D::PolyLine(self.to_polyline(16, tol))]);
		}
		Err(super::decomposition_error(kinds))
	}

	/// If `tol > 0`, recursively subdivides each segment via midpoint split
	/// until the control polygon's flatness is within `tol`; otherwise
	/// emits `segments_per_curve` uniform samples per segment.
	pub fn to_polyline(&self, segments_per_curve: usize, tol: f64) -> PolyLine2D {
		let mut points = vec![self.control_points[0]];
		for i in 0..self.segment_count() {
			let seg = self.segment(i);
			if tol > 0.0 {
				flatten_recursive(&seg, tol, &mut points);
			} else {
				let n = segments_per_curve.max(1);
				for step in 1..=n {
					let u = step as f64 / n as f64;
					points.push(cubic_bezier_point(&seg, u));
				}
			}
		}
		PolyLine2D::new(points).expect("a bezier path always has at least one segment")
	}

	pub fn to_polygon(&self, segments_per_curve: usize, tol: f64) -> CadResult<Polygon> {
		let mut points = self.to_polyline(segments_per_curve, tol).points().to_vec();
		if points.first() == points.last() {
			points.pop();
		}
		Polygon::new(points)
	}

	/// Coarse sample (16 points per segment), then bounded Newton on
	/// `(q - B(t)) . B'(t) = 0`, clamped to `[0, 1]`, at most 20 iterations.
	pub fn closest_point_to(&self, q: Point2D) -> Point2D {
		let mut best_t = 0.0;
		let mut best_dist = f64::INFINITY;
		let samples = NEWTON_COARSE_SAMPLES;
		for i in 0..=samples {
			let t = i as f64 / samples as f64;
			let p = self.point_at_parameter(t);
			let d = p.distance_to(q);
			if d < best_dist {
				best_dist = d;
				best_t = t;
			}
		}

		let mut t = best_t;
		for _ in 0..NEWTON_MAX_ITERATIONS {
			let p = self.point_at_parameter(t);
			let tangent = self.tangent_at_parameter(t);
			let f = (q - p).dot(tangent) * -1.0;
			let fp = tangent.magnitude_squared();
			if fp.abs() <= EPSILON {
				break;
			}
			let next = (t - f / fp).clamp(0.0, 1.0);
			if (next - t).abs() <= EPSILON {
				t = next;
				break;
			}
			t = next;
		}
		self.point_at_parameter(t)
	}

	pub fn from_line(line: Line2D) -> BezierPath {
		let third = line.start + (line.end - line.start) * (1.0 / 3.0);
		let two_thirds = line.start + (line.end - line.start) * (2.0 / 3.0);
		BezierPath { control_points: vec![line.start, third, two_thirds, line.end] }
	}

	/// Per-vertex tangent is the normalized chord between neighbors;
	/// control points lie along that tangent at distance
	/// `smoothness * segment_length`.
	pub fn from_polyline(pl: &PolyLine2D, smoothness: f64) -> CadResult<BezierPath> {
		let points = pl.points();
		if points.len() < 2 {
			return Err(CadError::Domain("need at least 2 points to fit a bezier path".into()));
		}
		let n = points.len();
		let tangent_at = |i: usize| -> Point2D {
			let prev = points[i.saturating_sub(1)];
			let next = points[(i + 1).min(n - 1)];
			(next - prev).unit_vector()
		};

		let mut control_points = vec![points[0]];
		for i in 0..n - 1 {
			let segment_length = points[i].distance_to(points[i + 1]);
			let c1 = points[i] + tangent_at(i) * (smoothness * segment_length);
			let c2 = points[i + 1] - tangent_at(i + 1) * (smoothness * segment_length);
			control_points.push(c1);
			control_points.push(c2);
			control_points.push(points[i + 1]);
		}
		BezierPath::new(control_points)
	}

	/// Four-arc approximation with the standard magic constant.
	pub fn circle(center: Point2D, r: f64) -> BezierPath {
		let k = r * CIRCLE_KAPPA;
		let (e, n, w, s) = (center + Point2D::new(r, 0.0), center + Point2D::new(0.0, r), center + Point2D::new(-r, 0.0), center + Point2D::new(0.0, -r));
		let control_points = vec![
			e,
			e + Point2D::new(0.0, k),
			n + Point2D::new(k, 0.0),
			n,
			n + Point2D::new(-k, 0.0),
			w + Point2D::new(0.0, k),
			w,
			w + Point2D::new(0.0, -k),
			s + Point2D::new(-k, 0.0),
			s,
			s + Point2D::new(k, 0.0),
			e + Point2D::new(0.0, -k),
			e,
		];
		BezierPath { control_points }
	}
}

fn cubic_bezier_point(seg: &[Point2D; 4], u: f64) -> Point2D {
	let mt = 1.0 - u;
	seg[0] * (mt * mt * mt) + seg[1] * (3.0 * mt * mt * u) + seg[2] * (3.0 * mt * u * u) + seg[3] * (u * u * u)
}

fn cubic_bezier_tangent(seg: &[Point2D; 4], u: f64) -> Point2D {
	let mt = 1.0 - u;
	(seg[1] - seg[0]) * (3.0 * mt * mt) + (seg[2] - seg[1]) * (6.0 * mt * u) + (seg[3] - seg[2]) * (3.0 * u * u)
}

/// Flatness is the max perpendicular distance from the interior control
/// points to the chord p0-p3.
fn flatness(seg: &[Point2D; 4]) -> f64 {
	let chord = Line2D::new(seg[0], seg[3]);
	chord.distance_to_point(seg[1]).max(chord.distance_to_point(seg[2]))
}

fn flatten_recursive(seg: &[Point2D; 4], tol: f64, out: &mut Vec<Point2D>) {
	if flatness(seg) <= tol || seg[0].distance_to(seg[3]) <= EPSILON {
		out.push(seg[3]);
		return;
	}
	let (left, right) = de_casteljau_split(seg);
	flatten_recursive(&left, tol, out);
	flatten_recursive(&right, tol, out);
}

fn de_casteljau_split(seg: &[Point2D; 4]) -> ([Point2D; 4], [Point2D; 4]) {
	let p01 = (seg[0] + seg[1]) * 0.5;
	let p12 = (seg[1] + seg[2]) * 0.5;
	let p23 = (seg[2] + seg[3]) * 0.5;
	let p012 = (p01 + p12) * 0.5;
	let p123 = (p12 + p23) * 0.5;
	let mid = (p012 + p123) * 0.5;
	([seg[0], p01, p012, mid], [mid, p123, p23, seg[3]])
}

impl crate::constraint::Constraints for BezierPath {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		self.control_points.iter().enumerate().map(|(i, &p)| crate::constraint::Constrainable::point(format!("point_{i}"), p)).collect()
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let control_points = self
			.control_points
			.iter()
			.enumerate()
			.map(|(i, &p)| match bag.get(&format!("point_{i}")) {
				Some(crate::constraint::ConstrainableValue::Point(solved)) => *solved,
				_ => p,
			})
			.collect();
		BezierPath::new(control_points).unwrap_or_else(|_| self.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn pads_short_control_point_list() {
		let bp = BezierPath::new(vec![Point2D::ZERO, Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0), Point2D::new(2.0, 1.0), Point2D::new(3.0, 1.0)]).unwrap();
		assert_eq!((bp.control_points().len() - 1) % 3, 0);
	}

	#[test]
	fn point_at_parameter_endpoints_match_control_points() {
		let bp = BezierPath::from_line(Line2D::new(Point2D::ZERO, Point2D::new(10.0, 0.0)));
		assert_eq!(bp.point_at_parameter(0.0), Point2D::ZERO);
		assert_eq!(bp.point_at_parameter(1.0), Point2D::new(10.0, 0.0));
	}

	#[test]
	fn to_polyline_stays_within_tolerance_of_curve() {
		let bp = BezierPath::circle(Point2D::ZERO, 10.0);
		let pl = bp.to_polyline(16, 0.01);
		for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
			let p = bp.point_at_parameter(t);
			assert!(pl.closest_point_to(p).distance_to(p) < 0.05);
		}
	}

	#[test]
	fn from_polyline_round_trips_through_to_polyline() {
		let pl = PolyLine2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0), Point2D::new(10.0, 0.0)]).unwrap();
		let bp = BezierPath::from_polyline(&pl, 0.3).unwrap();
		let resampled = bp.to_polyline(32, 0.0);
		assert!(resampled.closest_point_to(Point2D::new(5.0, 5.0)).distance_to(Point2D::new(5.0, 5.0)) < 1.0);
	}
}
