//! Closed polygon.

use super::{Bounds, Shape2D, ShapeKind, line::Line2D};
use crate::boolean::{self, EndType, JoinType};
use crate::consts::EPSILON;
use crate::error::{CadError, CadResult};
use crate::shapes::Region;
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// An ordered, implicitly-closed list of at least 3 points. Orientation sign
/// is given by [`Polygon::signed_area`]: positive is CCW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
	points: Vec<Point2D>,
}

impl Polygon {
	pub fn new(points: Vec<Point2D>) -> CadResult<Self> {
		if points.len() < 3 {
			return Err(CadError::Domain("a polygon needs at least 3 points".into()));
		}
		Ok(Self { points })
	}

	pub fn points(&self) -> &[Point2D] {
		&self.points
	}

	pub fn edges(&self) -> impl Iterator<Item = Line2D> + '_ {
		let n = self.points.len();
		(0..n).map(move |i| Line2D::new(self.points[i], self.points[(i + 1) % n]))
	}

	/// Shoelace formula on the implicitly-closed ring.
	pub fn signed_area(&self) -> f64 {
		let n = self.points.len();
		let mut sum = 0.0;
		for i in 0..n {
			let p0 = self.points[i];
			let p1 = self.points[(i + 1) % n];
			sum += p0.x * p1.y - p1.x * p0.y;
		}
		sum * 0.5
	}

	pub fn area(&self) -> f64 {
		self.signed_area().abs()
	}

	/// Area-weighted centroid, falling back to the arithmetic mean when the
	/// signed area is (numerically) zero.
	pub fn centroid(&self) -> Point2D {
		let signed_area = self.signed_area();
		if signed_area.abs() <= EPSILON {
			let n = self.points.len() as f64;
			let sum = self.points.iter().fold(Point2D::ZERO, |acc, &p| acc + p);
			return sum / n;
		}
		let n = self.points.len();
		let (mut cx, mut cy) = (0.0, 0.0);
		for i in 0..n {
			let p0 = self.points[i];
			let p1 = self.points[(i + 1) % n];
			let cross = p0.x * p1.y - p1.x * p0.y;
			cx += (p0.x + p1.x) * cross;
			cy += (p0.y + p1.y) * cross;
		}
		let factor = 1.0 / (6.0 * signed_area);
		Point2D::new(cx * factor, cy * factor)
	}

	/// True iff every non-degenerate cross product of consecutive edge
	/// vectors shares a sign.
	pub fn is_convex(&self) -> bool {
		let n = self.points.len();
		let mut sign = 0.0_f64;
		for i in 0..n {
			let a = self.points[i];
			let b = self.points[(i + 1) % n];
			let c = self.points[(i + 2) % n];
			let cross = (b - a).cross(c - b);
			if cross.abs() <= EPSILON {
				continue;
			}
			if sign == 0.0 {
				sign = cross.signum();
			} else if cross.signum() != sign {
				return false;
			}
		}
		true
	}

	/// Reverse vertex order (flips the sign of [`Polygon::signed_area`]).
	pub fn reversed(&self) -> Polygon {
		let mut points = self.points.clone();
		points.reverse();
		Polygon { points }
	}

	/// Even-odd ray-cast along +x; horizontal edges are skipped, ties at
	/// vertex y-coordinates resolved by the half-open `[y0, y1)` convention.
	pub fn contains(&self, p: Point2D, tol: f64) -> bool {
		if self.edges().any(|e| e.distance_to_point(p) <= tol) {
			return true;
		}
		let n = self.points.len();
		let mut inside = false;
		for i in 0..n {
			let p0 = self.points[i];
			let p1 = self.points[(i + 1) % n];
			if (p0.y - p1.y).abs() <= EPSILON {
				continue;
			}
			let (lo, hi) = if p0.y < p1.y { (p0, p1) } else { (p1, p0) };
			if p.y >= lo.y && p.y < hi.y {
				let x_at_y = lo.x + (p.y - lo.y) / (hi.y - lo.y) * (hi.x - lo.x);
				if p.x < x_at_y {
					inside = !inside;
				}
			}
		}
		inside
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::from_points(&self.points).expect("at least 3 points")
	}

	pub fn translate(&self, offset: Point2D) -> Polygon {
		Polygon { points: self.points.iter().map(|p| p.translate(offset)).collect() }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Polygon {
		Polygon { points: self.points.iter().map(|p| p.rotate(angle, center)).collect() }
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> Polygon {
		Polygon { points: self.points.iter().map(|p| p.scale(factor, center)).collect() }
	}

	pub fn transform(&self, t: &Transform2D) -> Polygon {
		Polygon { points: t.apply_many(&self.points) }
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Polygon) {
			return Ok(vec![Shape2D::Polygon(self.clone())]);
		}
		if kinds.contains(&ShapeKind::Line) {
			return Ok(self.edges().map(Shape2D::Line).collect());
		}
		if kinds.contains(&ShapeKind::Region) {
			return Ok(vec![Shape2D::Region(Region::new_unchecked(vec![self.clone()], vec![]))]);
		}
		Err(super::decomposition_error(kinds))
	}

	/// Remove vertices coincident with a neighbor within `tol`, and vertices
	/// collinear with neighbors such that the triangle area is below `tol`.
	/// Reruns until no more removals occur.
	pub fn simplify(&self, tol: f64) -> Polygon {
		let mut pts = self.points.clone();
		loop {
			let before = pts.len();
			pts = simplify_pass(&pts, tol);
			if pts.len() == before || pts.len() < 3 {
				break;
			}
		}
		Polygon { points: pts }
	}

	/// If `p` coincides with an existing vertex (within `tol`), return its
	/// index unchanged; else find the unique edge within `tol` and insert
	/// `p` immediately after the edge's start.
	pub fn add_vertex_at_point(&self, p: Point2D, tol: f64) -> CadResult<(Polygon, usize)> {
		for (i, &existing) in self.points.iter().enumerate() {
			if existing.distance_to(p) <= tol {
				return Ok((self.clone(), i));
			}
		}
		for (i, edge) in self.edges().enumerate() {
			if edge.distance_to_point(p) <= tol {
				let mut pts = self.points.clone();
				pts.insert(i + 1, p);
				return Ok((Polygon { points: pts }, i + 1));
			}
		}
		Err(CadError::NotOnPerimeter { tolerance: tol })
	}

	/// Refuse to reduce below 3 vertices.
	pub fn delete_vertex_at_point(&self, p: Point2D, tol: f64) -> CadResult<Polygon> {
		if self.points.len() <= 3 {
			return Err(CadError::Domain("polygon already at minimum vertex count".into()));
		}
		let (idx, closest) = self
			.points
			.iter()
			.enumerate()
			.min_by(|(_, a), (_, b)| a.distance_to(p).partial_cmp(&b.distance_to(p)).unwrap())
			.unwrap();
		if closest.distance_to(p) > tol {
			return Err(CadError::NotOnPerimeter { tolerance: tol });
		}
		let mut pts = self.points.clone();
		pts.remove(idx);
		Ok(Polygon { points: pts })
	}

	pub fn union(&self, other: &Polygon) -> Region {
		boolean::union(&self.as_region(), &other.as_region())
	}

	pub fn difference(&self, other: &Polygon) -> Region {
		boolean::difference(&self.as_region(), &other.as_region())
	}

	pub fn intersection(&self, other: &Polygon) -> Region {
		boolean::intersection(&self.as_region(), &other.as_region())
	}

	pub fn xor(&self, other: &Polygon) -> Region {
		boolean::xor(&self.as_region(), &other.as_region())
	}

	pub fn offset(&self, delta: f64, join: JoinType, end: EndType) -> Region {
		boolean::offset(&self.as_region(), delta, join, end)
	}

	pub fn minkowski_sum(&self, other: &Polygon) -> Region {
		boolean::minkowski_sum(self, other)
	}

	pub fn minkowski_diff(&self, other: &Polygon) -> Region {
		boolean::minkowski_diff(self, other)
	}

	fn as_region(&self) -> Region {
		Region::new_unchecked(vec![self.clone()], vec![])
	}

	/// Decompose into convex pieces via ear clipping, used by the Minkowski
	/// sum implementation (which needs convex operands).
	pub(crate) fn convex_decomposition(&self) -> Vec<Vec<Point2D>> {
		let ccw = if self.signed_area() < 0.0 { self.reversed() } else { self.clone() };
		if ccw.is_convex() {
			return vec![ccw.points];
		}
		ear_clip_triangles(&ccw.points)
	}
}

fn simplify_pass(points: &[Point2D], tol: f64) -> Vec<Point2D> {
	let n = points.len();
	if n < 4 {
		return points.to_vec();
	}
	let mut keep = vec![true; n];
	for i in 0..n {
		let prev = points[(i + n - 1) % n];
		let cur = points[i];
		let next = points[(i + 1) % n];
		if cur.distance_to(prev) <= tol || cur.distance_to(next) <= tol {
			keep[i] = false;
			continue;
		}
		let area = ((next.x - prev.x) * (cur.y - prev.y) - (cur.x - prev.x) * (next.y - prev.y)).abs() * 0.5;
		if area <= tol {
			keep[i] = false;
		}
	}
	let out: Vec<Point2D> = points.iter().zip(keep.iter()).filter(|(_, k)| **k).map(|(p, _)| *p).collect();
	if out.len() < 3 { points.to_vec() } else { out }
}

/// Simple O(n^2) ear clipping; adequate for the moderate vertex counts a CAD
/// outline produces, and the only decomposition the Minkowski sum needs.
fn ear_clip_triangles(points: &[Point2D]) -> Vec<Vec<Point2D>> {
	let mut indices: Vec<usize> = (0..points.len()).collect();
	let mut triangles = Vec::new();
	let mut guard = 0;
	while indices.len() > 3 && guard < points.len() * points.len() + 16 {
		guard += 1;
		let n = indices.len();
		let mut clipped = false;
		for i in 0..n {
			let prev = indices[(i + n - 1) % n];
			let cur = indices[i];
			let next = indices[(i + 1) % n];
			let (a, b, c) = (points[prev], points[cur], points[next]);
			if (b - a).cross(c - b) <= EPSILON {
				continue;
			}
			let is_ear = !indices
				.iter()
				.filter(|&&idx| idx != prev && idx != cur && idx != next)
				.any(|&idx| point_in_triangle(points[idx], a, b, c));
			if is_ear {
				triangles.push(vec![a, b, c]);
				indices.remove(i);
				clipped = true;
				break;
			}
		}
		if !clipped {
			break;
		}
	}
	if indices.len() >= 3 {
		triangles.push(indices.iter().map(|&i| points[i]).collect());
	}
	triangles
}

fn point_in_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
	let d1 = (b - a).cross(p - a);
	let d2 = (c - b).cross(p - b);
	let d3 = (a - c).cross(p - c);
	let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
	let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
	!(has_neg && has_pos)
}

impl crate::constraint::Constraints for Polygon {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		self.points.iter().enumerate().map(|(i, &p)| crate::constraint::Constrainable::point(format!("vertex_{i}"), p)).collect()
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let points = self
			.points
			.iter()
			.enumerate()
			.map(|(i, &p)| match bag.get(&format!("vertex_{i}")) {
				Some(crate::constraint::ConstrainableValue::Point(solved)) => *solved,
				_ => p,
			})
			.collect();
		Polygon::new(points).unwrap_or_else(|_| self.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn rectangle() -> Polygon {
		Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0), Point2D::new(4.0, 3.0), Point2D::new(0.0, 3.0)]).unwrap()
	}

	#[test]
	fn area_and_centroid_of_rectangle() {
		let r = rectangle();
		assert_eq!(r.area(), 12.0);
		assert_eq!(r.centroid(), Point2D::new(2.0, 1.5));
		assert!(r.is_convex());
	}

	#[test]
	fn contains_even_odd_inside_and_outside() {
		let r = rectangle();
		assert!(r.contains(Point2D::new(2.0, 1.5), 1e-9));
		assert!(!r.contains(Point2D::new(10.0, 10.0), 1e-9));
	}

	#[test]
	fn reversed_flips_signed_area() {
		let r = rectangle();
		assert_eq!(r.signed_area(), -r.reversed().signed_area());
	}

	#[test]
	fn add_and_delete_vertex_round_trip() {
		let r = rectangle();
		let (grown, idx) = r.add_vertex_at_point(Point2D::new(2.0, 0.0), 1e-6).unwrap();
		assert_eq!(grown.points().len(), 5);
		let shrunk = grown.delete_vertex_at_point(grown.points()[idx], 1e-6).unwrap();
		assert_eq!(shrunk.points().len(), 4);
	}

	#[test]
	fn delete_vertex_refuses_below_minimum() {
		let triangle = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)]).unwrap();
		assert!(triangle.delete_vertex_at_point(Point2D::new(0.0, 0.0), 1e-6).is_err());
	}
}
