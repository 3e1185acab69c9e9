//! Open (or closed) polyline.

use super::{Bounds, Shape2D, ShapeKind, line::Line2D};
use crate::consts::EPSILON;
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// An ordered list of at least 2 points. `is_closed()` iff the first and
/// last points coincide within epsilon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyLine2D {
	points: Vec<Point2D>,
}

impl PolyLine2D {
	pub fn new(points: Vec<Point2D>) -> CadResult<Self> {
		if points.len() < 2 {
			return Err(CadError::Domain("a polyline needs at least 2 points".into()));
		}
		Ok(Self { points })
	}

	pub fn points(&self) -> &[Point2D] {
		&self.points
	}

	pub fn is_closed(&self) -> bool {
		self.points.first().zip(self.points.last()).map(|(a, b)| *a == *b).unwrap_or(false)
	}

	pub fn segments(&self) -> impl Iterator<Item = Line2D> + '_ {
		self.points.windows(2).map(|w| Line2D::new(w[0], w[1]))
	}

	pub fn length(&self) -> f64 {
		self.segments().map(|s| s.length()).sum()
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::from_points(&self.points).expect("at least 2 points")
	}

	/// Point-on-shape test within `tol` (an open polyline has no interior).
	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		self.segments().any(|s| s.distance_to_point(point) <= tol)
	}

	pub fn closest_point_to(&self, p: Point2D) -> Point2D {
		self.segments()
			.map(|s| s.closest_point_to(p))
			.min_by(|a, b| a.distance_to(p).partial_cmp(&b.distance_to(p)).unwrap())
			.unwrap_or(self.points[0])
	}

	pub fn translate(&self, offset: Point2D) -> PolyLine2D {
		PolyLine2D::new(self.points.iter().map(|p| p.translate(offset)).collect()).unwrap()
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> PolyLine2D {
		PolyLine2D::new(self.points.iter().map(|p| p.rotate(angle, center)).collect()).unwrap()
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> PolyLine2D {
		PolyLine2D::new(self.points.iter().map(|p| p.scale(factor, center)).collect()).unwrap()
	}

	pub fn transform(&self, t: &Transform2D) -> PolyLine2D {
		PolyLine2D::new(t.apply_many(&self.points)).unwrap()
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::PolyLine) {
			return Ok(vec![Shape2D::PolyLine(self.clone())]);
		}
		if kinds.contains(&ShapeKind::Line) {
			return Ok(self.segments().map(Shape2D::Line).collect());
		}
		Err(super::decomposition_error(kinds))
	}

	/// Remove vertices coincident with a neighbor within `tol`, and vertices
	/// collinear with their neighbors within `tol`. Reruns until no more
	/// removals occur.
	pub fn simplify(&self, tol: f64) -> PolyLine2D {
		let mut pts = self.points.clone();
		loop {
			let before = pts.len();
			pts = simplify_pass(&pts, tol, self.is_closed());
			if pts.len() == before || pts.len() < 2 {
				break;
			}
		}
		PolyLine2D::new(pts).unwrap()
	}

	/// Locate the containing segment (or coincident vertex) and split into
	/// two polylines sharing the split point. Single-point halves duplicate
	/// the point to satisfy the >=2-point invariant.
	pub fn split_at_point(&self, p: Point2D, tol: f64) -> CadResult<(PolyLine2D, PolyLine2D)> {
		for (i, seg) in self.segments().enumerate() {
			if seg.distance_to_point(p) <= tol {
				let split_point = seg.closest_point_to(p);
				let mut first: Vec<Point2D> = self.points[..=i].to_vec();
				first.push(split_point);
				let mut second: Vec<Point2D> = vec![split_point];
				second.extend_from_slice(&self.points[i + 1..]);
				if first.len() < 2 {
					first.push(first[0]);
				}
				if second.len() < 2 {
					second.push(second[0]);
				}
				return Ok((PolyLine2D::new(first)?, PolyLine2D::new(second)?));
			}
		}
		Err(CadError::NotOnPerimeter { tolerance: tol })
	}

	/// Only valid on closed polylines: rotate the sequence so `new_start_index`
	/// is first, and re-duplicate the closing point.
	pub fn reorient_start_point(&self, new_start_index: usize) -> CadResult<PolyLine2D> {
		if !self.is_closed() {
			return Err(CadError::Domain("reorient_start_point requires a closed polyline".into()));
		}
		let body = &self.points[..self.points.len() - 1];
		if new_start_index >= body.len() {
			return Err(CadError::Domain(format!("index {new_start_index} out of bounds for {} vertices", body.len())));
		}
		let mut rotated: Vec<Point2D> = body[new_start_index..].iter().chain(body[..new_start_index].iter()).copied().collect();
		rotated.push(rotated[0]);
		PolyLine2D::new(rotated)
	}

	/// Refuse to reduce below 2 vertices.
	pub fn delete_vertex_at_point(&self, p: Point2D, tol: f64) -> CadResult<PolyLine2D> {
		if self.points.len() <= 2 {
			return Err(CadError::Domain("polyline already at minimum vertex count".into()));
		}
		let (idx, _) = self
			.points
			.iter()
			.enumerate()
			.min_by(|(_, a), (_, b)| a.distance_to(p).partial_cmp(&b.distance_to(p)).unwrap())
			.unwrap();
		if self.points[idx].distance_to(p) > tol {
			return Err(CadError::NotOnPerimeter { tolerance: tol });
		}
		let mut pts = self.points.clone();
		pts.remove(idx);
		if pts.len() < 2 {
			return Err(CadError::Domain("deleting this vertex would leave fewer than 2 points".into()));
		}
		PolyLine2D::new(pts)
	}
}

fn simplify_pass(points: &[Point2D], tol: f64, closed: bool) -> Vec<Point2D> {
	if points.len() < 3 {
		return points.to_vec();
	}
	let n = points.len();
	let mut keep = vec![true; n];
	for i in 0..n {
		if i == 0 || i == n - 1 {
			// Endpoints of an open polyline are never removed; for a closed
			// polyline the duplicated closing point is handled separately.
			continue;
		}
		let prev = points[i - 1];
		let next = points[i + 1];
		let cur = points[i];
		if cur.distance_to(prev) <= tol || cur.distance_to(next) <= tol {
			keep[i] = false;
			continue;
		}
		let area = ((next.x - prev.x) * (cur.y - prev.y) - (cur.x - prev.x) * (next.y - prev.y)).abs() * 0.5;
		if area <= tol {
			keep[i] = false;
		}
	}
	let mut out: Vec<Point2D> = points.iter().zip(keep.iter()).filter(|(_, k)| **k).map(|(p, _)| *p).collect();
	if out.len() < 2 {
		out = points.to_vec();
	}
	if closed && out.first() != out.last() {
		if let Some(&first) = out.first() {
			out.push(first);
		}
	}
	out
}

impl crate::constraint::Constraints for PolyLine2D {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		self.points.iter().enumerate().map(|(i, &p)| crate::constraint::Constrainable::point(format!("point_{i}"), p)).collect()
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let points = self
			.points
			.iter()
			.enumerate()
			.map(|(i, &p)| match bag.get(&format!("point_{i}")) {
				Some(crate::constraint::ConstrainableValue::Point(solved)) => *solved,
				_ => p,
			})
			.collect();
		PolyLine2D::new(points).unwrap_or_else(|_| self.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn rejects_too_few_points() {
		assert!(PolyLine2D::new(vec![Point2D::ZERO]).is_err());
	}

	#[test]
	fn is_closed_detects_shared_endpoints() {
		let closed = PolyLine2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 0.0)]).unwrap();
		assert!(closed.is_closed());
		let open = PolyLine2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]).unwrap();
		assert!(!open.is_closed());
	}

	#[test]
	fn simplify_removes_collinear_midpoint() {
		let pl = PolyLine2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(2.0, 0.0)]).unwrap();
		assert_eq!(pl.simplify(1e-9).points().len(), 2);
	}

	#[test]
	fn split_at_point_preserves_invariant() {
		let pl = PolyLine2D::new(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)]).unwrap();
		let (a, b) = pl.split_at_point(Point2D::new(4.0, 0.0), 1e-6).unwrap();
		assert!(a.points().len() >= 2);
		assert!(b.points().len() >= 2);
		assert_eq!(*a.points().last().unwrap(), *b.points().first().unwrap());
	}
}
