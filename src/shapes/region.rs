//! Boolean-ready region of signed rings.
//!
//! Orientation convention: CCW = perimeter, CW = hole. A hole whose centroid
//! falls outside every perimeter only logs a warning (see DESIGN.md, open
//! question #1) rather than failing construction — this preserves
//! transiently-invalid intermediate states during editing.

use super::{Bounds, Polygon, Shape2D, ShapeKind};
use crate::boolean::{self, EndType, JoinType};
use crate::consts::EPSILON;
use crate::error::CadResult;
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// A set of CCW perimeters with CW holes, boolean-combinable via the
/// clipper adapter in [`crate::boolean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
	perimeters: Vec<Polygon>,
	holes: Vec<Polygon>,
}

impl Region {
	/// Validates hole containment, logging a warning (never failing) for
	/// any hole whose centroid lies outside every perimeter.
	pub fn new(perimeters: Vec<Polygon>, holes: Vec<Polygon>) -> Self {
		for hole in &holes {
			let centroid = hole.centroid();
			if !perimeters.iter().any(|p| p.contains(centroid, EPSILON)) {
				warn!("region hole centroid {centroid} is not contained in any perimeter");
			}
		}
		Self { perimeters, holes }
	}

	/// Skips hole-containment validation; used internally when
	/// reconstructing a region from already-classified clipper output.
	pub(crate) fn new_unchecked(perimeters: Vec<Polygon>, holes: Vec<Polygon>) -> Self {
		Self { perimeters, holes }
	}

	/// Axis-aligned rectangle perimeter with no holes.
	pub fn rectangle(origin: Point2D, width: f64, height: f64) -> CadResult<Self> {
		let points = vec![origin, Point2D::new(origin.x + width, origin.y), Point2D::new(origin.x + width, origin.y + height), Point2D::new(origin.x, origin.y + height)];
		Ok(Self::new(vec![Polygon::new(points)?], vec![]))
	}

	pub fn perimeters(&self) -> &[Polygon] {
		&self.perimeters
	}

	pub fn holes(&self) -> &[Polygon] {
		&self.holes
	}

	pub fn area(&self) -> f64 {
		let perimeter_area: f64 = self.perimeters.iter().map(|p| p.area()).sum();
		let hole_area: f64 = self.holes.iter().map(|p| p.area()).sum();
		(perimeter_area - hole_area).max(0.0)
	}

	pub fn centroid(&self) -> Point2D {
		if self.perimeters.is_empty() {
			return Point2D::ZERO;
		}
		let weighted = self.perimeters.iter().fold((Point2D::ZERO, 0.0), |(acc, area_acc), p| {
			let a = p.area();
			(acc + p.centroid() * a, area_acc + a)
		});
		if weighted.1.abs() <= EPSILON { Point2D::ZERO } else { weighted.0 / weighted.1 }
	}

	pub fn bounds(&self) -> Bounds {
		self.perimeters.iter().map(|p| p.bounds()).reduce(|a, b| a.union(&b)).unwrap_or(Bounds::new(Point2D::ZERO, Point2D::ZERO))
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		if !self.perimeters.iter().any(|p| p.contains(point, tol)) {
			return false;
		}
		!self.holes.iter().any(|h| h.contains(point, tol))
	}

	pub fn translate(&self, offset: Point2D) -> Region {
		Region::new_unchecked(self.perimeters.iter().map(|p| p.translate(offset)).collect(), self.holes.iter().map(|p| p.translate(offset)).collect())
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Region {
		Region::new_unchecked(self.perimeters.iter().map(|p| p.rotate(angle, center)).collect(), self.holes.iter().map(|p| p.rotate(angle, center)).collect())
	}

	pub fn scale(&self, factor: Point2D, center: Point2D) -> Region {
		Region::new_unchecked(self.perimeters.iter().map(|p| p.scale(factor, center)).collect(), self.holes.iter().map(|p| p.scale(factor, center)).collect())
	}

	pub fn transform(&self, t: &Transform2D) -> Region {
		Region::new_unchecked(self.perimeters.iter().map(|p| p.transform(t)).collect(), self.holes.iter().map(|p| p.transform(t)).collect())
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Region) {
			return Ok(vec![Shape2D::Region(self.clone())]);
		}
		if kinds.contains(&ShapeKind::Polygon) {
			return Ok(self.perimeters.iter().cloned().map(Shape2D::Polygon).collect());
		}
		if kinds.contains(&ShapeKind::Line) {
			return Ok(self.perimeters.iter().flat_map(|p| p.edges()).map(Shape2D::Line).collect());
		}
		Err(super::decomposition_error(kinds))
	}

	pub fn union(&self, other: &Region) -> Region {
		boolean::union(self, other)
	}

	pub fn difference(&self, other: &Region) -> Region {
		boolean::difference(self, other)
	}

	pub fn intersection(&self, other: &Region) -> Region {
		boolean::intersection(self, other)
	}

	pub fn xor(&self, other: &Region) -> Region {
		boolean::xor(self, other)
	}

	pub fn offset(&self, delta: f64, join: JoinType, end: EndType) -> Region {
		boolean::offset(self, delta, join, end)
	}

	/// Accepts a bare [`Polygon`] operand, matching `region.py`'s
	/// `minkowski_sum`/`minkowski_diff` signature.
	pub fn minkowski_sum(&self, other: &Polygon) -> Region {
		self.perimeters.iter().map(|p| boolean::minkowski_sum(p, other)).reduce(|a, b| a.union(&b)).unwrap_or_else(|| Region::new_unchecked(vec![], vec![]))
	}

	pub fn minkowski_diff(&self, other: &Polygon) -> Region {
		self.perimeters.iter().map(|p| boolean::minkowski_diff(p, other)).reduce(|a, b| a.union(&b)).unwrap_or_else(|| Region::new_unchecked(vec![], vec![]))
	}
}

impl crate::constraint::Constraints for Region {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		let mut out = Vec::new();
		for (i, perimeter) in self.perimeters.iter().enumerate() {
			for (j, &p) in perimeter.points().iter().enumerate() {
				out.push(crate::constraint::Constrainable::point(format!("perimeter_{i}_vertex_{j}"), p));
			}
		}
		for (i, hole) in self.holes.iter().enumerate() {
			for (j, &p) in hole.points().iter().enumerate() {
				out.push(crate::constraint::Constrainable::point(format!("hole_{i}_vertex_{j}"), p));
			}
		}
		out
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let solve_ring = |prefix: &str, ring: &Polygon| -> Polygon {
			let points = ring
				.points()
				.iter()
				.enumerate()
				.map(|(j, &p)| match bag.get(&format!("{prefix}_vertex_{j}")) {
					Some(crate::constraint::ConstrainableValue::Point(solved)) => *solved,
					_ => p,
				})
				.collect();
			Polygon::new(points).unwrap_or_else(|_| ring.clone())
		};
		let perimeters = self.perimeters.iter().enumerate().map(|(i, ring)| solve_ring(&format!("perimeter_{i}"), ring)).collect();
		let holes = self.holes.iter().enumerate().map(|(i, ring)| solve_ring(&format!("hole_{i}"), ring)).collect();
		Region::new_unchecked(perimeters, holes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn rectangle_area_matches_dimensions() {
		let r = Region::rectangle(Point2D::new(0.0, 0.0), 10.0, 10.0).unwrap();
		assert_eq!(r.area(), 100.0);
	}

	#[test]
	fn difference_bounds_of_overlapping_rectangles() {
		let a = Region::rectangle(Point2D::new(0.0, 0.0), 10.0, 10.0).unwrap();
		let b = Region::rectangle(Point2D::new(5.0, 0.0), 10.0, 10.0).unwrap();
		let out = a.difference(&b);
		let bounds = out.bounds();
		assert!((bounds.min.x - 0.0).abs() < 1e-3);
		assert!((bounds.max.x - 5.0).abs() < 1e-3);
	}

	#[test]
	fn hole_outside_perimeter_only_warns() {
		let perimeter = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0), Point2D::new(0.0, 1.0)]).unwrap();
		let far_hole = Polygon::new(vec![Point2D::new(10.0, 10.0), Point2D::new(11.0, 10.0), Point2D::new(11.0, 11.0), Point2D::new(10.0, 11.0)]).unwrap();
		let region = Region::new(vec![perimeter], vec![far_hole]);
		assert_eq!(region.holes().len(), 1);
	}
}
