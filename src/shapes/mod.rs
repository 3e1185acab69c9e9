//! The 2D shape algebra.
//!
//! A closed family of primitives sharing one capability set. Every
//! transformation produces a new value — shapes never mutate in place; a
//! `CadObject` wraps one and replaces it wholesale on edit.
//!
//! Non-uniform transforms can change which concrete shape a value is; the
//! capability set therefore returns [`Shape2D`] (the supertype), never the
//! invoking concrete kind.

mod arc;
mod bezier_path;
mod circle;
mod ellipse;
mod gear;
mod line;
mod point;
mod polygon;
mod polyline;
mod rect;
mod region;

pub use arc::Arc;
pub use bezier_path::BezierPath;
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use gear::Gear;
pub use line::{Line2D, LineIntersection};
pub use polygon::Polygon;
pub use polyline::PolyLine2D;
pub use rect::Rect;
pub use region::Region;

use crate::constraint::Constraints;
use crate::error::CadResult;
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// The tag returned by [`Shape2D::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
	Point,
	Line,
	PolyLine,
	Polygon,
	Arc,
	Rect,
	Circle,
	Ellipse,
	Bezier,
	Region,
	SpurGear,
}

/// Axis-aligned bounding box, tight for analytic shapes and tight-up-to-
/// flattening-tolerance for curved ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
	pub min: Point2D,
	pub max: Point2D,
}

impl Bounds {
	pub fn new(min: Point2D, max: Point2D) -> Self {
		Self { min, max }
	}

	pub fn from_points(points: &[Point2D]) -> Option<Bounds> {
		let first = *points.first()?;
		let mut min = first;
		let mut max = first;
		for &p in &points[1..] {
			min.x = min.x.min(p.x);
			min.y = min.y.min(p.y);
			max.x = max.x.max(p.x);
			max.y = max.y.max(p.y);
		}
		Some(Bounds::new(min, max))
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn union(&self, other: &Bounds) -> Bounds {
		Bounds::new(
			Point2D::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
			Point2D::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
		)
	}

	pub fn contains_point(&self, p: Point2D) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}

	/// Grow the bounds symmetrically by a scalar on all sides.
	pub fn expand_scalar(&self, amount: f64) -> Bounds {
		Bounds::new(Point2D::new(self.min.x - amount, self.min.y - amount), Point2D::new(self.max.x + amount, self.max.y + amount))
	}

	pub fn expand_point(&self, p: Point2D) -> Bounds {
		self.union(&Bounds::new(p, p))
	}
}

/// A concrete shape value. Every variant implements the same capability set
/// via the free functions below; the enum exists so that operations which
/// can change a shape's kind (non-uniform transforms, decomposition) have a
/// common return type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape2D {
	Point(Point2D),
	Line(Line2D),
	PolyLine(PolyLine2D),
	Polygon(Polygon),
	Arc(Arc),
	Rect(Rect),
	Circle(Circle),
	Ellipse(Ellipse),
	Bezier(BezierPath),
	Region(Region),
	SpurGear(Gear),
}

impl Shape2D {
	pub fn kind(&self) -> ShapeKind {
		match self {
			Shape2D::Point(_) => ShapeKind::Point,
			Shape2D::Line(_) => ShapeKind::Line,
			Shape2D::PolyLine(_) => ShapeKind::PolyLine,
			Shape2D::Polygon(_) => ShapeKind::Polygon,
			Shape2D::Arc(_) => ShapeKind::Arc,
			Shape2D::Rect(_) => ShapeKind::Rect,
			Shape2D::Circle(_) => ShapeKind::Circle,
			Shape2D::Ellipse(_) => ShapeKind::Ellipse,
			Shape2D::Bezier(_) => ShapeKind::Bezier,
			Shape2D::Region(_) => ShapeKind::Region,
			Shape2D::SpurGear(_) => ShapeKind::SpurGear,
		}
	}

	pub fn bounds(&self) -> Bounds {
		match self {
			Shape2D::Point(p) => Bounds::new(*p, *p),
			Shape2D::Line(l) => l.bounds(),
			Shape2D::PolyLine(pl) => pl.bounds(),
			Shape2D::Polygon(p) => p.bounds(),
			Shape2D::Arc(a) => a.bounds(),
			Shape2D::Rect(r) => r.bounds(),
			Shape2D::Circle(c) => c.bounds(),
			Shape2D::Ellipse(e) => e.bounds(),
			Shape2D::Bezier(b) => b.bounds(),
			Shape2D::Region(r) => r.bounds(),
			Shape2D::SpurGear(g) => g.bounds(),
		}
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		match self {
			Shape2D::Point(p) => p.distance_to(point) <= tol,
			Shape2D::Line(l) => l.contains(point, tol),
			Shape2D::PolyLine(pl) => pl.contains(point, tol),
			Shape2D::Polygon(p) => p.contains(point, tol),
			Shape2D::Arc(a) => a.contains(point, tol),
			Shape2D::Rect(r) => r.contains(point, tol),
			Shape2D::Circle(c) => c.contains(point, tol),
			Shape2D::Ellipse(e) => e.contains(point, tol),
			Shape2D::Bezier(b) => b.contains(point, tol),
			Shape2D::Region(r) => r.contains(point, tol),
			Shape2D::SpurGear(g) => g.contains(point, tol),
		}
	}

	pub fn translate(&self, offset: Point2D) -> Shape2D {
		match self {
			Shape2D::Point(p) => Shape2D::Point(p.translate(offset)),
			Shape2D::Line(l) => Shape2D::Line(l.translate(offset)),
			Shape2D::PolyLine(pl) => Shape2D::PolyLine(pl.translate(offset)),
			Shape2D::Polygon(p) => Shape2D::Polygon(p.translate(offset)),
			Shape2D::Arc(a) => Shape2D::Arc(a.translate(offset)),
			Shape2D::Rect(r) => Shape2D::Rect(r.translate(offset)),
			Shape2D::Circle(c) => Shape2D::Circle(c.translate(offset)),
			Shape2D::Ellipse(e) => Shape2D::Ellipse(e.translate(offset)),
			Shape2D::Bezier(b) => Shape2D::Bezier(b.translate(offset)),
			Shape2D::Region(r) => Shape2D::Region(r.translate(offset)),
			Shape2D::SpurGear(g) => Shape2D::SpurGear(g.translate(offset)),
		}
	}

	pub fn rotate(&self, angle_radians: f64, center: Point2D) -> Shape2D {
		match self {
			Shape2D::Point(p) => Shape2D::Point(p.rotate(angle_radians, center)),
			Shape2D::Line(l) => Shape2D::Line(l.rotate(angle_radians, center)),
			Shape2D::PolyLine(pl) => Shape2D::PolyLine(pl.rotate(angle_radians, center)),
			Shape2D::Polygon(p) => Shape2D::Polygon(p.rotate(angle_radians, center)),
			Shape2D::Arc(a) => Shape2D::Arc(a.rotate(angle_radians, center)),
			Shape2D::Rect(r) => r.rotate(angle_radians, center),
			Shape2D::Circle(c) => Shape2D::Circle(c.rotate(angle_radians, center)),
			Shape2D::Ellipse(e) => Shape2D::Ellipse(e.rotate(angle_radians, center)),
			Shape2D::Bezier(b) => Shape2D::Bezier(b.rotate(angle_radians, center)),
			Shape2D::Region(r) => Shape2D::Region(r.rotate(angle_radians, center)),
			Shape2D::SpurGear(g) => Shape2D::SpurGear(g.rotate(angle_radians, center)),
		}
	}

	/// Non-uniform `factor` may upgrade the shape's kind (Circle -> Ellipse,
	/// Rect -> Polygon, Arc -> BezierPath).
	pub fn scale(&self, factor: Point2D, center: Point2D) -> Shape2D {
		match self {
			Shape2D::Point(p) => Shape2D::Point(p.scale(factor, center)),
			Shape2D::Line(l) => Shape2D::Line(l.scale(factor, center)),
			Shape2D::PolyLine(pl) => Shape2D::PolyLine(pl.scale(factor, center)),
			Shape2D::Polygon(p) => Shape2D::Polygon(p.scale(factor, center)),
			Shape2D::Arc(a) => a.scale(factor, center),
			Shape2D::Rect(r) => r.scale(factor, center),
			Shape2D::Circle(c) => c.scale(factor, center),
			Shape2D::Ellipse(e) => Shape2D::Ellipse(e.scale(factor, center)),
			Shape2D::Bezier(b) => Shape2D::Bezier(b.scale(factor, center)),
			Shape2D::Region(r) => Shape2D::Region(r.scale(factor, center)),
			Shape2D::SpurGear(g) => g.scale(factor, center),
		}
	}

	/// Arbitrary transform; always returns the supertype since any shape
	/// family can be upgraded by a general (non-similarity) transform.
	pub fn transform(&self, t: &Transform2D) -> Shape2D {
		match self {
			Shape2D::Point(p) => Shape2D::Point(p.transform(t)),
			Shape2D::Line(l) => Shape2D::Line(l.transform(t)),
			Shape2D::PolyLine(pl) => Shape2D::PolyLine(pl.transform(t)),
			Shape2D::Polygon(p) => Shape2D::Polygon(p.transform(t)),
			Shape2D::Arc(a) => a.transform(t),
			Shape2D::Rect(r) => r.transform(t),
			Shape2D::Circle(c) => c.transform(t),
			Shape2D::Ellipse(e) => Shape2D::Ellipse(e.transform(t)),
			Shape2D::Bezier(b) => Shape2D::Bezier(b.transform(t)),
			Shape2D::Region(r) => Shape2D::Region(r.transform(t)),
			Shape2D::SpurGear(g) => g.transform(t),
		}
	}

	/// Approximate this shape with a list of shapes of the requested
	/// `kinds`, each within `tol` of the original. Fails with
	/// `UnsupportedDecomposition` if no path exists.
	pub fn decompose(&self, kinds: &[ShapeKind], tol: f64) -> CadResult<Vec<Shape2D>> {
		match self {
			Shape2D::Point(p) => point::decompose(*p, kinds),
			Shape2D::Line(l) => l.decompose(kinds, tol),
			Shape2D::PolyLine(pl) => pl.decompose(kinds, tol),
			Shape2D::Polygon(p) => p.decompose(kinds, tol),
			Shape2D::Arc(a) => a.decompose(kinds, tol),
			Shape2D::Rect(r) => r.decompose(kinds, tol),
			Shape2D::Circle(c) => c.decompose(kinds, tol),
			Shape2D::Ellipse(e) => e.decompose(kinds, tol),
			Shape2D::Bezier(b) => b.decompose(kinds, tol),
			Shape2D::Region(r) => r.decompose(kinds, tol),
			Shape2D::SpurGear(g) => g.decompose(kinds, tol),
		}
	}
}

impl crate::constraint::Constraints for Shape2D {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		match self {
			Shape2D::Point(p) => crate::constraint::Constraints::make_constrainables(p),
			Shape2D::Line(l) => l.make_constrainables(),
			Shape2D::PolyLine(pl) => pl.make_constrainables(),
			Shape2D::Polygon(p) => p.make_constrainables(),
			Shape2D::Arc(a) => a.make_constrainables(),
			Shape2D::Rect(r) => r.make_constrainables(),
			Shape2D::Circle(c) => c.make_constrainables(),
			Shape2D::Ellipse(e) => e.make_constrainables(),
			Shape2D::Bezier(b) => b.make_constrainables(),
			Shape2D::Region(r) => r.make_constrainables(),
			Shape2D::SpurGear(g) => g.make_constrainables(),
		}
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		match self {
			Shape2D::Point(p) => Shape2D::Point(crate::constraint::Constraints::update_from_solved_constraints(p, bag)),
			Shape2D::Line(l) => Shape2D::Line(l.update_from_solved_constraints(bag)),
			Shape2D::PolyLine(pl) => Shape2D::PolyLine(pl.update_from_solved_constraints(bag)),
			Shape2D::Polygon(p) => Shape2D::Polygon(p.update_from_solved_constraints(bag)),
			Shape2D::Arc(a) => Shape2D::Arc(a.update_from_solved_constraints(bag)),
			Shape2D::Rect(r) => Shape2D::Rect(r.update_from_solved_constraints(bag)),
			Shape2D::Circle(c) => Shape2D::Circle(c.update_from_solved_constraints(bag)),
			Shape2D::Ellipse(e) => Shape2D::Ellipse(e.update_from_solved_constraints(bag)),
			Shape2D::Bezier(b) => Shape2D::Bezier(b.update_from_solved_constraints(bag)),
			Shape2D::Region(r) => Shape2D::Region(r.update_from_solved_constraints(bag)),
			Shape2D::SpurGear(g) => Shape2D::SpurGear(g.update_from_solved_constraints(bag)),
		}
	}
}

fn unsupported_decomposition(kinds: &[ShapeKind]) -> crate::error::CadError {
	crate::error::CadError::UnsupportedDecomposition {
		requested: kinds.iter().map(|k| format!("{k:?}")).collect(),
	}
}

pub(crate) use unsupported_decomposition as decomposition_error;
