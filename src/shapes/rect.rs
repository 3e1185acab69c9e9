//! Axis-aligned rectangle.

use super::{Bounds, Polygon, Shape2D, ShapeKind};
use crate::consts::EPSILON;
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `(left, bottom, width >= 0, height >= 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
	pub left: f64,
	pub bottom: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(left: f64, bottom: f64, width: f64, height: f64) -> CadResult<Self> {
		if width < 0.0 || height < 0.0 {
			return Err(CadError::Domain("rect width and height must be non-negative".into()));
		}
		Ok(Self { left, bottom, width, height })
	}

	pub fn from_corners(a: Point2D, b: Point2D) -> Self {
		let left = a.x.min(b.x);
		let bottom = a.y.min(b.y);
		Self { left, bottom, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
	}

	pub fn right(&self) -> f64 {
		self.left + self.width
	}

	pub fn top(&self) -> f64 {
		self.bottom + self.height
	}

	pub fn center(&self) -> Point2D {
		Point2D::new(self.left + self.width * 0.5, self.bottom + self.height * 0.5)
	}

	pub fn corners(&self) -> [Point2D; 4] {
		[
			Point2D::new(self.left, self.bottom),
			Point2D::new(self.right(), self.bottom),
			Point2D::new(self.right(), self.top()),
			Point2D::new(self.left, self.top()),
		]
	}

	pub fn bounds(&self) -> Bounds {
		Bounds::new(Point2D::new(self.left, self.bottom), Point2D::new(self.right(), self.top()))
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		point.x >= self.left - tol && point.x <= self.right() + tol && point.y >= self.bottom - tol && point.y <= self.top() + tol
	}

	pub fn translate(&self, offset: Point2D) -> Rect {
		Rect { left: self.left + offset.x, bottom: self.bottom + offset.y, ..*self }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Shape2D {
		if angle.abs() <= EPSILON {
			return Shape2D::Rect(*self);
		}
		Shape2D::Polygon(Polygon::new(self.corners().iter().map(|p| p.rotate(angle, center)).collect()).expect("rect always has 4 corners"))
	}

	/// Uniform scaling stays a `Rect`; non-uniform scaling upgrades to a
	/// `Polygon` since the corners no longer form an axis-aligned box.
	pub fn scale(&self, factor: Point2D, center: Point2D) -> Shape2D {
		if (factor.x - factor.y).abs() <= EPSILON {
			let new_corners = self.corners().map(|p| p.scale(factor, center));
			return Shape2D::Rect(Rect::from_corners(new_corners[0], new_corners[2]));
		}
		Shape2D::Polygon(Polygon::new(self.corners().iter().map(|p| p.scale(factor, center)).collect()).expect("rect always has 4 corners"))
	}

	/// Any general transform upgrades to `Polygon`.
	pub fn transform(&self, t: &Transform2D) -> Shape2D {
		Shape2D::Polygon(Polygon::new(t.apply_many(&self.corners())).expect("rect always has 4 corners"))
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::Rect) {
			return Ok(vec![Shape2D::Rect(*self)]);
		}
		if kinds.contains(&ShapeKind::Polygon) {
			return Ok(vec![Shape2D::Polygon(self.to_polygon())]);
		}
		if kinds.contains(&ShapeKind::Line) {
			return Ok(self.to_polygon().edges().map(Shape2D::Line).collect());
		}
		Err(super::decomposition_error(kinds))
	}

	pub fn to_polygon(&self) -> Polygon {
		Polygon::new(self.corners().to_vec()).expect("rect always has 4 corners")
	}

	/// Grow symmetrically by a scalar.
	pub fn expand_scalar(&self, amount: f64) -> Rect {
		Rect { left: self.left - amount, bottom: self.bottom - amount, width: (self.width + 2.0 * amount).max(0.0), height: (self.height + 2.0 * amount).max(0.0) }
	}

	/// Grow to include a point.
	pub fn expand_point(&self, p: Point2D) -> Rect {
		let bounds = self.bounds().expand_point(p);
		Rect::from_corners(bounds.min, bounds.max)
	}

	/// Grow to include another rect.
	pub fn expand_rect(&self, other: &Rect) -> Rect {
		let bounds = self.bounds().union(&other.bounds());
		Rect::from_corners(bounds.min, bounds.max)
	}

	/// Grow to include any object exposing bounds.
	pub fn expand_bounds(&self, other: &Bounds) -> Rect {
		let bounds = self.bounds().union(other);
		Rect::from_corners(bounds.min, bounds.max)
	}
}

impl crate::constraint::Constraints for Rect {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![
			crate::constraint::Constrainable::point("origin", Point2D::new(self.left, self.bottom)),
			crate::constraint::Constrainable::scalar("width", self.width),
			crate::constraint::Constrainable::scalar("height", self.height),
		]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut left = self.left;
		let mut bottom = self.bottom;
		let mut width = self.width;
		let mut height = self.height;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("origin") {
			left = p.x;
			bottom = p.y;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("width") {
			width = *v;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("height") {
			height = *v;
		}
		Rect::new(left, bottom, width.max(0.0), height.max(0.0)).unwrap_or(*self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn uniform_scale_stays_rect() {
		let r = Rect::new(0.0, 0.0, 4.0, 2.0).unwrap();
		match r.scale(Point2D::new(2.0, 2.0), Point2D::ZERO) {
			Shape2D::Rect(scaled) => {
				assert_eq!(scaled.width, 8.0);
				assert_eq!(scaled.height, 4.0);
			}
			other => panic!("expected Rect, got {other:?}"),
		}
	}

	#[test]
	fn non_uniform_scale_upgrades_to_polygon() {
		let r = Rect::new(0.0, 0.0, 4.0, 2.0).unwrap();
		assert!(matches!(r.scale(Point2D::new(2.0, 1.0), Point2D::ZERO), Shape2D::Polygon(_)));
	}

	#[test]
	fn rotation_upgrades_to_polygon() {
		let r = Rect::new(0.0, 0.0, 4.0, 2.0).unwrap();
		assert!(matches!(r.rotate(0.3, Point2D::ZERO), Shape2D::Polygon(_)));
	}

	#[test]
	fn expand_scalar_grows_symmetrically() {
		let r = Rect::new(0.0, 0.0, 4.0, 2.0).unwrap();
		let grown = r.expand_scalar(1.0);
		assert_eq!(grown.left, -1.0);
		assert_eq!(grown.width, 6.0);
	}
}
