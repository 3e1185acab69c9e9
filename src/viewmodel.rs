//! Presentation bridge: the ViewModel contract.
//!
//! A `ViewModel` mediates between one [`CadObject`] and a rendering/control
//! surface. It holds only a read-only reference to the object; it never
//! mutates it directly. Guarded
//! setters instead compute and return the *next* shape value plus the
//! signals that value change would emit; the caller (ultimately a
//! [`Document`](crate::object::Document)) is the one that applies it via
//! [`Document::set_shape`](crate::object::Document::set_shape). This keeps
//! "drag a control point" and "call a setter programmatically" the same
//! path, since both route through [`ViewModel::set_control_point`] /
//! [`ViewModel::set_datum`].
//!
//! Control points and control data are derived from the same named
//! constrainables the constraint bridge (`crate::constraint`) already
//! exposes: a `Point` constrainable becomes a control point, a `Scalar`
//! constrainable becomes a control datum. This keeps the two presentation
//! surfaces and the solver bridge bound to one naming source of truth.

use crate::consts::{DEFAULT_DATUM_PRECISION, EPSILON};
use crate::constraint::{ConstrainableValue, Constraints, SolverBag};
use crate::error::{CadError, CadResult};
use crate::object::{CadObject, CadObjectId};
use crate::shapes::{Bounds, Shape2D, ShapeKind};
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};

/// Signals observed by the UI. Shape-specific signals
/// (`center_changed`, `radius_changed`, ...) are represented by the
/// `name`-carrying variants rather than one enum variant per shape
/// property, since the constrainable name is already the stable identity
/// constraint authors bind to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewModelSignal {
	/// The whole shape was translated by `offset`.
	ObjectMoved(Point2D),
	/// The object's selection flag changed.
	ObjectSelected(bool),
	/// Some parameter of the object changed; always accompanies a more
	/// specific signal, never emitted alone.
	ObjectModified,
	/// The control point set was recomputed (emitted by `update_controls`,
	/// not by an individual control point's setter).
	ControlPointsUpdated,
	/// The named point constrainable changed to a new position.
	ControlPointChanged { name: String, position: Point2D },
	/// The named scalar constrainable (a control datum) changed to a new value.
	DatumChanged { name: String, value: f64 },
}

/// The result of a guarded setter: the shape's next value plus the signals
/// that change emits. Never constructed for a no-op setter call.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOutcome {
	pub shape: Shape2D,
	pub signals: Vec<ViewModelSignal>,
}

/// Which physical quantity a control datum measures; drives how the unit
/// and precision service formats its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatumUnit {
	Length,
	Angle,
	Count,
	Unitless,
}

/// A positional UI handle tied to one named point on a shape. Dragging it
/// to `position` and invoking `set` routes through
/// exactly the same guarded setter a programmatic edit would use: the
/// closure re-enters [`ViewModel::set_control_point`] over a snapshot of
/// the owning shape, the same call a programmatic edit makes.
pub struct ControlPoint {
	pub name: String,
	pub position: Point2D,
	shape: Shape2D,
}

impl ControlPoint {
	/// Invoke this control point's setter with a new position. Returns
	/// `None` if `position` is within `EPSILON` of the current value (no
	/// signals emitted for a no-op move).
	pub fn set(&self, position: Point2D) -> Option<SetOutcome> {
		ViewModel::set_control_point_on(&self.shape, &self.name, position)
	}
}

/// A dimensional UI handle (radius, length, angle, tooth count) tied to one
/// named scalar on a shape.
pub struct ControlDatum {
	pub name: String,
	pub label: String,
	pub value: f64,
	pub format_string: String,
	pub precision: usize,
	pub unit: DatumUnit,
	pub bounds: Option<(f64, f64)>,
	shape: Shape2D,
}

impl ControlDatum {
	/// Invoke this datum's setter. Rejects a value outside `bounds` with
	/// `CadError::OutOfRange` and performs no mutation; the
	/// presentation bridge is expected to render an "Out of Range"
	/// indicator rather than clamp silently.
	pub fn set(&self, value: f64) -> CadResult<Option<SetOutcome>> {
		ViewModel::set_datum_on(&self.shape, &self.name, value)
	}
}

/// Axis-aligned construction primitives, arcs, polygons, and text the
/// ViewModel emits for its "view", "decoration", and "control" roles. The
/// kernel defines what primitives exist for a shape; how they are drawn
/// (pens, brushes, Z-order) is the render surface's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderPrimitive {
	Line { start: Point2D, end: Point2D },
	Arc { center: Point2D, radius: f64, start_angle: f64, span_angle: f64 },
	Polygon { points: Vec<Point2D> },
	Text { position: Point2D, content: String },
	SelectionOutline { points: Vec<Point2D> },
}

/// Wraps one [`CadObject`] and exposes the presentation-bridge contract.
/// Holds only a read-only reference; every mutation is expressed as a
/// `SetOutcome` the caller applies to the owning `Document`.
pub struct ViewModel<'a> {
	object: &'a CadObject,
}

impl<'a> ViewModel<'a> {
	pub fn new(object: &'a CadObject) -> Self {
		Self { object }
	}

	pub fn object(&self) -> &CadObject {
		self.object
	}

	pub fn id(&self) -> CadObjectId {
		self.object.id
	}

	/// `update_view`: the renderable geometry for this shape's "view" role,
	/// decomposed into lines/arcs/polygons within the default flattening
	/// tolerance.
	pub fn update_view(&self) -> Vec<RenderPrimitive> {
		shape_to_primitives(&self.object.shape, crate::consts::DEFAULT_VIEW_FLATTEN_TOLERANCE)
	}

	/// `show_decorations` / `update_decorations`: a construction cross at
	/// the shape's bounds center, sized relative to the bounds diagonal.
	pub fn show_decorations(&self) -> Vec<RenderPrimitive> {
		let bounds = self.object.shape.bounds();
		let center = Point2D::new((bounds.min.x + bounds.max.x) * 0.5, (bounds.min.y + bounds.max.y) * 0.5);
		let half = (bounds.width().max(bounds.height()).max(EPSILON)) * 0.1;
		vec![
			RenderPrimitive::Line { start: Point2D::new(center.x - half, center.y), end: Point2D::new(center.x + half, center.y) },
			RenderPrimitive::Line { start: Point2D::new(center.x, center.y - half), end: Point2D::new(center.x, center.y + half) },
		]
	}

	/// `hide_decorations`: nothing to draw; the caller removes whatever
	/// `show_decorations` previously produced.
	pub fn hide_decorations(&self) -> Vec<RenderPrimitive> {
		Vec::new()
	}

	/// `show_controls` / `update_controls`: the stable-order control point
	/// and control datum sets for this shape, derived from its
	/// constrainables.
	pub fn show_controls(&self) -> (Vec<ControlPoint>, Vec<ControlDatum>) {
		let mut points = Vec::new();
		let mut data = Vec::new();
		for c in self.object.shape.make_constrainables() {
			match c.value {
				ConstrainableValue::Point(position) => points.push(ControlPoint { name: c.name, position, shape: self.object.shape.clone() }),
				ConstrainableValue::Scalar(value) => data.push(datum_from_constrainable(&c.name, value, self.object.shape.clone())),
			}
		}
		(points, data)
	}

	pub fn hide_controls(&self) -> (Vec<ControlPoint>, Vec<ControlDatum>) {
		(Vec::new(), Vec::new())
	}

	/// Move the whole shape by `offset`; emits `object_moved` plus
	/// `object_modified` unless `offset` is (within tolerance) zero.
	pub fn move_by(&self, offset: Point2D) -> Option<SetOutcome> {
		if offset.magnitude() <= EPSILON {
			return None;
		}
		Some(SetOutcome { shape: self.object.shape.translate(offset), signals: vec![ViewModelSignal::ObjectMoved(offset), ViewModelSignal::ObjectModified] })
	}

	/// Guarded setter backing every control point's `set`. Looks up the
	/// constrainable's current value, compares against `position`, and
	/// (if different) re-enters the shape's `update_from_solved_constraints`
	/// hook with a bag containing just this one point — the exact same
	/// path a constraint solve uses to write values back.
	pub fn set_control_point(&self, name: &str, position: Point2D) -> Option<SetOutcome> {
		Self::set_control_point_on(&self.object.shape, name, position)
	}

	/// Guarded setter backing every control datum's `set`. Rejects values
	/// outside the datum's declared bounds without mutating.
	pub fn set_datum(&self, name: &str, value: f64) -> CadResult<Option<SetOutcome>> {
		Self::set_datum_on(&self.object.shape, name, value)
	}

	fn set_control_point_on(shape: &Shape2D, name: &str, position: Point2D) -> Option<SetOutcome> {
		let current = shape.make_constrainables().into_iter().find(|c| c.name == name).and_then(|c| match c.value {
			ConstrainableValue::Point(p) => Some(p),
			ConstrainableValue::Scalar(_) => None,
		})?;
		if current.distance_to(position) <= EPSILON {
			return None;
		}
		let mut bag = SolverBag::new();
		bag.update_values(name, ConstrainableValue::Point(position));
		let next = shape.update_from_solved_constraints(&bag);
		Some(SetOutcome { shape: next, signals: vec![ViewModelSignal::ControlPointChanged { name: name.to_string(), position }, ViewModelSignal::ObjectModified] })
	}

	fn set_datum_on(shape: &Shape2D, name: &str, value: f64) -> CadResult<Option<SetOutcome>> {
		let current = shape.make_constrainables().into_iter().find(|c| c.name == name).and_then(|c| match c.value {
			ConstrainableValue::Scalar(v) => Some(v),
			ConstrainableValue::Point(_) => None,
		});
		let Some(current) = current else { return Ok(None) };
		if let Some((min, max)) = bounds_for_datum(name) {
			if value < min || value > max {
				return Err(CadError::OutOfRange { value, min, max });
			}
		}
		if (current - value).abs() <= EPSILON {
			return Ok(None);
		}
		let mut bag = SolverBag::new();
		bag.update_values(name, ConstrainableValue::Scalar(value));
		let next = shape.update_from_solved_constraints(&bag);
		Ok(Some(SetOutcome { shape: next, signals: vec![ViewModelSignal::DatumChanged { name: name.to_string(), value }, ViewModelSignal::ObjectModified] }))
	}
}

/// Unified selection rule: controls are visible for `object` iff it is the
/// sole member of `selection`.
pub fn controls_visible(selection: &[CadObjectId], object: CadObjectId) -> bool {
	selection.len() == 1 && selection[0] == object
}

fn unit_for_datum(name: &str) -> DatumUnit {
	if name.contains("angle") {
		DatumUnit::Angle
	} else if name.contains("teeth") || name.contains("count") {
		DatumUnit::Count
	} else if matches!(name, "pressure_angle") {
		DatumUnit::Angle
	} else {
		DatumUnit::Length
	}
}

fn bounds_for_datum(name: &str) -> Option<(f64, f64)> {
	match unit_for_datum(name) {
		DatumUnit::Length => Some((0.0, f64::INFINITY)),
		DatumUnit::Count => Some((5.0, f64::INFINITY)),
		DatumUnit::Angle | DatumUnit::Unitless => None,
	}
}

fn datum_from_constrainable(name: &str, value: f64, shape: Shape2D) -> ControlDatum {
	let unit = unit_for_datum(name);
	let label = name.replace('_', " ");
	ControlDatum {
		name: name.to_string(),
		label,
		value,
		format_string: format!("{{:.{DEFAULT_DATUM_PRECISION}f}}"),
		precision: DEFAULT_DATUM_PRECISION,
		unit,
		bounds: bounds_for_datum(name),
		shape,
	}
}

/// Decompose `shape` into renderable line/arc/polygon primitives. Falls
/// back to the shape's bounding box when no decomposition path exists
/// (e.g. a bare `Point`, which only decomposes to itself).
fn shape_to_primitives(shape: &Shape2D, tol: f64) -> Vec<RenderPrimitive> {
	if let Shape2D::Point(p) = shape {
		let half = tol.max(EPSILON) * 4.0;
		return vec![
			RenderPrimitive::Line { start: Point2D::new(p.x - half, p.y), end: Point2D::new(p.x + half, p.y) },
			RenderPrimitive::Line { start: Point2D::new(p.x, p.y - half), end: Point2D::new(p.x, p.y + half) },
		];
	}
	match shape.decompose(&[ShapeKind::Line, ShapeKind::Arc, ShapeKind::Polygon], tol) {
		Ok(parts) => parts.iter().filter_map(primitive_from_flat_shape).collect(),
		Err(_) => bounds_outline(shape.bounds()),
	}
}

fn primitive_from_flat_shape(shape: &Shape2D) -> Option<RenderPrimitive> {
	match shape {
		Shape2D::Line(l) => Some(RenderPrimitive::Line { start: l.start, end: l.end }),
		Shape2D::Arc(a) => Some(RenderPrimitive::Arc { center: a.center, radius: a.radius, start_angle: a.start_angle, span_angle: a.span_angle }),
		Shape2D::Polygon(p) => Some(RenderPrimitive::Polygon { points: p.points().to_vec() }),
		_ => None,
	}
}

fn bounds_outline(bounds: Bounds) -> Vec<RenderPrimitive> {
	vec![RenderPrimitive::Polygon { points: vec![bounds.min, Point2D::new(bounds.max.x, bounds.min.y), bounds.max, Point2D::new(bounds.min.x, bounds.max.y)] }]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::CadObject;
	use crate::shapes::Circle;

	fn circle_object() -> CadObject {
		CadObject::new(CadObjectId(0), Shape2D::Circle(Circle::new(Point2D::ZERO, 5.0).unwrap()))
	}

	#[test]
	fn setter_with_unchanged_value_emits_no_signals() {
		let object = circle_object();
		let vm = ViewModel::new(&object);
		assert!(vm.set_control_point("center", Point2D::ZERO).is_none());
		assert!(vm.set_datum("radius", 5.0).unwrap().is_none());
	}

	#[test]
	fn setter_with_changed_value_emits_exactly_one_specific_signal_and_object_modified() {
		let object = circle_object();
		let vm = ViewModel::new(&object);
		let outcome = vm.set_datum("radius", 8.0).unwrap().unwrap();
		assert_eq!(outcome.signals.len(), 2);
		assert_eq!(outcome.signals[0], ViewModelSignal::DatumChanged { name: "radius".into(), value: 8.0 });
		assert_eq!(outcome.signals[1], ViewModelSignal::ObjectModified);
		match outcome.shape {
			Shape2D::Circle(c) => assert_eq!(c.radius, 8.0),
			other => panic!("expected Circle, got {other:?}"),
		}
	}

	#[test]
	fn datum_setter_rejects_out_of_range_without_mutating() {
		let object = circle_object();
		let vm = ViewModel::new(&object);
		let err = vm.set_datum("radius", -1.0).unwrap_err();
		assert!(matches!(err, CadError::OutOfRange { .. }));
	}

	#[test]
	fn control_point_setter_moves_center() {
		let object = circle_object();
		let vm = ViewModel::new(&object);
		let outcome = vm.set_control_point("center", Point2D::new(1.0, 1.0)).unwrap();
		match outcome.shape {
			Shape2D::Circle(c) => assert_eq!(c.center, Point2D::new(1.0, 1.0)),
			other => panic!("expected Circle, got {other:?}"),
		}
	}

	#[test]
	fn unified_selection_rule_shows_controls_only_for_sole_selection() {
		let a = CadObjectId(0);
		let b = CadObjectId(1);
		assert!(controls_visible(&[a], a));
		assert!(!controls_visible(&[a, b], a));
		assert!(!controls_visible(&[], a));
	}

	#[test]
	fn show_controls_returns_center_and_radius() {
		let object = circle_object();
		let vm = ViewModel::new(&object);
		let (points, data) = vm.show_controls();
		assert_eq!(points.len(), 1);
		assert_eq!(points[0].name, "center");
		assert_eq!(data.len(), 1);
		assert_eq!(data[0].name, "radius");
	}
}
