//! 2D CAD geometry kernel.
//!
//! A pure-math core that models, transforms, measures, intersects, and
//! boolean-combines 2D shapes, and exposes them to a constraint layer and a
//! presentation layer through stable contracts. Window/dock/menu plumbing,
//! scene-graph rendering, undo/redo command plumbing, file import/export,
//! and input-driven tool state machines all live outside this crate.

#[macro_use]
extern crate log;

/// Thin adapter over the integer-coordinate polygon clipper used by
/// [`shapes::Polygon`] and [`shapes::Region`] for boolean and offset ops.
pub mod boolean;
/// The constraint bridge: named constrainable scalars/points per shape.
pub mod constraint;
/// Named tolerances and scale factors used throughout the kernel.
pub mod consts;
/// Errors surfaced by the shape algebra.
pub mod error;
/// Document-level ownership: `CadObject` and the object table.
pub mod object;
/// The closed family of 2D shape primitives.
pub mod shapes;
/// 2D affine transform.
pub mod transform;
/// 2D point/vector primitive.
pub mod vector;
/// The presentation bridge: the ViewModel contract.
pub mod viewmodel;

pub use error::{CadError, CadResult};
pub use object::{CadObject, CadObjectId, Document, Style};
pub use shapes::{Bounds, Shape2D, ShapeKind};
pub use transform::Transform2D;
pub use vector::Point2D;
