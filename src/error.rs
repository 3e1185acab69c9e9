//! Error kinds surfaced by the shape algebra.
//!
//! Domain errors and degenerate inputs are never swallowed internally; they
//! propagate to the caller via [`CadResult`]. The one exception is
//! [`Region`](crate::shapes::Region) hole containment, which is a warning by
//! design (see DESIGN.md open question #1).

use thiserror::Error;

/// The error type used by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CadError {
	/// Invalid construction: non-positive radius, `major < minor`, fewer
	/// than the minimum required points, or a zero-component division.
	#[error("invalid shape construction: {0}")]
	Domain(String),

	/// Collinear points where a circle fit was requested, or parallel lines
	/// where a unique intersection was required.
	#[error("degenerate input: {0}")]
	DegenerateInput(String),

	/// `inverse()` was requested on a transform whose linear block has
	/// |determinant| <= EPSILON.
	#[error("transform is not invertible (|det| <= epsilon)")]
	SingularTransform,

	/// `decompose(into, ..)` cannot produce any of the requested kinds.
	#[error("cannot decompose shape into any of the requested kinds: {requested:?}")]
	UnsupportedDecomposition {
		/// The kinds that were requested and could not be produced.
		requested: Vec<String>,
	},

	/// `add_vertex_at_point` was given a point farther than `tol` from every
	/// edge of the perimeter.
	#[error("point is farther than {tolerance} from every edge")]
	NotOnPerimeter {
		/// The tolerance the caller supplied.
		tolerance: f64,
	},

	/// A control-datum setter rejected a value outside its declared bounds.
	#[error("value {value} is outside the allowed range [{min}, {max}]")]
	OutOfRange {
		/// The rejected value.
		value: f64,
		/// Declared lower bound.
		min: f64,
		/// Declared upper bound.
		max: f64,
	},
}

/// Convenience alias used throughout the crate.
pub type CadResult<T> = Result<T, CadError>;
