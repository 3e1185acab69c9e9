//! Named tolerances and scale factors used throughout the kernel.
//!
//! Centralized here so that tuning never requires ripple edits across shape
//! implementations (see DESIGN.md).

/// Absolute tolerance used for point/scalar equality and determinant checks.
pub const EPSILON: f64 = 1e-10;

/// Integer-coordinate scale factor fed to the polygon clipper for boolean
/// and offset operations on [`crate::shapes::Region`].
pub const CLIPPER_SCALE_BOOLEAN: f64 = 10_000.0;

/// Precision headroom Minkowski sum/difference would need over plain
/// booleans if they were routed through the clipper. Unused: the clipper
/// backend has no native Minkowski primitive, so `minkowski_sum`/`minkowski_diff`
/// build the result via convex decomposition instead (see
/// [`crate::boolean::minkowski_sum_convex_decomposition`] and DESIGN.md).
/// Kept for callers tuning a future clipper-backed implementation.
pub const CLIPPER_SCALE_MINKOWSKI: f64 = 1_000_000.0;

/// Default sample count used when a non-uniform transform or scale upgrades
/// an [`crate::shapes::Arc`] into a [`crate::shapes::BezierPath`].
pub const ARC_TRANSFORM_SAMPLES: usize = 36;

/// Default sample count used for the construction pitch circle of a
/// [`crate::shapes::Gear`].
pub const GEAR_PITCH_CIRCLE_SEGMENTS: usize = 64;

/// Default maximum chordal deviation from the true involute profile,
/// expressed as a fraction of the pitch radius.
pub const GEAR_INVOLUTE_TOLERANCE_FRACTION: f64 = 0.001;

/// Number of coarse samples used before Newton refinement in
/// `closest_point_to` queries against curved shapes.
pub const NEWTON_COARSE_SAMPLES: usize = 16;

/// Maximum number of Newton iterations used by bounded root refinement.
pub const NEWTON_MAX_ITERATIONS: usize = 20;

/// Maximum Newton iterations used specifically by `Ellipse::closest_point_to`.
pub const ELLIPSE_NEWTON_MAX_ITERATIONS: usize = 5;

/// Default number of samples used when flattening an [`crate::shapes::Arc`]
/// into a polyline/polygon approximation.
pub const DEFAULT_ARC_SEGMENTS: usize = 32;

/// Default flattening tolerance the presentation bridge uses when a
/// ViewModel decomposes a shape into renderable line/arc/polygon
/// primitives for its "view" role.
pub const DEFAULT_VIEW_FLATTEN_TOLERANCE: f64 = 0.01;

/// Default decimal precision used for a control datum's format string when
/// the unit/precision service has not overridden it.
pub const DEFAULT_DATUM_PRECISION: usize = 3;
