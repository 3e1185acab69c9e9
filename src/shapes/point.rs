//! Point decomposition. `Point2D` itself lives in
//! [`crate::vector`]; this module only adds the capability-set method that
//! needs to know about [`Shape2D`](super::Shape2D).

use super::{Shape2D, ShapeKind};
use crate::error::CadResult;
use crate::vector::Point2D;

pub(super) fn decompose(point: Point2D, kinds: &[ShapeKind]) -> CadResult<Vec<Shape2D>> {
	if kinds.contains(&ShapeKind::Point) {
		Ok(vec![Shape2D::Point(point)])
	} else {
		Err(super::decomposition_error(kinds))
	}
}
