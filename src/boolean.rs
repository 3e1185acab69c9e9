//! Boolean & offset engine.
//!
//! A thin adapter over `geo-clipper`'s integer-coordinate polygon clipper.
//! The clipper is an external collaborator; this module owns the scaling
//! and the orientation-based ring classification (CCW = perimeter, CW =
//! hole) on the way back out.

use crate::consts::{CLIPPER_SCALE_BOOLEAN, EPSILON};
use crate::shapes::{Polygon, Region};
use crate::vector::Point2D;
use geo_clipper::Clipper;
use geo_types::{Coord, LineString, MultiPolygon, Polygon as GeoPolygon};

/// Offset join style, mirrored 1:1 onto `geo_clipper::JoinType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
	Round,
	Square,
	Miter,
}

/// Offset end style, mirrored 1:1 onto `geo_clipper::EndType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndType {
	ClosedPolygon,
	ClosedLine,
	OpenButt,
}

fn to_geo_join(j: JoinType) -> geo_clipper::JoinType {
	match j {
		JoinType::Round => geo_clipper::JoinType::Round,
		JoinType::Square => geo_clipper::JoinType::Square,
		JoinType::Miter => geo_clipper::JoinType::Miter(2.0),
	}
}

fn to_geo_end(e: EndType) -> geo_clipper::EndType {
	match e {
		EndType::ClosedPolygon => geo_clipper::EndType::ClosedPolygon,
		EndType::ClosedLine => geo_clipper::EndType::ClosedLine,
		EndType::OpenButt => geo_clipper::EndType::OpenButt,
	}
}

fn ring_from_points(points: &[Point2D]) -> LineString<f64> {
	let mut coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
	if coords.first() != coords.last() {
		coords.push(coords[0]);
	}
	LineString::new(coords)
}

fn points_from_ring(ring: &LineString<f64>) -> Vec<Point2D> {
	let coords = ring.0.as_slice();
	let n = if coords.len() > 1 && coords.first() == coords.last() { coords.len() - 1 } else { coords.len() };
	coords[..n].iter().map(|c| Point2D::new(c.x, c.y)).collect()
}

/// Region -> one `geo_types::Polygon` per perimeter, each carrying the holes
/// that fall inside it. Regions with disjoint perimeters become a
/// `MultiPolygon` with more than one element.
pub(crate) fn region_to_multipolygon(region: &Region) -> MultiPolygon<f64> {
	let polys: Vec<GeoPolygon<f64>> = region
		.perimeters()
		.iter()
		.map(|perimeter| {
			let exterior = ring_from_points(perimeter.points());
			let interiors: Vec<LineString<f64>> = region
				.holes()
				.iter()
				.filter(|hole| perimeter.contains(hole.centroid(), EPSILON))
				.map(|hole| ring_from_points(hole.points()))
				.collect();
			GeoPolygon::new(exterior, interiors)
		})
		.collect();
	MultiPolygon::new(polys)
}

pub(crate) fn polygon_to_multipolygon(polygon: &Polygon) -> MultiPolygon<f64> {
	MultiPolygon::new(vec![GeoPolygon::new(ring_from_points(polygon.points()), vec![])])
}

/// Classify every ring in `mp` by signed area (CCW positive = perimeter, CW
/// negative = hole) and reassemble a [`Region`].
pub(crate) fn multipolygon_to_region(mp: &MultiPolygon<f64>) -> Region {
	let mut perimeters = Vec::new();
	let mut holes = Vec::new();
	for poly in mp.iter() {
		let ext_points = points_from_ring(poly.exterior());
		if let Ok(p) = Polygon::new(ext_points) {
			if p.signed_area() >= 0.0 {
				perimeters.push(p);
			} else {
				holes.push(p.reversed());
			}
		}
		for interior in poly.interiors() {
			let int_points = points_from_ring(interior);
			if let Ok(p) = Polygon::new(int_points) {
				if p.signed_area() <= 0.0 {
					holes.push(p);
				} else {
					holes.push(p.reversed());
				}
			}
		}
	}
	Region::new_unchecked(perimeters, holes)
}

pub fn union(a: &Region, b: &Region) -> Region {
	let result = region_to_multipolygon(a).union(&region_to_multipolygon(b), CLIPPER_SCALE_BOOLEAN);
	multipolygon_to_region(&result)
}

pub fn difference(a: &Region, b: &Region) -> Region {
	let result = region_to_multipolygon(a).difference(&region_to_multipolygon(b), CLIPPER_SCALE_BOOLEAN);
	multipolygon_to_region(&result)
}

pub fn intersection(a: &Region, b: &Region) -> Region {
	let result = region_to_multipolygon(a).intersection(&region_to_multipolygon(b), CLIPPER_SCALE_BOOLEAN);
	multipolygon_to_region(&result)
}

pub fn xor(a: &Region, b: &Region) -> Region {
	let result = region_to_multipolygon(a).xor(&region_to_multipolygon(b), CLIPPER_SCALE_BOOLEAN);
	multipolygon_to_region(&result)
}

/// Positive `delta` outsets, negative insets.
pub fn offset(region: &Region, delta: f64, join: JoinType, end: EndType) -> Region {
	let result = region_to_multipolygon(region).offset(delta, to_geo_join(join), to_geo_end(end), CLIPPER_SCALE_BOOLEAN);
	multipolygon_to_region(&result)
}

/// `geo-clipper` has no Minkowski primitive, unlike the offset/boolean ops
/// above; see `minkowski_sum_convex_decomposition` for the decomposition
/// this falls back to instead.
pub fn minkowski_sum(a: &Polygon, b: &Polygon) -> Region {
	let sum: MultiPolygon<f64> = minkowski_sum_convex_decomposition(a, b);
	multipolygon_to_region(&sum)
}

pub fn minkowski_diff(a: &Polygon, b: &Polygon) -> Region {
	let reflected: Vec<Point2D> = b.points().iter().map(|p| Point2D::new(-p.x, -p.y)).collect();
	let reflected_poly = Polygon::new(reflected).expect("reflection preserves vertex count");
	minkowski_sum(a, &reflected_poly)
}

/// `geo-clipper` exposes boolean ops and offsets but no Minkowski primitive,
/// so this decomposes both operands into convex pieces (fan triangulation
/// from the centroid is sufficient for the star-shaped pieces produced by
/// ear clipping), computes the pairwise convex Minkowski sums directly, and
/// unions the pieces through the clipper.
fn minkowski_sum_convex_decomposition(a: &Polygon, b: &Polygon) -> MultiPolygon<f64> {
	let pieces_a = a.convex_decomposition();
	let pieces_b = b.convex_decomposition();
	let mut acc: Option<MultiPolygon<f64>> = None;
	for pa in &pieces_a {
		for pb in &pieces_b {
			let summed = convex_minkowski_sum(pa, pb);
			let mp = MultiPolygon::new(vec![GeoPolygon::new(ring_from_points(&summed), vec![])]);
			acc = Some(match acc {
				None => mp,
				Some(prev) => prev.union(&mp, CLIPPER_SCALE_BOOLEAN),
			});
		}
	}
	acc.unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Minkowski sum of two convex polygons: merge their edge vectors by polar
/// angle (the standard linear-time convex construction).
fn convex_minkowski_sum(a: &[Point2D], b: &[Point2D]) -> Vec<Point2D> {
	let start_a = lowest_point_index(a);
	let start_b = lowest_point_index(b);
	let ra = rotate_to_start(a, start_a);
	let rb = rotate_to_start(b, start_b);

	let edges_a = edge_vectors(&ra);
	let edges_b = edge_vectors(&rb);

	let mut i = 0;
	let mut j = 0;
	let mut point = ra[0] + rb[0];
	let mut out = vec![point];
	while i < edges_a.len() || j < edges_b.len() {
		let cross = if i < edges_a.len() && j < edges_b.len() {
			edges_a[i].cross(edges_b[j])
		} else if i < edges_a.len() {
			-1.0
		} else {
			1.0
		};
		if cross >= 0.0 && i < edges_a.len() {
			point = point + edges_a[i];
			i += 1;
		} else {
			point = point + edges_b[j];
			j += 1;
		}
		out.push(point);
	}
	out.pop();
	out
}

fn lowest_point_index(points: &[Point2D]) -> usize {
	points
		.iter()
		.enumerate()
		.min_by(|(_, a), (_, b)| (a.y, a.x).partial_cmp(&(b.y, b.x)).unwrap())
		.map(|(i, _)| i)
		.unwrap_or(0)
}

fn rotate_to_start(points: &[Point2D], start: usize) -> Vec<Point2D> {
	points[start..].iter().chain(points[..start].iter()).copied().collect()
}

fn edge_vectors(points: &[Point2D]) -> Vec<Point2D> {
	(0..points.len()).map(|i| points[(i + 1) % points.len()] - points[i]).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::shapes::Polygon;

	fn square(cx: f64, cy: f64, half: f64) -> Polygon {
		Polygon::new(vec![
			Point2D::new(cx - half, cy - half),
			Point2D::new(cx + half, cy - half),
			Point2D::new(cx + half, cy + half),
			Point2D::new(cx - half, cy + half),
		])
		.unwrap()
	}

	#[test]
	fn union_of_overlapping_squares_has_expected_bounds() {
		let r1 = Region::new_unchecked(vec![square(0.0, 0.0, 5.0)], vec![]);
		let r2 = Region::new_unchecked(vec![square(5.0, 0.0, 5.0)], vec![]);
		let out = union(&r1, &r2);
		let bounds = out.bounds();
		assert!((bounds.min.x - -5.0).abs() < 1e-3);
		assert!((bounds.max.x - 10.0).abs() < 1e-3);
	}

	#[test]
	fn difference_of_equal_rectangles_is_empty() {
		let r1 = Region::new_unchecked(vec![square(0.0, 0.0, 5.0)], vec![]);
		let out = difference(&r1, &r1);
		assert!(out.area() < 1e-3);
	}

	#[test]
	fn minkowski_sum_of_unit_squares_is_larger_square() {
		let a = square(0.0, 0.0, 0.5);
		let b = square(0.0, 0.0, 0.5);
		let region = minkowski_sum(&a, &b);
		assert!((region.area() - 4.0).abs() < 1e-2);
	}
}
