//! Cross-module scenario and invariant tests. Unit tests for a single
//! module live next to that module; these exercise interactions between
//! shapes, transforms, and the boolean/offset engine.

use cad_kernel::boolean::{EndType, JoinType};
use cad_kernel::shapes::{Arc, Circle, Line2D, LineIntersection, Polygon, Region};
use cad_kernel::{Point2D, Shape2D, Transform2D};

const TOL: f64 = 1e-9;

#[test]
fn perpendicular_line_intersection_at_midpoint() {
	let a = Line2D::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
	let b = Line2D::new(Point2D::new(5.0, -5.0), Point2D::new(5.0, 5.0));
	let hit = a.intersects_at(&b, (true, true)).expect("lines cross");
	let point = match hit {
		LineIntersection::Point(p) => p,
		LineIntersection::Collinear { .. } => panic!("expected a single crossing point"),
	};
	assert!((point.x - 5.0).abs() < TOL);
	assert!((point.y - 0.0).abs() < TOL);
}

#[test]
fn circle_circle_intersection_two_points() {
	let a = Circle::new(Point2D::new(0.0, 0.0), 5.0).unwrap();
	let b = Circle::new(Point2D::new(8.0, 0.0), 5.0).unwrap();
	let mut points = a.intersect_circle(&b);
	points.sort_by(|p, q| p.y.partial_cmp(&q.y).unwrap());
	assert_eq!(points.len(), 2);
	assert!((points[0].x - 4.0).abs() < TOL && (points[0].y - -3.0).abs() < TOL);
	assert!((points[1].x - 4.0).abs() < TOL && (points[1].y - 3.0).abs() < TOL);
}

#[test]
fn arc_from_three_points_semicircle() {
	let arc = Arc::from_three_points(Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0), Point2D::new(-1.0, 0.0)).unwrap();
	assert!(arc.center.distance_to(Point2D::ZERO) < 1e-6);
	assert!((arc.radius - 1.0).abs() < 1e-6);
	assert!((arc.span_angle - std::f64::consts::PI).abs() < 1e-6);
}

#[test]
fn rectangle_polygon_area_centroid_and_convexity() {
	let polygon = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0), Point2D::new(4.0, 3.0), Point2D::new(0.0, 3.0)]).unwrap();
	assert!((polygon.area() - 12.0).abs() < TOL);
	let centroid = polygon.centroid();
	assert!((centroid.x - 2.0).abs() < TOL);
	assert!((centroid.y - 1.5).abs() < TOL);
	assert!(polygon.is_convex());
}

#[test]
fn region_difference_bounds() {
	let a = Region::rectangle(Point2D::new(0.0, 0.0), 10.0, 10.0).unwrap();
	let b = Region::rectangle(Point2D::new(5.0, 0.0), 10.0, 10.0).unwrap();
	let result = a.difference(&b);
	let bounds = result.bounds();
	assert!((bounds.min.x - 0.0).abs() < 1e-4);
	assert!((bounds.min.y - 0.0).abs() < 1e-4);
	assert!((bounds.max.x - 5.0).abs() < 1e-4);
	assert!((bounds.max.y - 10.0).abs() < 1e-4);
}

#[test]
fn ellipse_vertical_line_intersection() {
	use cad_kernel::shapes::Ellipse;
	let ellipse = Ellipse::new(Point2D::ZERO, 20.0, 12.0, 0.0).unwrap();
	let line = Line2D::new(Point2D::new(0.0, -10.0), Point2D::new(0.0, 10.0));
	let mut points = ellipse.intersect_line(&line);
	points.sort_by(|p, q| p.y.partial_cmp(&q.y).unwrap());
	assert_eq!(points.len(), 2);
	assert!((points[0].y - -6.0).abs() < 1e-6);
	assert!((points[1].y - 6.0).abs() < 1e-6);
}

#[test]
fn composed_transforms_equal_one_combined_transform_invariant_1() {
	let polygon = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0), Point2D::new(4.0, 3.0), Point2D::new(0.0, 3.0)]).unwrap();
	let shape = Shape2D::Polygon(polygon);
	let a = Transform2D::rotation(0.4, Point2D::new(1.0, 1.0));
	let b = Transform2D::translation(2.0, -3.0);
	let combined = a * b;
	let sequential = shape.transform(&b).transform(&a);
	let direct = shape.transform(&combined);
	assert_shapes_close(&sequential, &direct, 1e-9);
}

#[test]
fn translate_then_inverse_translate_is_identity_invariant_2() {
	let polygon = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0), Point2D::new(4.0, 3.0), Point2D::new(0.0, 3.0)]).unwrap();
	let shape = Shape2D::Polygon(polygon);
	let v = Point2D::new(3.5, -2.25);
	let round_tripped = shape.translate(v).translate(-v);
	assert_shapes_close(&shape, &round_tripped, 1e-9);
}

#[test]
fn region_self_union_and_difference_invariant_4() {
	let region = Region::rectangle(Point2D::new(0.0, 0.0), 6.0, 4.0).unwrap();
	let union = region.union(&region);
	assert!((union.area() - region.area()).abs() / region.area() < 1e-3);
	let difference = region.difference(&region);
	assert!(difference.area() < 1e-6);
	let xor = region.xor(&region);
	assert!(xor.area() < 1e-6);
	let intersection = region.intersection(&region);
	assert!((intersection.area() - region.area()).abs() / region.area() < 1e-3);
}

#[test]
fn region_offset_outsets_a_rectangle() {
	let region = Region::rectangle(Point2D::new(0.0, 0.0), 10.0, 10.0).unwrap();
	let outset = region.offset(1.0, JoinType::Miter, EndType::ClosedPolygon);
	assert!(outset.area() > region.area());
}

#[test]
fn region_save_load_save_round_trip_is_byte_identical() {
	let region = Region::rectangle(Point2D::new(0.0, 0.0), 6.0, 4.0).unwrap().difference(&Region::rectangle(Point2D::new(2.0, 1.0), 1.0, 1.0).unwrap());
	let saved = serde_json::to_string(&region).unwrap();
	let loaded: Region = serde_json::from_str(&saved).unwrap();
	let resaved = serde_json::to_string(&loaded).unwrap();
	assert_eq!(saved, resaved);
	assert_eq!(region, loaded);
}

fn assert_shapes_close(a: &Shape2D, b: &Shape2D, tol: f64) {
	match (a, b) {
		(Shape2D::Polygon(p), Shape2D::Polygon(q)) => {
			assert_eq!(p.points().len(), q.points().len());
			for (x, y) in p.points().iter().zip(q.points().iter()) {
				assert!(x.distance_to(*y) <= tol, "{x:?} vs {y:?}");
			}
		}
		_ => panic!("shape kind mismatch"),
	}
}
