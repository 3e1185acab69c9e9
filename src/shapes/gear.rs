//! Procedural spur gear.

use super::{Bounds, Polygon, Shape2D, ShapeKind};
use crate::consts::{EPSILON, GEAR_INVOLUTE_TOLERANCE_FRACTION, GEAR_PITCH_CIRCLE_SEGMENTS};
use crate::error::{CadError, CadResult};
use crate::transform::Transform2D;
use crate::vector::Point2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// `pitch_diameter`, `module`, `diametral_pitch`, and `circular_pitch` are
/// four views onto the same pitch radius; the gear stores `pitch_diameter`
/// as its canonical field and the alternate constructors below just convert
/// on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gear {
	pub center: Point2D,
	pub num_teeth: u32,
	pitch_diameter: f64,
	pub pressure_angle_degrees: f64,
}

impl Gear {
	pub fn new(center: Point2D, num_teeth: u32, pitch_diameter: f64, pressure_angle_degrees: f64) -> CadResult<Self> {
		if num_teeth < 5 {
			return Err(CadError::Domain("a spur gear needs at least 5 teeth".into()));
		}
		if pitch_diameter <= 0.0 {
			return Err(CadError::Domain("pitch_diameter must be positive".into()));
		}
		if !(10.0..=30.0).contains(&pressure_angle_degrees) {
			return Err(CadError::OutOfRange { value: pressure_angle_degrees, min: 10.0, max: 30.0 });
		}
		Ok(Self { center, num_teeth, pitch_diameter, pressure_angle_degrees })
	}

	pub fn from_module(center: Point2D, num_teeth: u32, module: f64, pressure_angle_degrees: f64) -> CadResult<Self> {
		Self::new(center, num_teeth, module * num_teeth as f64, pressure_angle_degrees)
	}

	pub fn from_diametral_pitch(center: Point2D, num_teeth: u32, diametral_pitch: f64, pressure_angle_degrees: f64) -> CadResult<Self> {
		if diametral_pitch <= 0.0 {
			return Err(CadError::Domain("diametral_pitch must be positive".into()));
		}
		Self::new(center, num_teeth, num_teeth as f64 / diametral_pitch, pressure_angle_degrees)
	}

	pub fn from_circular_pitch(center: Point2D, num_teeth: u32, circular_pitch: f64, pressure_angle_degrees: f64) -> CadResult<Self> {
		if circular_pitch <= 0.0 {
			return Err(CadError::Domain("circular_pitch must be positive".into()));
		}
		Self::new(center, num_teeth, circular_pitch * num_teeth as f64 / PI, pressure_angle_degrees)
	}

	pub fn pitch_diameter(&self) -> f64 {
		self.pitch_diameter
	}

	pub fn pitch_radius(&self) -> f64 {
		self.pitch_diameter * 0.5
	}

	pub fn module(&self) -> f64 {
		self.pitch_diameter / self.num_teeth as f64
	}

	pub fn diametral_pitch(&self) -> f64 {
		self.num_teeth as f64 / self.pitch_diameter
	}

	pub fn circular_pitch(&self) -> f64 {
		PI * self.pitch_diameter / self.num_teeth as f64
	}

	fn pressure_angle_radians(&self) -> f64 {
		self.pressure_angle_degrees.to_radians()
	}

	pub fn addendum(&self) -> f64 {
		self.module()
	}

	pub fn dedendum(&self) -> f64 {
		self.module() * 1.25
	}

	pub fn base_radius(&self) -> f64 {
		self.pitch_radius() * self.pressure_angle_radians().cos()
	}

	pub fn addendum_radius(&self) -> f64 {
		self.pitch_radius() + self.addendum()
	}

	pub fn dedendum_radius(&self) -> f64 {
		(self.pitch_radius() - self.dedendum()).max(self.base_radius() * 0.5)
	}

	pub fn bounds(&self) -> Bounds {
		let r = self.addendum_radius();
		Bounds::new(Point2D::new(self.center.x - r, self.center.y - r), Point2D::new(self.center.x + r, self.center.y + r))
	}

	pub fn contains(&self, point: Point2D, tol: f64) -> bool {
		self.center.distance_to(point) <= self.addendum_radius() + tol
	}

	pub fn translate(&self, offset: Point2D) -> Gear {
		Gear { center: self.center.translate(offset), ..*self }
	}

	pub fn rotate(&self, angle: f64, center: Point2D) -> Gear {
		// Gear geometry is only defined by `center` and counts of identical
		// teeth; rotating about a point moves the center but the tooth
		// pattern is rotationally symmetric under full-pitch increments, so
		// there is no separate `rotation` field to track.
		Gear { center: self.center.rotate(angle, center), ..*self }
	}

	/// Non-uniform scale or any general transform upgrades the gear to its
	/// sampled outline [`Polygon`] — the involute tooth profile has no
	/// closed form under a non-similarity map.
	pub fn scale(&self, factor: Point2D, center: Point2D) -> Shape2D {
		if (factor.x - factor.y).abs() <= EPSILON {
			let scaled_radius_ratio = factor.x.abs();
			return Shape2D::SpurGear(Gear { center: self.center.scale(factor, center), pitch_diameter: self.pitch_diameter * scaled_radius_ratio, ..*self });
		}
		Shape2D::Polygon(Polygon::new(self.get_gear_path_points().iter().map(|p| p.scale(factor, center)).collect()).expect("gear outline always has >= 3 points"))
	}

	pub fn transform(&self, t: &Transform2D) -> Shape2D {
		Shape2D::Polygon(Polygon::new(t.apply_many(&self.get_gear_path_points())).expect("gear outline always has >= 3 points"))
	}

	pub fn decompose(&self, kinds: &[ShapeKind], _tol: f64) -> CadResult<Vec<Shape2D>> {
		if kinds.contains(&ShapeKind::SpurGear) {
			return Ok(vec![Shape2D::SpurGear(*self)]);
		}
		if kinds.contains(&ShapeKind::Polygon) {
			return Ok(vec![Shape2D::Polygon(self.to_polygon()?)]);
		}
		Err(super::decomposition_error(kinds))
	}

	pub fn to_polygon(&self) -> CadResult<Polygon> {
		Polygon::new(self.get_gear_path_points())
	}

	/// A 64-segment regular polygon used as a construction reference.
	pub fn get_pitch_circle_points(&self) -> Vec<Point2D> {
		let n = GEAR_PITCH_CIRCLE_SEGMENTS;
		(0..n).map(|i| self.center + Point2D::from_polar(self.pitch_radius(), TAU * i as f64 / n as f64)).collect()
	}

	/// The CCW outer outline: per tooth, an involute leading flank from the
	/// dedendum/base circle to the addendum circle, an addendum arc, the
	/// mirrored trailing flank back down, and a dedendum arc to the next
	/// tooth. Sample density is chosen to keep the max chordal deviation
	/// from the true involute under
	/// `GEAR_INVOLUTE_TOLERANCE_FRACTION * pitch_radius`.
	pub fn get_gear_path_points(&self) -> Vec<Point2D> {
		let rb = self.base_radius();
		let ra = self.addendum_radius();
		let rd = self.dedendum_radius();
		let rp = self.pitch_radius();
		let alpha = self.pressure_angle_radians();
		let inv_alpha = alpha.tan() - alpha;
		let tooth_angle = TAU / self.num_teeth as f64;
		let half_tooth_angle_at_pitch = tooth_angle * 0.25;

		let theta_max = if ra > rb { ((ra / rb).powi(2) - 1.0).max(0.0).sqrt() } else { 0.0 };
		let theta_pitch = if rp > rb { ((rp / rb).powi(2) - 1.0).max(0.0).sqrt() } else { 0.0 };
		let flank_angle_at_pitch = involute_polar_angle(theta_pitch);
		// Rotate the whole flank so its point at the pitch radius sits at
		// the standard tooth half-angle from the tooth centerline.
		let flank_rotation = half_tooth_angle_at_pitch + inv_alpha - flank_angle_at_pitch;

		let samples = flank_sample_count(theta_max, rb, rp, GEAR_INVOLUTE_TOLERANCE_FRACTION);

		let mut points = Vec::with_capacity(self.num_teeth as usize * (samples * 2 + 4));
		for tooth in 0..self.num_teeth {
			let tooth_center_angle = tooth_angle * tooth as f64;

			// Dedendum arc up to the start of the leading flank.
			if rd < rb {
				points.push(self.center + Point2D::from_polar(rd, tooth_center_angle - half_tooth_angle_at_pitch - inv_alpha));
			}

			// Leading (left) flank: base/dedendum circle up to addendum circle.
			for i in 0..=samples {
				let theta = theta_max * i as f64 / samples as f64;
				let local = involute_point(rb, theta);
				let angle = tooth_center_angle - flank_rotation + local.angle_radians();
				points.push(self.center + Point2D::from_polar(local.magnitude(), angle));
			}

			// Addendum arc to the mirrored trailing flank.
			let addendum_half_angle = involute_polar_angle(theta_max) - flank_rotation;
			points.push(self.center + Point2D::from_polar(ra, tooth_center_angle - addendum_half_angle));
			points.push(self.center + Point2D::from_polar(ra, tooth_center_angle + addendum_half_angle));

			// Trailing (right) flank: mirror the leading flank.
			for i in (0..=samples).rev() {
				let theta = theta_max * i as f64 / samples as f64;
				let local = involute_point(rb, theta);
				let angle = tooth_center_angle + flank_rotation - local.angle_radians();
				points.push(self.center + Point2D::from_polar(local.magnitude(), angle));
			}

			if rd < rb {
				points.push(self.center + Point2D::from_polar(rd, tooth_center_angle + half_tooth_angle_at_pitch + inv_alpha));
			}
		}
		points
	}
}

fn involute_point(rb: f64, theta: f64) -> Point2D {
	Point2D::new(rb * (theta.cos() + theta * theta.sin()), rb * (theta.sin() - theta * theta.cos()))
}

fn involute_polar_angle(theta: f64) -> f64 {
	involute_point(1.0, theta).angle_radians()
}

fn flank_sample_count(theta_max: f64, rb: f64, rp: f64, tolerance_fraction: f64) -> usize {
	if theta_max <= EPSILON {
		return 1;
	}
	let tol = tolerance_fraction * rp;
	// Chordal deviation of an involute over a roll-angle step `d theta` is
	// bounded by `rb * d_theta^2 / 2`; invert for the step giving the
	// requested tolerance, then derive the sample count.
	let step = if rb > EPSILON { (2.0 * tol / rb).sqrt() } else { theta_max };
	let n = (theta_max / step.max(EPSILON)).ceil() as usize;
	n.clamp(4, 64)
}

impl crate::constraint::Constraints for Gear {
	fn make_constrainables(&self) -> Vec<crate::constraint::Constrainable> {
		vec![
			crate::constraint::Constrainable::point("center", self.center),
			crate::constraint::Constrainable::scalar("pitch_diameter", self.pitch_diameter),
			crate::constraint::Constrainable::scalar("pressure_angle_degrees", self.pressure_angle_degrees).fixed(),
		]
	}

	fn update_from_solved_constraints(&self, bag: &crate::constraint::SolverBag) -> Self {
		let mut out = *self;
		if let Some(crate::constraint::ConstrainableValue::Point(p)) = bag.get("center") {
			out.center = *p;
		}
		if let Some(crate::constraint::ConstrainableValue::Scalar(v)) = bag.get("pitch_diameter") {
			if *v > 0.0 {
				out.pitch_diameter = *v;
			}
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn rejects_too_few_teeth() {
		assert!(Gear::new(Point2D::ZERO, 4, 20.0, 20.0).is_err());
	}

	#[test]
	fn rejects_pressure_angle_out_of_range() {
		assert!(Gear::new(Point2D::ZERO, 20, 20.0, 45.0).is_err());
	}

	#[test]
	fn module_view_is_consistent() {
		let g = Gear::from_module(Point2D::ZERO, 20, 1.0, 20.0).unwrap();
		assert_eq!(g.pitch_diameter(), 20.0);
		assert!((g.module() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn outline_stays_within_addendum_circle() {
		let g = Gear::new(Point2D::ZERO, 12, 24.0, 20.0).unwrap();
		let points = g.get_gear_path_points();
		let ra = g.addendum_radius();
		for p in points {
			assert!(p.distance_to(Point2D::ZERO) <= ra + 1e-6);
		}
	}

	#[test]
	fn pitch_circle_has_expected_segment_count() {
		let g = Gear::new(Point2D::ZERO, 12, 24.0, 20.0).unwrap();
		assert_eq!(g.get_pitch_circle_points().len(), GEAR_PITCH_CIRCLE_SEGMENTS);
	}
}
