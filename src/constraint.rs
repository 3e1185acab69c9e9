//! Constraint bridge.
//!
//! The solver itself is an external collaborator; this module only defines
//! the handle API shapes register against and the three hooks every
//! constrainable shape implements (`make_constrainables`,
//! `update_constrainables_before_solving`, `update_from_solved_constraints`).

use crate::vector::Point2D;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named handle onto a mutable scalar or point inside a shape. The solver
/// reads/writes through `get`/`update_values`; `fixed` lets a shape pin a
/// handle so the solver treats it as a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstrainableValue {
	Scalar(f64),
	Point(Point2D),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constrainable {
	pub name: String,
	pub value: ConstrainableValue,
	pub fixed: bool,
}

impl Constrainable {
	pub fn scalar(name: impl Into<String>, value: f64) -> Self {
		Self { name: name.into(), value: ConstrainableValue::Scalar(value), fixed: false }
	}

	pub fn point(name: impl Into<String>, value: Point2D) -> Self {
		Self { name: name.into(), value: ConstrainableValue::Point(value), fixed: false }
	}

	pub fn fixed(mut self) -> Self {
		self.fixed = true;
		self
	}
}

/// The solver's variable bag. The core holds no solver state across calls;
/// each hook receives a fresh bag, reads what it needs, and writes back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverBag {
	values: BTreeMap<String, ConstrainableValue>,
}

impl SolverBag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&ConstrainableValue> {
		self.values.get(name)
	}

	pub fn update_values(&mut self, name: impl Into<String>, value: ConstrainableValue) {
		self.values.insert(name.into(), value);
	}
}

/// Implemented by every shape that participates in constraints.
pub trait Constraints {
	/// Register one handle per free scalar/point, capturing current values
	/// as initial guesses.
	fn make_constrainables(&self) -> Vec<Constrainable>;

	/// Push current shape state into the solver bag so a resumed solve
	/// starts from the edited state.
	fn update_constrainables_before_solving(&self, bag: &mut SolverBag) {
		for c in self.make_constrainables() {
			debug!("constraint round trip: pushing {} before solving", c.name);
			bag.update_values(c.name, c.value);
		}
	}

	/// Pull solved values back into the shape; must leave all shape
	/// invariants intact.
	fn update_from_solved_constraints(&self, bag: &SolverBag) -> Self
	where
		Self: Sized;
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn solver_bag_round_trips_a_scalar() {
		let mut bag = SolverBag::new();
		bag.update_values("radius", ConstrainableValue::Scalar(5.0));
		assert_eq!(bag.get("radius"), Some(&ConstrainableValue::Scalar(5.0)));
	}

	#[test]
	fn fixed_flag_defaults_to_false() {
		let c = Constrainable::scalar("radius", 5.0);
		assert!(!c.fixed);
		assert!(c.fixed().fixed);
	}
}
