//! Document-level ownership.
//!
//! A [`Document`] owns a mapping `object_id -> CadObject`, where each
//! `CadObject` wraps exactly one shape plus style attributes and an
//! optional parent group id. The document is the sole authority over
//! identity, Z-order, and parent/child links; shapes themselves hold no
//! back-reference to it.

use crate::shapes::Shape2D;
use serde::{Deserialize, Serialize};

/// Identifies one `CadObject` within a `Document`. Unique within the
/// document that minted it, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CadObjectId(pub u64);

/// Style attributes carried alongside a shape; purely presentational, never
/// consulted by the shape algebra itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
	pub color: [u8; 4],
	pub line_width: f64,
	pub layer: String,
	pub visible: bool,
	pub locked: bool,
}

impl Default for Style {
	fn default() -> Self {
		Self { color: [0, 0, 0, 255], line_width: 1.0, layer: "default".into(), visible: true, locked: false }
	}
}

/// The document-level wrapper over a shape: identity, style, and an
/// optional parent group link. `CadObject`s never reference a `ViewModel`;
/// all UI notification flows the other way, through the ViewModel's signal
/// channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadObject {
	pub id: CadObjectId,
	pub shape: Shape2D,
	pub style: Style,
	pub parent: Option<CadObjectId>,
}

impl CadObject {
	pub fn new(id: CadObjectId, shape: Shape2D) -> Self {
		Self { id, shape, style: Style::default(), parent: None }
	}
}

/// Signals emitted by a `Document` edit. Consumed by whichever component
/// (scene, tree, undo stack) subscribes; the document itself holds no
/// subscriber list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentSignal {
	/// One object's shape or style changed.
	ObjectModified(CadObjectId),
	/// An object was inserted at the top of the Z-order.
	ObjectInserted(CadObjectId),
	/// An object (and any descendants reparented onto its parent) was removed.
	ObjectRemoved(CadObjectId),
	/// The selection set changed; carries the new selection.
	SelectionChanged(Vec<CadObjectId>),
}

/// The sole authority over object identity, Z-order, and parent/child
/// links. Shapes are mutated only by replacing the owning `CadObject`'s
/// shape wholesale — never in place — matching the shape algebra's
/// value-like transformation semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
	objects: std::collections::BTreeMap<CadObjectId, CadObject>,
	/// Back-to-front Z-order; the last entry renders on top.
	z_order: Vec<CadObjectId>,
	next_id: u64,
	selection: Vec<CadObjectId>,
	#[serde(skip)]
	pending_signals: Vec<DocumentSignal>,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a freshly-created shape at the top of the Z-order and return
	/// its newly minted id.
	pub fn insert(&mut self, shape: Shape2D) -> CadObjectId {
		let id = CadObjectId(self.next_id);
		self.next_id += 1;
		self.objects.insert(id, CadObject::new(id, shape));
		self.z_order.push(id);
		self.pending_signals.push(DocumentSignal::ObjectInserted(id));
		id
	}

	pub fn get(&self, id: CadObjectId) -> Option<&CadObject> {
		self.objects.get(&id)
	}

	/// Replace one object's shape wholesale (the only mutation path for
	/// shape geometry) and queue an `ObjectModified` signal.
	pub fn set_shape(&mut self, id: CadObjectId, shape: Shape2D) -> bool {
		let Some(object) = self.objects.get_mut(&id) else { return false };
		object.shape = shape;
		self.pending_signals.push(DocumentSignal::ObjectModified(id));
		true
	}

	pub fn set_style(&mut self, id: CadObjectId, style: Style) -> bool {
		let Some(object) = self.objects.get_mut(&id) else { return false };
		object.style = style;
		self.pending_signals.push(DocumentSignal::ObjectModified(id));
		true
	}

	/// Remove an object. Children are reparented onto the removed object's
	/// parent rather than orphaned or cascade-deleted.
	pub fn remove(&mut self, id: CadObjectId) -> Option<CadObject> {
		let removed = self.objects.remove(&id)?;
		self.z_order.retain(|&o| o != id);
		self.selection.retain(|&o| o != id);
		for object in self.objects.values_mut() {
			if object.parent == Some(id) {
				object.parent = removed.parent;
			}
		}
		self.pending_signals.push(DocumentSignal::ObjectRemoved(id));
		Some(removed)
	}

	pub fn set_parent(&mut self, id: CadObjectId, parent: Option<CadObjectId>) -> bool {
		if let Some(p) = parent {
			if p == id || self.is_descendant(p, id) {
				return false;
			}
		}
		let Some(object) = self.objects.get_mut(&id) else { return false };
		object.parent = parent;
		true
	}

	fn is_descendant(&self, candidate: CadObjectId, ancestor: CadObjectId) -> bool {
		let mut current = self.objects.get(&candidate).and_then(|o| o.parent);
		while let Some(id) = current {
			if id == ancestor {
				return true;
			}
			current = self.objects.get(&id).and_then(|o| o.parent);
		}
		false
	}

	/// Direct children of `parent` (not transitive descendants).
	pub fn children_of(&self, parent: CadObjectId) -> impl Iterator<Item = CadObjectId> + '_ {
		self.objects.values().filter(move |o| o.parent == Some(parent)).map(|o| o.id)
	}

	/// All transitive descendants of `parent`, in no particular order.
	pub fn descendants_of(&self, parent: CadObjectId) -> Vec<CadObjectId> {
		let mut out = Vec::new();
		let mut frontier: Vec<CadObjectId> = self.children_of(parent).collect();
		while let Some(id) = frontier.pop() {
			out.push(id);
			frontier.extend(self.children_of(id));
		}
		out
	}

	pub fn z_order(&self) -> &[CadObjectId] {
		&self.z_order
	}

	pub fn selection(&self) -> &[CadObjectId] {
		&self.selection
	}

	/// Replace the selection set. Selecting a group implicitly expands to
	/// its descendants; this is the scene-selection half of the ViewModel's
	/// unified selection rule for the presentation bridge.
	pub fn set_selection(&mut self, ids: impl IntoIterator<Item = CadObjectId>) {
		let mut expanded = std::collections::BTreeSet::new();
		for id in ids {
			if !self.objects.contains_key(&id) {
				continue;
			}
			expanded.insert(id);
			expanded.extend(self.descendants_of(id));
		}
		self.selection = expanded.into_iter().collect();
		self.pending_signals.push(DocumentSignal::SelectionChanged(self.selection.clone()));
	}

	/// Run `edit` as a batch: all of its mutations are applied, then every
	/// signal they queued is emitted together in source order. The bracket
	/// guarantees signals fire on every exit path, including when `edit`
	/// panics, so a move of N objects never leaves subscribers mid-update.
	pub fn batch_edit<R>(&mut self, edit: impl FnOnce(&mut Document) -> R) -> (R, Vec<DocumentSignal>) {
		let start = self.pending_signals.len();
		struct DrainOnDrop<'a> {
			doc: &'a mut Document,
			start: usize,
			drained: Vec<DocumentSignal>,
			taken: bool,
		}
		impl Drop for DrainOnDrop<'_> {
			fn drop(&mut self) {
				if !self.taken {
					self.drained = self.doc.pending_signals.drain(self.start..).collect();
				}
			}
		}
		let mut guard = DrainOnDrop { doc: self, start, drained: Vec::new(), taken: false };
		let result = edit(guard.doc);
		guard.drained = guard.doc.pending_signals.drain(guard.start..).collect();
		guard.taken = true;
		(result, guard.drained)
	}

	/// Drain and return all signals queued since the last drain, outside a
	/// `batch_edit` bracket.
	pub fn take_signals(&mut self) -> Vec<DocumentSignal> {
		std::mem::take(&mut self.pending_signals)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::shapes::Circle;
	use crate::vector::Point2D;
	use pretty_assertions::assert_eq;

	fn circle_shape() -> Shape2D {
		Shape2D::Circle(Circle::new(Point2D::ZERO, 5.0).unwrap())
	}

	#[test]
	fn insert_assigns_unique_ids_and_z_order() {
		let mut doc = Document::new();
		let a = doc.insert(circle_shape());
		let b = doc.insert(circle_shape());
		assert_ne!(a, b);
		assert_eq!(doc.z_order(), &[a, b]);
	}

	#[test]
	fn remove_reparents_children_onto_removed_parent() {
		let mut doc = Document::new();
		let grandparent = doc.insert(circle_shape());
		let parent = doc.insert(circle_shape());
		let child = doc.insert(circle_shape());
		doc.set_parent(parent, Some(grandparent));
		doc.set_parent(child, Some(parent));
		doc.remove(parent);
		assert_eq!(doc.get(child).unwrap().parent, Some(grandparent));
	}

	#[test]
	fn set_parent_rejects_cycles() {
		let mut doc = Document::new();
		let a = doc.insert(circle_shape());
		let b = doc.insert(circle_shape());
		assert!(doc.set_parent(b, Some(a)));
		assert!(!doc.set_parent(a, Some(b)));
	}

	#[test]
	fn selecting_a_group_expands_to_descendants() {
		let mut doc = Document::new();
		let group = doc.insert(circle_shape());
		let child = doc.insert(circle_shape());
		doc.set_parent(child, Some(group));
		doc.set_selection([group]);
		assert_eq!(doc.selection(), &[group, child]);
	}

	#[test]
	fn batch_edit_emits_signals_once_at_the_end() {
		let mut doc = Document::new();
		let a = doc.insert(circle_shape());
		doc.take_signals();
		let (_, signals) = doc.batch_edit(|doc| {
			doc.set_shape(a, circle_shape());
			doc.set_style(a, Style::default());
		});
		assert_eq!(signals.len(), 2);
		assert!(doc.take_signals().is_empty());
	}
}
