//! The layer tree shown next to the canvas, kept in sync with a [`Document`] through its notifications.

use crate::response::{DocumentObserver, DocumentResponse};
use crate::{Document, DocumentError, LayerId};

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, PartialEq, Default)]
struct TreeNode {
	id: LayerId,
	children: Vec<TreeNode>,
}

impl TreeNode {
	fn find(&self, path: &[LayerId]) -> Option<&TreeNode> {
		path.iter().try_fold(self, |node, id| node.children.iter().find(|child| child.id == *id))
	}

	fn find_mut(&mut self, path: &[LayerId]) -> Option<&mut TreeNode> {
		path.iter().try_fold(self, |node, id| node.children.iter_mut().find(|child| child.id == *id))
	}

	fn collect_paths(&self, path: &mut Vec<LayerId>, paths: &mut Vec<Vec<LayerId>>) {
		for child in &self.children {
			path.push(child.id);
			paths.push(path.clone());
			child.collect_paths(path, paths);
			path.pop();
		}
	}
}

/// Clears the flag when dropped, including on early return through `?`.
struct SelectionLock<'a>(&'a Cell<bool>);

impl<'a> SelectionLock<'a> {
	fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
		if flag.replace(true) { None } else { Some(Self(flag)) }
	}
}

impl Drop for SelectionLock<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Derived tree index over a document plus the selection as the panel shows it.
///
/// The tree is updated incrementally from insert/remove notifications. Selection flows both ways: the panel
/// writes its selection into the document with [`LayerPanel::sync_view_to_document`], and mirrors document
/// selection changes it is notified about. Only one direction is in flight at a time; the notification the
/// document emits while the panel is writing into it is ignored instead of echoing back.
#[derive(Debug, Default)]
pub struct LayerPanel {
	tree: RefCell<TreeNode>,
	pending_insert: Cell<Option<usize>>,
	view_selection: RefCell<BTreeSet<Vec<LayerId>>>,
	is_selection_locked: Cell<bool>,
}

impl LayerPanel {
	/// Builds the tree from the current document and subscribes to its changes.
	pub fn attach(document: &mut Document) -> Rc<LayerPanel> {
		let panel = Rc::new(LayerPanel::default());
		for path in document.layer_paths() {
			panel.insert_node(&path, None);
		}
		*panel.view_selection.borrow_mut() = document.selected_layers().into_iter().collect();

		let observer: Weak<dyn DocumentObserver> = Rc::downgrade(&panel) as Weak<dyn DocumentObserver>;
		document.add_observer(observer);
		panel
	}

	/// Child ids of the row at `parent`, back-most first.
	pub fn rows(&self, parent: &[LayerId]) -> Vec<LayerId> {
		self.tree.borrow().find(parent).map(|node| node.children.iter().map(|child| child.id).collect()).unwrap_or_default()
	}

	pub fn row_count(&self, parent: &[LayerId]) -> usize {
		self.tree.borrow().find(parent).map_or(0, |node| node.children.len())
	}

	/// Every row path in pre-order.
	pub fn paths(&self) -> Vec<Vec<LayerId>> {
		let mut paths = Vec::new();
		self.tree.borrow().collect_paths(&mut Vec::new(), &mut paths);
		paths
	}

	pub fn is_selected_in_view(&self, path: &[LayerId]) -> bool {
		self.view_selection.borrow().contains(path)
	}

	pub fn view_selection(&self) -> Vec<Vec<LayerId>> {
		self.view_selection.borrow().iter().cloned().collect()
	}

	/// Whether a selection sync is currently running.
	pub fn is_syncing(&self) -> bool {
		self.is_selection_locked.get()
	}

	/// Replaces the panel's selection, as a click in the tree would, and pushes it to the document.
	pub fn select_in_view(&self, document: &mut Document, paths: impl IntoIterator<Item = Vec<LayerId>>) -> Result<(), DocumentError> {
		*self.view_selection.borrow_mut() = paths.into_iter().collect();
		self.sync_view_to_document(document)
	}

	/// Writes the panel's selection into the document, then mirrors back what the document accepted
	/// (hidden layers refuse selection).
	pub fn sync_view_to_document(&self, document: &mut Document) -> Result<(), DocumentError> {
		let Some(_lock) = SelectionLock::acquire(&self.is_selection_locked) else {
			log::trace!("Selection sync already in progress, skipping view to document");
			return Ok(());
		};

		let view_selection = self.view_selection.borrow().clone();
		let changes: Vec<(Vec<LayerId>, bool)> = self
			.paths()
			.into_iter()
			.map(|path| {
				let selected = view_selection.contains(&path);
				(path, selected)
			})
			.collect();
		document.set_selection(changes.iter().map(|(path, selected)| (path.as_slice(), *selected)))?;

		*self.view_selection.borrow_mut() = document.selected_layers().into_iter().collect();
		Ok(())
	}

	/// Replaces the panel's selection with the document's.
	pub fn sync_document_to_view(&self, selected: &[Vec<LayerId>]) {
		let Some(_lock) = SelectionLock::acquire(&self.is_selection_locked) else {
			log::trace!("Selection sync already in progress, skipping document to view");
			return;
		};
		*self.view_selection.borrow_mut() = selected.iter().cloned().collect();
	}

	fn insert_node(&self, path: &[LayerId], index: Option<usize>) {
		let Some((id, parent)) = path.split_last() else { return };
		let mut tree = self.tree.borrow_mut();
		let Some(parent) = tree.find_mut(parent) else {
			log::warn!("Layer panel has no row for the parent of {path:?}");
			return;
		};
		let node = TreeNode { id: *id, children: Vec::new() };
		match index {
			Some(index) if index <= parent.children.len() => parent.children.insert(index, node),
			_ => parent.children.push(node),
		}
	}

	fn remove_node(&self, path: &[LayerId]) {
		let Some((id, parent)) = path.split_last() else { return };
		if let Some(parent) = self.tree.borrow_mut().find_mut(parent) {
			parent.children.retain(|child| child.id != *id);
		}
		self.view_selection.borrow_mut().retain(|selected| !selected.starts_with(path));
	}
}

impl DocumentObserver for LayerPanel {
	fn handle_response(&self, response: &DocumentResponse) {
		match response {
			DocumentResponse::AboutToInsertLayer { index, .. } => self.pending_insert.set(Some(*index)),
			DocumentResponse::InsertedLayer { path } => self.insert_node(path, self.pending_insert.take()),
			DocumentResponse::AboutToRemoveLayer { .. } => {}
			DocumentResponse::RemovedLayer { path } => self.remove_node(path),
			DocumentResponse::LayerChanged { .. } => {}
			DocumentResponse::SelectionChanged { selected } => self.sync_document_to_view(selected),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layers::layer_info::Layer;
	use image::RgbaImage;
	use pretty_assertions::assert_eq;

	fn image(name: &str) -> Layer {
		Layer::new_image(RgbaImage::new(1, 1), name)
	}

	#[test]
	fn tree_follows_structure_without_rebuilding() {
		let mut document = Document::default();
		let existing = document.append(&[], image("existing")).unwrap();
		let panel = LayerPanel::attach(&mut document);

		let mut group = Layer::new_group("group");
		group.as_group_mut().unwrap().add_layer(image("child"));
		let group = document.append(&[], group).unwrap();

		assert_eq!(panel.paths(), document.layer_paths());
		assert_eq!(panel.row_count(&group), 1);

		document.remove(&existing).unwrap();
		assert_eq!(panel.rows(&[]), vec![group[0]]);
		assert_eq!(panel.paths(), document.layer_paths());
	}

	#[test]
	fn document_selection_reaches_the_view() {
		let mut document = Document::default();
		let panel = LayerPanel::attach(&mut document);
		let a = document.append(&[], image("a")).unwrap();

		document.set_selected(&a, true).unwrap();

		assert!(panel.is_selected_in_view(&a));
	}

	#[test]
	fn view_selection_reaches_the_document_without_echo() {
		let mut document = Document::default();
		let panel = LayerPanel::attach(&mut document);
		let a = document.append(&[], image("a")).unwrap();
		let hidden = document.append(&[], image("hidden").with_visibility(false)).unwrap();

		panel.select_in_view(&mut document, [a.clone(), hidden.clone()]).unwrap();

		assert_eq!(document.selected_layers(), vec![a.clone()]);
		assert_eq!(panel.view_selection(), vec![a]);
		assert!(!panel.is_syncing());
	}

	#[test]
	fn guard_is_released_when_the_sync_fails() {
		let mut document = Document::default();
		let panel = LayerPanel::attach(&mut document);
		document.append(&[], image("a")).unwrap();

		let mut other = Document::default();
		assert!(panel.sync_view_to_document(&mut other).is_err());
		assert!(!panel.is_syncing());
	}

	#[test]
	fn removed_rows_leave_the_view_selection() {
		let mut document = Document::default();
		let panel = LayerPanel::attach(&mut document);
		let group = document.append(&[], Layer::new_group("group")).unwrap();
		let child = document.append(&group, image("child")).unwrap();
		panel.select_in_view(&mut document, [child]).unwrap();

		document.remove(&group).unwrap();

		assert!(panel.view_selection().is_empty());
		assert!(document.selected_layers().is_empty());
	}
}
