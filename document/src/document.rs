use crate::error::RenderError;
use crate::layers::group_layer::GroupLayer;
use crate::layers::layer_info::{Layer, LayerDataType};
use crate::render::Renderer;
use crate::response::{DocumentObserver, DocumentResponse};
use crate::{DocumentError, LayerId};

use glam::{DAffine2, DVec2};
use image::RgbaImage;
use std::rc::Weak;

/// The scene graph of one editing session.
///
/// Layers are addressed by paths of [`LayerId`]s starting below the root group. The root itself (the empty path)
/// always exists and can only be cleared.
#[derive(Debug)]
pub struct Document {
	root: GroupLayer,
	observers: Vec<Weak<dyn DocumentObserver>>,
}

impl Default for Document {
	fn default() -> Self {
		Self::from_root(GroupLayer::default())
	}
}

impl PartialEq for Document {
	fn eq(&self, other: &Self) -> bool {
		self.root == other.root
	}
}

impl Document {
	pub fn from_root(root: GroupLayer) -> Self {
		Self { root, observers: Vec::new() }
	}

	/// Registers an observer. It is dropped from the list once its last strong reference is gone.
	pub fn add_observer(&mut self, observer: Weak<dyn DocumentObserver>) {
		self.observers.push(observer);
	}

	fn emit(&mut self, response: DocumentResponse) {
		log::trace!("{response}: {response:?}");
		self.observers.retain(|observer| observer.strong_count() > 0);
		for observer in self.observers.clone() {
			if let Some(observer) = observer.upgrade() {
				observer.handle_response(&response);
			}
		}
	}

	pub fn root(&self) -> &GroupLayer {
		&self.root
	}

	/// Returns a reference to the requested group; the empty path is the root. Fails if the path does not exist
	/// or is not a group.
	pub fn group(&self, path: &[LayerId]) -> Result<&GroupLayer, DocumentError> {
		if path.is_empty() {
			return Ok(&self.root);
		}
		self.layer(path)?.as_group()
	}

	fn group_mut(&mut self, path: &[LayerId]) -> Result<&mut GroupLayer, DocumentError> {
		if path.is_empty() {
			return Ok(&mut self.root);
		}
		self.layer_mut(path)?.as_group_mut()
	}

	/// Returns a reference to the layer at `path`. The root is not a layer, so the empty path is invalid.
	pub fn layer(&self, path: &[LayerId]) -> Result<&Layer, DocumentError> {
		let (parent, id) = split_path(path)?;
		let not_found = || DocumentError::LayerNotFound(path.to_vec());
		let mut group = &self.root;
		for ancestor in parent {
			group = group.layer(*ancestor).ok_or_else(not_found)?.as_group()?;
		}
		group.layer(id).ok_or_else(not_found)
	}

	fn layer_mut(&mut self, path: &[LayerId]) -> Result<&mut Layer, DocumentError> {
		let (parent, id) = split_path(path)?;
		let not_found = || DocumentError::LayerNotFound(path.to_vec());
		let mut group = &mut self.root;
		for ancestor in parent {
			group = group.layer_mut(*ancestor).ok_or_else(not_found)?.as_group_mut()?;
		}
		group.layer_mut(id).ok_or_else(not_found)
	}

	/// Z-order index of the layer at `path` within its parent.
	pub fn index_of(&self, path: &[LayerId]) -> Result<usize, DocumentError> {
		let (parent, id) = split_path(path)?;
		self.group(parent)?.position_of_layer(id).ok_or_else(|| DocumentError::LayerNotFound(path.to_vec()))
	}

	/// Paths of every layer in pre-order, back to front within each group.
	pub fn layer_paths(&self) -> Vec<Vec<LayerId>> {
		fn collect(group: &GroupLayer, path: &mut Vec<LayerId>, paths: &mut Vec<Vec<LayerId>>) {
			for (id, layer) in group.iter() {
				path.push(id);
				paths.push(path.clone());
				if let LayerDataType::Group(group) = &layer.data {
					collect(group, path, paths);
				}
				path.pop();
			}
		}
		let mut paths = Vec::new();
		collect(self.root(), &mut vec![], &mut paths);
		paths
	}

	/// Appends `layer` at the front of the group at `parent` and returns its path.
	///
	/// The layer may be a group that already has children; each descendant is announced with its own
	/// [`DocumentResponse::InsertedLayer`].
	pub fn append(&mut self, parent: &[LayerId], layer: Layer) -> Result<Vec<LayerId>, DocumentError> {
		let index = self.group(parent)?.len();
		self.emit(DocumentResponse::AboutToInsertLayer { parent: parent.to_vec(), index });

		let id = self.group_mut(parent)?.add_layer(layer);
		let path = [parent, &[id]].concat();
		log::debug!("Appended layer {path:?} at index {index}");

		fn aggregate_insertions(group: &GroupLayer, path: &mut Vec<LayerId>, responses: &mut Vec<DocumentResponse>) {
			for (id, layer) in group.iter() {
				path.push(id);
				responses.push(DocumentResponse::InsertedLayer { path: path.clone() });
				if let LayerDataType::Group(group) = &layer.data {
					aggregate_insertions(group, path, responses);
				}
				path.pop();
			}
		}

		let mut responses = vec![DocumentResponse::InsertedLayer { path: path.clone() }];
		if let Ok(group) = self.group(&path) {
			aggregate_insertions(group, &mut path.clone(), &mut responses);
		}
		let selection_changed = self.layer(&path)?.has_selection();

		for response in responses {
			self.emit(response);
		}
		if selection_changed {
			self.emit_selection_changed();
		}
		Ok(path)
	}

	/// Detaches and drops the layer at `path` together with all of its descendants.
	pub fn remove(&mut self, path: &[LayerId]) -> Result<(), DocumentError> {
		let (parent, id) = split_path(path)?;
		let index = self.index_of(path)?;
		self.emit(DocumentResponse::AboutToRemoveLayer { path: path.to_vec(), index });

		let layer = self.group_mut(parent)?.remove_layer(id)?;
		log::debug!("Removed layer {path:?} ({})", layer.name);

		fn aggregate_deletions(group: &GroupLayer, path: &mut Vec<LayerId>, responses: &mut Vec<DocumentResponse>) {
			for (id, layer) in group.iter() {
				path.push(id);
				if let LayerDataType::Group(group) = &layer.data {
					aggregate_deletions(group, path, responses);
				}
				responses.push(DocumentResponse::RemovedLayer { path: path.clone() });
				path.pop();
			}
		}

		let mut responses = Vec::new();
		if let LayerDataType::Group(group) = &layer.data {
			aggregate_deletions(group, &mut path.to_vec(), &mut responses);
		}
		responses.push(DocumentResponse::RemovedLayer { path: path.to_vec() });
		let selection_changed = layer.has_selection();
		drop(layer);

		for response in responses {
			self.emit(response);
		}
		if selection_changed {
			self.emit_selection_changed();
		}
		Ok(())
	}

	/// Removes every layer. The root group stays.
	pub fn clear(&mut self) {
		let ids = self.root().layer_ids().to_vec();
		for id in ids.into_iter().rev() {
			if let Err(error) = self.remove(&[id]) {
				log::warn!("Failed to remove layer {id} while clearing the document: {error}");
			}
		}
	}

	pub fn rename_layer(&mut self, path: &[LayerId], name: impl Into<String>) -> Result<(), DocumentError> {
		self.layer_mut(path)?.name = name.into();
		self.emit(DocumentResponse::LayerChanged { path: path.to_vec() });
		Ok(())
	}

	pub fn set_layer_position(&mut self, path: &[LayerId], position: DVec2) -> Result<(), DocumentError> {
		self.layer_mut(path)?.position = position;
		self.emit(DocumentResponse::LayerChanged { path: path.to_vec() });
		Ok(())
	}

	/// Shows or hides a layer. Hiding deselects the layer and everything below it.
	pub fn set_layer_visibility(&mut self, path: &[LayerId], visible: bool) -> Result<(), DocumentError> {
		let layer = self.layer_mut(path)?;
		layer.visible = visible;

		let mut deselected = false;
		if !visible {
			deselect_subtree(layer, &mut deselected);
		}
		self.emit(DocumentResponse::LayerChanged { path: path.to_vec() });
		if deselected {
			self.emit_selection_changed();
		}
		Ok(())
	}

	/// Whether the layer and all of its ancestors are visible.
	pub fn is_effectively_visible(&self, path: &[LayerId]) -> Result<bool, DocumentError> {
		let mut visible = self.layer(path)?.visible;
		for depth in 1..path.len() {
			visible &= self.layer(&path[..depth])?.visible;
		}
		Ok(visible)
	}

	pub fn is_selected(&self, path: &[LayerId]) -> Result<bool, DocumentError> {
		Ok(self.layer(path)?.selected)
	}

	/// Selects or deselects a single layer, see [`Document::set_selection`].
	pub fn set_selected(&mut self, path: &[LayerId], selected: bool) -> Result<bool, DocumentError> {
		self.set_selection([(path, selected)])
	}

	/// Applies a batch of selection changes and emits at most one [`DocumentResponse::SelectionChanged`].
	///
	/// Hidden layers cannot be selected; requests to select them are ignored. Every path is validated before
	/// anything changes. Returns whether the selection changed.
	pub fn set_selection<'a>(&mut self, changes: impl IntoIterator<Item = (&'a [LayerId], bool)>) -> Result<bool, DocumentError> {
		let changes: Vec<(&[LayerId], bool)> = changes.into_iter().collect();
		let mut applicable = Vec::with_capacity(changes.len());
		for (path, selected) in changes {
			let selectable = self.is_effectively_visible(path)?;
			if selected && !selectable {
				log::trace!("Ignoring selection of hidden layer {path:?}");
				continue;
			}
			applicable.push((path, selected));
		}

		let mut changed = false;
		for (path, selected) in applicable {
			let layer = self.layer_mut(path)?;
			changed |= layer.selected != selected;
			layer.selected = selected;
		}

		if changed {
			self.emit_selection_changed();
		}
		Ok(changed)
	}

	/// Deselects every layer with at most one [`DocumentResponse::SelectionChanged`]. Returns whether anything was selected.
	pub fn clear_selection(&mut self) -> bool {
		let mut changed = false;
		for layer in self.root.layers_mut() {
			deselect_subtree(layer, &mut changed);
		}
		if changed {
			self.emit_selection_changed();
		}
		changed
	}

	/// Paths of the selected layers in pre-order.
	pub fn selected_layers(&self) -> Vec<Vec<LayerId>> {
		self.layer_paths().into_iter().filter(|path| self.layer(path).is_ok_and(|layer| layer.selected)).collect()
	}

	fn emit_selection_changed(&mut self) {
		let selected = self.selected_layers();
		self.emit(DocumentResponse::SelectionChanged { selected });
	}

	/// Combined transform from the layer at `path` to document space.
	pub fn multiply_transforms(&self, path: &[LayerId]) -> Result<DAffine2, DocumentError> {
		let mut transform = DAffine2::IDENTITY;
		for depth in 1..=path.len() {
			transform = transform * self.layer(&path[..depth])?.transform();
		}
		Ok(transform)
	}

	/// Bounds of the layer at `path` in document space.
	pub fn bounding_box(&self, path: &[LayerId]) -> Result<Option<[DVec2; 2]>, DocumentError> {
		let layer = self.layer(path)?;
		let transform = self.multiply_transforms(path)?;
		Ok(layer.data.inner().bounding_box(transform))
	}

	/// Bounds of everything that would be painted by [`Document::flatten`].
	pub fn visible_layers_bounding_box(&self) -> Option<[DVec2; 2]> {
		self.root().visible_bounding_box(DAffine2::IDENTITY)
	}

	/// Flattens with a renderer that has no fonts loaded. Use [`Renderer`] directly to render text glyphs.
	pub fn flatten(&self) -> Result<RgbaImage, RenderError> {
		Renderer::default().flatten(self)
	}
}

fn deselect_subtree(layer: &mut Layer, changed: &mut bool) {
	*changed |= layer.selected;
	layer.selected = false;
	if let LayerDataType::Group(group) = &mut layer.data {
		for child in group.layers_mut() {
			deselect_subtree(child, changed);
		}
	}
}

fn split_path(path: &[LayerId]) -> Result<(&[LayerId], LayerId), DocumentError> {
	let (id, path) = path.split_last().ok_or(DocumentError::InvalidPath)?;
	Ok((path, *id))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[derive(Default)]
	struct Recorder {
		responses: RefCell<Vec<DocumentResponse>>,
	}

	impl DocumentObserver for Recorder {
		fn handle_response(&self, response: &DocumentResponse) {
			self.responses.borrow_mut().push(response.clone());
		}
	}

	fn observed() -> (Document, Rc<Recorder>) {
		let mut document = Document::default();
		let recorder = Rc::new(Recorder::default());
		let observer: Weak<dyn DocumentObserver> = Rc::downgrade(&recorder) as Weak<dyn DocumentObserver>;
		document.add_observer(observer);
		(document, recorder)
	}

	fn image(name: &str) -> Layer {
		Layer::new_image(RgbaImage::new(1, 1), name)
	}

	#[test]
	fn append_emits_insert_pair() {
		let (mut document, recorder) = observed();
		document.append(&[], image("a")).unwrap();
		let path = document.append(&[], image("b")).unwrap();

		assert_eq!(path, vec![1]);
		assert_eq!(
			recorder.responses.borrow()[2..].to_vec(),
			vec![
				DocumentResponse::AboutToInsertLayer { parent: vec![], index: 1 },
				DocumentResponse::InsertedLayer { path: vec![1] },
			]
		);
	}

	#[test]
	fn appending_a_built_group_announces_descendants() {
		let (mut document, recorder) = observed();
		let mut group = Layer::new_group("group");
		let mut nested = Layer::new_group("nested");
		nested.as_group_mut().unwrap().add_layer(image("deep"));
		group.as_group_mut().unwrap().add_layer(image("child"));
		group.as_group_mut().unwrap().add_layer(nested);

		document.append(&[], group).unwrap();

		assert_eq!(
			*recorder.responses.borrow(),
			[
				DocumentResponse::AboutToInsertLayer { parent: vec![], index: 0 },
				DocumentResponse::InsertedLayer { path: vec![0] },
				DocumentResponse::InsertedLayer { path: vec![0, 0] },
				DocumentResponse::InsertedLayer { path: vec![0, 1] },
				DocumentResponse::InsertedLayer { path: vec![0, 1, 0] },
			]
		);
		assert_eq!(document.layer(&[0, 1, 0]).unwrap().name, "deep");
	}

	#[test]
	fn appending_into_a_non_group_fails() {
		let mut document = Document::default();
		let path = document.append(&[], image("leaf")).unwrap();
		assert_eq!(document.append(&path, image("child")), Err(DocumentError::NotAGroup));
	}

	#[test]
	fn remove_group_removes_descendants_first() {
		let (mut document, recorder) = observed();
		let group = document.append(&[], Layer::new_group("group")).unwrap();
		let child = document.append(&group, image("child")).unwrap();
		recorder.responses.borrow_mut().clear();

		document.remove(&group).unwrap();

		assert_eq!(
			*recorder.responses.borrow(),
			[
				DocumentResponse::AboutToRemoveLayer { path: group.clone(), index: 0 },
				DocumentResponse::RemovedLayer { path: child.clone() },
				DocumentResponse::RemovedLayer { path: group.clone() },
			]
		);
		assert!(document.layer(&child).is_err());
		assert!(document.root().is_empty());
	}

	#[test]
	fn root_cannot_be_removed() {
		let mut document = Document::default();
		assert_eq!(document.remove(&[]), Err(DocumentError::InvalidPath));
	}

	#[test]
	fn clear_keeps_the_root() {
		let (mut document, recorder) = observed();
		document.append(&[], image("a")).unwrap();
		document.append(&[], image("b")).unwrap();
		recorder.responses.borrow_mut().clear();

		document.clear();

		assert!(document.root().is_empty());
		assert!(document.group(&[]).is_ok());
		assert_eq!(document.layer(&[]), Err(DocumentError::InvalidPath));
		assert_eq!(recorder.responses.borrow().iter().filter(|response| matches!(response, DocumentResponse::RemovedLayer { .. })).count(), 2);
	}

	#[test]
	fn selection_batches_notify_once() {
		let (mut document, recorder) = observed();
		let a = document.append(&[], image("a")).unwrap();
		let b = document.append(&[], image("b")).unwrap();
		recorder.responses.borrow_mut().clear();

		let changed = document.set_selection([(a.as_slice(), true), (b.as_slice(), true)]).unwrap();

		assert!(changed);
		assert_eq!(*recorder.responses.borrow(), [DocumentResponse::SelectionChanged { selected: vec![a.clone(), b.clone()] }]);
		assert!(document.is_selected(&a).unwrap());
	}

	#[test]
	fn unchanged_selection_is_silent() {
		let (mut document, recorder) = observed();
		let a = document.append(&[], image("a")).unwrap();
		recorder.responses.borrow_mut().clear();

		assert!(!document.set_selected(&a, false).unwrap());
		assert!(recorder.responses.borrow().is_empty());
	}

	#[test]
	fn clearing_the_selection_notifies_once() {
		let (mut document, recorder) = observed();
		let group = document.append(&[], Layer::new_group("group")).unwrap();
		let child = document.append(&group, image("child")).unwrap();
		let top = document.append(&[], image("top")).unwrap();
		document.set_selection([(child.as_slice(), true), (top.as_slice(), true)]).unwrap();
		recorder.responses.borrow_mut().clear();

		assert!(document.clear_selection());

		assert_eq!(*recorder.responses.borrow(), [DocumentResponse::SelectionChanged { selected: vec![] }]);
		assert_eq!(document.selected_layers(), Vec::<Vec<LayerId>>::new());
		recorder.responses.borrow_mut().clear();
		assert!(!document.clear_selection());
		assert!(recorder.responses.borrow().is_empty());
	}

	#[test]
	fn invalid_batch_changes_nothing() {
		let mut document = Document::default();
		let a = document.append(&[], image("a")).unwrap();

		assert!(document.set_selection([(a.as_slice(), true), ([7].as_slice(), true)]).is_err());
		assert!(!document.is_selected(&a).unwrap());
	}

	#[test]
	fn hidden_layers_are_not_selectable() {
		let mut document = Document::default();
		let group = document.append(&[], Layer::new_group("group").with_visibility(false)).unwrap();
		let child = document.append(&group, image("child")).unwrap();

		assert!(!document.set_selected(&child, true).unwrap());
		assert!(!document.is_selected(&child).unwrap());
	}

	#[test]
	fn hiding_deselects() {
		let (mut document, recorder) = observed();
		let a = document.append(&[], image("a")).unwrap();
		document.set_selected(&a, true).unwrap();
		recorder.responses.borrow_mut().clear();

		document.set_layer_visibility(&a, false).unwrap();

		assert!(!document.is_selected(&a).unwrap());
		assert_eq!(
			*recorder.responses.borrow(),
			[DocumentResponse::LayerChanged { path: a.clone() }, DocumentResponse::SelectionChanged { selected: vec![] }]
		);
	}

	#[test]
	fn removing_a_selected_layer_updates_the_selection() {
		let (mut document, recorder) = observed();
		let a = document.append(&[], image("a")).unwrap();
		document.set_selected(&a, true).unwrap();
		recorder.responses.borrow_mut().clear();

		document.remove(&a).unwrap();

		assert_eq!(recorder.responses.borrow().last(), Some(&DocumentResponse::SelectionChanged { selected: vec![] }));
	}

	#[test]
	fn dropped_observers_are_pruned() {
		let (mut document, recorder) = observed();
		drop(recorder);
		document.append(&[], image("a")).unwrap();
		assert!(document.observers.is_empty());
	}

	#[test]
	fn nested_bounds_are_in_document_space() {
		let mut document = Document::default();
		let group = document.append(&[], Layer::new_group("group").with_position(DVec2::new(10., 10.))).unwrap();
		let child = document.append(&group, image("child").with_position(DVec2::new(1., 2.))).unwrap();

		assert_eq!(document.bounding_box(&child).unwrap(), Some([DVec2::new(11., 12.), DVec2::new(12., 13.)]));
		assert_eq!(document.bounding_box(&group).unwrap(), Some([DVec2::new(11., 12.), DVec2::new(12., 13.)]));
	}

	#[test]
	fn paths_are_pre_order() {
		let mut document = Document::default();
		let group = document.append(&[], Layer::new_group("group")).unwrap();
		document.append(&group, image("child")).unwrap();
		document.append(&[], image("top")).unwrap();

		assert_eq!(document.layer_paths(), vec![vec![0], vec![0, 0], vec![1]]);
	}
}
