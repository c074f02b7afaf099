use super::layer_info::{Layer, LayerData, LayerDataType, union_bounding_boxes};
use crate::error::RenderError;
use crate::render::Canvas;
use crate::{DocumentError, LayerId};

use glam::{DAffine2, DVec2};

/// An ordered list of child layers, back-most first.
///
/// Children are owned here and addressed by ids that are unique within this group and never reused.
/// Appending to a group that is not yet attached to a document is allowed.
#[derive(Debug, Clone, Default)]
pub struct GroupLayer {
	next_assignment_id: LayerId,
	layer_ids: Vec<LayerId>,
	layers: Vec<Layer>,
}

/// Groups are equal when their children are, whatever ids those children were given.
impl PartialEq for GroupLayer {
	fn eq(&self, other: &Self) -> bool {
		self.layers == other.layers
	}
}

impl LayerData for GroupLayer {
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		for layer in &self.layers {
			layer.render(canvas, transform)?;
		}
		Ok(())
	}

	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		union_bounding_boxes(self.layers.iter().filter_map(|layer| layer.bounding_box(transform)))
	}
}

impl GroupLayer {
	/// Appends `layer` in front of the existing children and returns its new id.
	pub fn add_layer(&mut self, layer: Layer) -> LayerId {
		let id = self.next_assignment_id;
		self.layers.push(layer);
		self.layer_ids.push(id);
		self.next_assignment_id += 1;
		id
	}

	pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, DocumentError> {
		let position = self.position_of_layer(id).ok_or_else(|| DocumentError::LayerNotFound(vec![id]))?;
		self.layer_ids.remove(position);
		Ok(self.layers.remove(position))
	}

	/// Z-order index of the child with `id`.
	pub fn position_of_layer(&self, id: LayerId) -> Option<usize> {
		self.layer_ids.iter().position(|&candidate| candidate == id)
	}

	pub fn layer_ids(&self) -> &[LayerId] {
		self.layer_ids.as_slice()
	}

	pub fn layers(&self) -> &[Layer] {
		self.layers.as_slice()
	}

	pub fn layers_mut(&mut self) -> &mut [Layer] {
		self.layers.as_mut_slice()
	}

	pub fn iter(&self) -> impl DoubleEndedIterator<Item = (LayerId, &Layer)> {
		self.layer_ids.iter().copied().zip(self.layers.iter())
	}

	pub fn len(&self) -> usize {
		self.layers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.layers.is_empty()
	}

	pub fn layer(&self, id: LayerId) -> Option<&Layer> {
		let position = self.position_of_layer(id)?;
		Some(&self.layers[position])
	}

	pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
		let position = self.position_of_layer(id)?;
		Some(&mut self.layers[position])
	}

	pub fn group(&self, id: LayerId) -> Option<&GroupLayer> {
		match self.layer(id) {
			Some(Layer {
				data: LayerDataType::Group(group), ..
			}) => Some(group),
			_ => None,
		}
	}

	pub fn group_mut(&mut self, id: LayerId) -> Option<&mut GroupLayer> {
		match self.layer_mut(id) {
			Some(Layer {
				data: LayerDataType::Group(group), ..
			}) => Some(group),
			_ => None,
		}
	}

	/// Union of the bounds of visible children, skipping hidden subtrees entirely.
	pub fn visible_bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		union_bounding_boxes(self.layers.iter().filter_map(|layer| layer.visible_bounding_box(transform)))
	}
}
