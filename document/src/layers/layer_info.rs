use super::group_layer::GroupLayer;
use super::image_layer::ImageLayer;
use super::shape_layer::ShapeLayer;
use super::style::PathStyle;
use super::text_layer::{Paragraph, TextLayer};
use super::vector::Subpath;
use crate::DocumentError;
use crate::error::RenderError;
use crate::render::Canvas;

use glam::{DAffine2, DVec2};
use image::RgbaImage;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LayerDataType {
	Image(ImageLayer),
	Shape(ShapeLayer),
	Text(TextLayer),
	Group(GroupLayer),
}

impl LayerDataType {
	pub fn inner(&self) -> &dyn LayerData {
		match self {
			LayerDataType::Image(image) => image,
			LayerDataType::Shape(shape) => shape,
			LayerDataType::Text(text) => text,
			LayerDataType::Group(group) => group,
		}
	}

	pub fn kind(&self) -> LayerKind {
		match self {
			LayerDataType::Image(_) => LayerKind::Image,
			LayerDataType::Shape(_) => LayerKind::Shape,
			LayerDataType::Text(_) => LayerKind::Text,
			LayerDataType::Group(_) => LayerKind::Group,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
	Image,
	Shape,
	Text,
	Group,
}

impl fmt::Display for LayerKind {
	fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			LayerKind::Image => "Image",
			LayerKind::Shape => "Shape",
			LayerKind::Text => "Text",
			LayerKind::Group => "Group",
		};
		formatter.write_str(name)
	}
}

pub trait LayerData {
	/// Paints the layer into `canvas`, with `transform` mapping layer space to canvas pixels.
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError>;

	/// Axis-aligned bounds after applying `transform`, or `None` for a layer without extent.
	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]>;
}

impl LayerData for LayerDataType {
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		self.inner().render(canvas, transform)
	}

	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		self.inner().bounding_box(transform)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
	pub visible: bool,
	pub name: String,
	pub data: LayerDataType,
	/// Offset of the layer's local origin within its parent.
	pub position: DVec2,
	/// Session-only state, never written to a project file.
	pub selected: bool,
}

impl Layer {
	pub fn new(data: LayerDataType, name: impl Into<String>) -> Self {
		Self {
			visible: true,
			name: name.into(),
			data,
			position: DVec2::ZERO,
			selected: false,
		}
	}

	pub fn new_image(raster: RgbaImage, name: impl Into<String>) -> Self {
		Self::new(LayerDataType::Image(ImageLayer::new(raster)), name)
	}

	pub fn new_shape(subpaths: Vec<Subpath>, name: impl Into<String>) -> Self {
		Self::new(LayerDataType::Shape(ShapeLayer::new(subpaths, PathStyle::default())), name)
	}

	pub fn new_text(paragraphs: Vec<Paragraph>, name: impl Into<String>) -> Self {
		Self::new(LayerDataType::Text(TextLayer::new(paragraphs)), name)
	}

	pub fn new_group(name: impl Into<String>) -> Self {
		Self::new(LayerDataType::Group(GroupLayer::default()), name)
	}

	pub fn with_position(mut self, position: DVec2) -> Self {
		self.position = position;
		self
	}

	pub fn with_visibility(mut self, visible: bool) -> Self {
		self.visible = visible;
		self
	}

	pub fn kind(&self) -> LayerKind {
		self.data.kind()
	}

	pub fn transform(&self) -> DAffine2 {
		DAffine2::from_translation(self.position)
	}

	/// Depth-first iteration over this layer and all of its descendants.
	pub fn iter(&self) -> LayerIter<'_> {
		LayerIter { stack: vec![self] }
	}

	pub fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		if !self.visible {
			return Ok(());
		}
		self.data.render(canvas, transform * self.transform())
	}

	/// Bounds of the layer placed with `transform` as its parent's transform.
	pub fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		self.data.bounding_box(transform * self.transform())
	}

	/// Like [`Layer::bounding_box`] but ignoring anything hidden, which is what gets painted.
	pub fn visible_bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		if !self.visible {
			return None;
		}
		let transform = transform * self.transform();
		match &self.data {
			LayerDataType::Group(group) => group.visible_bounding_box(transform),
			data => data.bounding_box(transform),
		}
	}

	pub fn as_group(&self) -> Result<&GroupLayer, DocumentError> {
		match &self.data {
			LayerDataType::Group(group) => Ok(group),
			_ => Err(DocumentError::NotAGroup),
		}
	}

	pub fn as_group_mut(&mut self) -> Result<&mut GroupLayer, DocumentError> {
		match &mut self.data {
			LayerDataType::Group(group) => Ok(group),
			_ => Err(DocumentError::NotAGroup),
		}
	}

	/// Whether this layer or any descendant is selected.
	pub fn has_selection(&self) -> bool {
		self.iter().any(|layer| layer.selected)
	}
}

impl<'a> IntoIterator for &'a Layer {
	type Item = &'a Layer;
	type IntoIter = LayerIter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[derive(Debug, Default)]
pub struct LayerIter<'a> {
	pub stack: Vec<&'a Layer>,
}

impl<'a> Iterator for LayerIter<'a> {
	type Item = &'a Layer;

	fn next(&mut self) -> Option<Self::Item> {
		let layer = self.stack.pop()?;
		if let LayerDataType::Group(group) = &layer.data {
			self.stack.extend(group.layers().iter().rev());
		}
		Some(layer)
	}
}

/// Smallest box containing every box in `boxes`.
pub fn union_bounding_boxes(boxes: impl IntoIterator<Item = [DVec2; 2]>) -> Option<[DVec2; 2]> {
	boxes.into_iter().reduce(|[min_a, max_a], [min_b, max_b]| [min_a.min(min_b), max_a.max(max_b)])
}

/// Bounds of the four corners of `[min, max]` after `transform`.
pub fn transform_rect(transform: DAffine2, [min, max]: [DVec2; 2]) -> [DVec2; 2] {
	let corners = [min, DVec2::new(max.x, min.y), max, DVec2::new(min.x, max.y)].map(|corner| transform.transform_point2(corner));
	let first = [corners[0], corners[0]];
	corners.iter().fold(first, |[low, high], &corner| [low.min(corner), high.max(corner)])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn iteration_is_pre_order_back_to_front() {
		let mut outer = Layer::new_group("outer");
		let mut inner = Layer::new_group("inner");
		inner.as_group_mut().unwrap().add_layer(Layer::new_image(RgbaImage::new(1, 1), "deep"));
		outer.as_group_mut().unwrap().add_layer(inner);
		outer.as_group_mut().unwrap().add_layer(Layer::new_image(RgbaImage::new(1, 1), "front"));

		let names: Vec<_> = outer.iter().map(|layer| layer.name.as_str()).collect();
		assert_eq!(names, ["outer", "inner", "deep", "front"]);
	}

	#[test]
	fn hidden_layers_have_no_visible_bounds() {
		let layer = Layer::new_image(RgbaImage::new(4, 4), "hidden").with_visibility(false);
		assert!(layer.bounding_box(DAffine2::IDENTITY).is_some());
		assert!(layer.visible_bounding_box(DAffine2::IDENTITY).is_none());
	}

	#[test]
	fn rect_transform() {
		let bounds = transform_rect(DAffine2::from_translation(DVec2::new(5., -5.)), [DVec2::ZERO, DVec2::ONE]);
		assert_eq!(bounds, [DVec2::new(5., -5.), DVec2::new(6., -4.)]);
	}
}
