use strata_document::layers::group_layer::GroupLayer;
use strata_document::layers::layer_info::{Layer, LayerDataType};
use strata_document::{Document, LayerId};

use serde::Serialize;

/// Printable description of one layer and its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
	pub path: Vec<LayerId>,
	pub name: String,
	pub kind: String,
	pub position: [f64; 2],
	pub visible: bool,
	/// Document space bounds as `[min, max]`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bounds: Option<[[f64; 2]; 2]>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<LayerSummary>,
}

fn content(layer: &Layer) -> Option<String> {
	match &layer.data {
		LayerDataType::Image(image) => Some(format!("{}x{} pixels", image.raster.width(), image.raster.height())),
		LayerDataType::Shape(shape) => Some(format!("{} sub-paths", shape.subpaths.len())),
		LayerDataType::Text(text) => Some(text.text()),
		LayerDataType::Group(_) => None,
	}
}

fn summarize_group(document: &Document, group: &GroupLayer, path: &mut Vec<LayerId>) -> Vec<LayerSummary> {
	let mut summaries = Vec::with_capacity(group.len());
	for (id, layer) in group.iter() {
		path.push(id);
		let children = match &layer.data {
			LayerDataType::Group(group) => summarize_group(document, group, path),
			_ => Vec::new(),
		};
		summaries.push(LayerSummary {
			path: path.clone(),
			name: layer.name.clone(),
			kind: layer.kind().to_string(),
			position: layer.position.to_array(),
			visible: layer.visible,
			bounds: document.bounding_box(path).ok().flatten().map(|[min, max]| [min.to_array(), max.to_array()]),
			content: content(layer),
			children,
		});
		path.pop();
	}
	summaries
}

/// Summaries of the top-level layers, bottom-most first.
pub fn summarize(document: &Document) -> Vec<LayerSummary> {
	summarize_group(document, document.root(), &mut Vec::new())
}
