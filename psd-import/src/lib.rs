//! # PSD import
//! Maps a decoded PSD layer tree onto a [`Document`]. Each foreign layer is converted on its own: one that
//! cannot be interpreted is left out and reported in [`PsdImport::diagnostics`] while its siblings are still
//! imported.

pub mod base64_serde;
pub mod error;
pub mod foreign;
pub mod pixel;
pub mod preferences;
pub mod shape;
pub mod text;

pub use error::ImportError;
pub use foreign::{ForeignDocument, ForeignLayer, ForeignLayerKind};
pub use preferences::ImportPreferences;

use glam::DVec2;
use log::{info, warn};
use strata_document::Document;
use strata_document::layers::group_layer::GroupLayer;
use strata_document::layers::layer_info::{Layer, LayerDataType};

/// A foreign layer that was left out of the import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDiagnostic {
	pub layer_name: String,
	/// Child indices leading to the layer in the foreign tree.
	pub foreign_path: Vec<usize>,
	pub error: ImportError,
}

#[derive(Debug)]
pub struct PsdImport {
	pub document: Document,
	pub diagnostics: Vec<ImportDiagnostic>,
}

impl PsdImport {
	pub fn is_complete(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

struct Importer<'a> {
	document_size: DVec2,
	preferences: &'a ImportPreferences,
	diagnostics: Vec<ImportDiagnostic>,
}

impl Importer<'_> {
	fn report(&mut self, layer: &ForeignLayer, foreign_path: &[usize], error: ImportError) {
		warn!("Skipping layer {:?} at {foreign_path:?}: {error}", layer.name);
		self.diagnostics.push(ImportDiagnostic {
			layer_name: layer.name.clone(),
			foreign_path: foreign_path.to_vec(),
			error,
		});
	}

	/// Converts a layer and its children, recording a diagnostic when the layer has to be dropped.
	fn import_layer(&mut self, layer: &ForeignLayer, foreign_path: &mut Vec<usize>) -> Option<Layer> {
		match self.convert_layer(layer, foreign_path) {
			Ok(converted) => converted,
			Err(error) => {
				self.report(layer, foreign_path, error);
				None
			}
		}
	}

	fn convert_layer(&mut self, layer: &ForeignLayer, foreign_path: &mut Vec<usize>) -> Result<Option<Layer>, ImportError> {
		match layer.kind {
			ForeignLayerKind::Pixel => pixel::convert_pixel_layer(layer),
			ForeignLayerKind::Shape => shape::convert_shape_layer(layer, self.document_size, self.preferences),
			ForeignLayerKind::Type => text::convert_type_layer(layer, self.preferences).map(Some),
			ForeignLayerKind::Group => Ok(self.convert_group(layer, foreign_path)),
			kind @ (ForeignLayerKind::SmartObject | ForeignLayerKind::Adjustment | ForeignLayerKind::Fill) => Err(ImportError::UnsupportedLayerKind(kind)),
		}
	}

	fn convert_group(&mut self, layer: &ForeignLayer, foreign_path: &mut Vec<usize>) -> Option<Layer> {
		let mut group = GroupLayer::default();
		for (index, child) in layer.children.iter().enumerate() {
			foreign_path.push(index);
			if let Some(converted) = self.import_layer(child, foreign_path) {
				group.add_layer(converted);
			}
			foreign_path.pop();
		}

		if group.is_empty() && !self.preferences.keep_empty_groups {
			info!("Dropping group {:?} which has no importable layers", layer.name);
			return None;
		}
		Some(Layer::new(LayerDataType::Group(group), layer.name.clone()).with_visibility(layer.visible))
	}
}

/// Builds a document from `foreign`, bottom-most layer first.
pub fn import_document(foreign: &ForeignDocument, preferences: &ImportPreferences) -> PsdImport {
	let mut importer = Importer {
		document_size: DVec2::new(foreign.width as f64, foreign.height as f64),
		preferences,
		diagnostics: Vec::new(),
	};
	let mut document = Document::default();

	let mut foreign_path = Vec::new();
	for (index, layer) in foreign.layers.iter().enumerate() {
		foreign_path.push(index);
		if let Some(converted) = importer.import_layer(layer, &mut foreign_path) {
			if let Err(error) = document.append(&[], converted) {
				importer.report(layer, &foreign_path, error.into());
			}
		}
		foreign_path.pop();
	}

	info!(
		"Imported {} of {} top-level layers from a {}x{} document with {} skipped",
		document.root().len(),
		foreign.layers.len(),
		foreign.width,
		foreign.height,
		importer.diagnostics.len()
	);
	PsdImport {
		document,
		diagnostics: importer.diagnostics,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::foreign::{ForeignRaster, TypeData};
	use pretty_assertions::assert_eq;
	use strata_document::layers::layer_info::LayerKind;

	fn pixel(name: &str) -> ForeignLayer {
		let mut layer = ForeignLayer::new(ForeignLayerKind::Pixel, name);
		layer.raster = Some(ForeignRaster { width: 1, height: 1, data: vec![10, 20, 30, 255] });
		layer
	}

	fn group(name: &str, children: Vec<ForeignLayer>) -> ForeignLayer {
		let mut layer = ForeignLayer::new(ForeignLayerKind::Group, name);
		layer.children = children;
		layer
	}

	fn foreign(layers: Vec<ForeignLayer>) -> ForeignDocument {
		ForeignDocument { width: 64, height: 32, layers }
	}

	fn kinds(group: &GroupLayer) -> Vec<LayerKind> {
		group.layers().iter().map(Layer::kind).collect()
	}

	#[test]
	fn groups_are_imported_recursively() {
		let _ = env_logger::builder().is_test(true).try_init();
		let outer = group("Outer", vec![pixel("Leaf"), group("Inner", vec![pixel("Nested leaf")])]);

		let PsdImport { mut document, diagnostics } = import_document(&foreign(vec![outer]), &ImportPreferences::default());

		assert_eq!(diagnostics, vec![]);
		assert_eq!(kinds(document.root()), vec![LayerKind::Group]);
		assert_eq!(kinds(document.group(&[0]).unwrap()), vec![LayerKind::Image, LayerKind::Group]);
		assert_eq!(kinds(document.group(&[0, 1]).unwrap()), vec![LayerKind::Image]);
		assert_eq!(document.layer(&[0, 1, 0]).unwrap().name, "Nested leaf");

		document.remove(&[0]).unwrap();
		assert!(document.root().is_empty());
		assert_eq!(document.layer_paths(), Vec::<Vec<u64>>::new());
	}

	#[test]
	fn unsupported_layers_are_skipped_with_a_diagnostic() {
		let adjustment = ForeignLayer::new(ForeignLayerKind::Adjustment, "Curves");
		let layers = vec![pixel("Below"), group("Folder", vec![adjustment, pixel("Kept")]), pixel("Above")];

		let import = import_document(&foreign(layers), &ImportPreferences::default());

		assert!(!import.is_complete());
		assert_eq!(
			import.diagnostics,
			vec![ImportDiagnostic {
				layer_name: "Curves".to_string(),
				foreign_path: vec![1, 0],
				error: ImportError::UnsupportedLayerKind(ForeignLayerKind::Adjustment),
			}]
		);
		let names: Vec<_> = import.document.root().layers().iter().map(|layer| layer.name.as_str()).collect();
		assert_eq!(names, ["Below", "Folder", "Above"]);
		assert_eq!(import.document.group(&[1]).unwrap().len(), 1);
	}

	#[test]
	fn malformed_text_does_not_abort_the_import() {
		let mut broken = ForeignLayer::new(ForeignLayerKind::Type, "Broken");
		broken.text = Some(TypeData {
			engine_dict: Default::default(),
			font_set: vec![],
		});
		if let Some(text) = &mut broken.text {
			text.engine_dict.editor.text = "A\rB".to_string();
			text.engine_dict.style_run.run_length_array = vec![3];
		}

		let import = import_document(&foreign(vec![broken, pixel("Fine")]), &ImportPreferences::default());

		assert_eq!(import.diagnostics.len(), 1);
		assert!(matches!(import.diagnostics[0].error, ImportError::InvalidFormat(_)));
		assert_eq!(import.document.root().len(), 1);
	}

	#[test]
	fn empty_groups_follow_preferences() {
		let layers = vec![group("Empty", vec![]), group("Emptied", vec![ForeignLayer::new(ForeignLayerKind::Fill, "Solid")])];

		let kept = import_document(&foreign(layers.clone()), &ImportPreferences::default());
		assert_eq!(kept.document.root().len(), 2);

		let preferences = ImportPreferences {
			keep_empty_groups: false,
			..Default::default()
		};
		let dropped = import_document(&foreign(layers), &preferences);
		assert!(dropped.document.root().is_empty());
		assert_eq!(dropped.diagnostics.len(), 1);
	}

	#[test]
	fn hidden_layers_stay_hidden() {
		let mut hidden = group("Hidden", vec![pixel("Inside")]);
		hidden.visible = false;

		let import = import_document(&foreign(vec![hidden]), &ImportPreferences::default());

		assert!(!import.document.layer(&[0]).unwrap().visible);
		assert!(import.document.layer(&[0, 0]).unwrap().visible);
		assert!(!import.document.is_effectively_visible(&[0, 0]).unwrap());
	}
}
