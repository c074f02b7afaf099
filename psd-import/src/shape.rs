use crate::error::ImportError;
use crate::foreign::{ForeignLayer, ForeignSubpath, Knot};
use crate::preferences::ImportPreferences;

use glam::DVec2;
use log::debug;
use strata_document::layers::layer_info::{Layer, LayerDataType};
use strata_document::layers::shape_layer::ShapeLayer;
use strata_document::layers::vector::{ManipulatorGroup, Subpath};

/// Scales a normalized `[y, x]` pair to document pixels.
fn to_document_space([y, x]: [f64; 2], document_size: DVec2) -> DVec2 {
	DVec2::new(x * document_size.x, y * document_size.y)
}

/// Every knot keeps both control points, so consecutive knots always join with a cubic segment from the
/// leaving control of the first to the preceding control of the second. Closed sub-paths get the same
/// segment from the last knot back to the first.
fn convert_knot(knot: &Knot, document_size: DVec2) -> ManipulatorGroup {
	ManipulatorGroup::new(
		to_document_space(knot.anchor, document_size),
		Some(to_document_space(knot.preceding, document_size)),
		Some(to_document_space(knot.leaving, document_size)),
	)
}

pub fn convert_subpath(subpath: &ForeignSubpath, document_size: DVec2) -> Subpath {
	let groups = subpath.knots.iter().map(|knot| convert_knot(knot, document_size)).collect();
	Subpath::new(groups, subpath.closed)
}

/// Converts a shape layer. The outline is already in document space, so the layer offset is not applied.
pub fn convert_shape_layer(layer: &ForeignLayer, document_size: DVec2, preferences: &ImportPreferences) -> Result<Option<Layer>, ImportError> {
	let Some(vector_mask) = &layer.vector_mask else {
		debug!("Skipping shape layer {:?} without a vector mask", layer.name);
		return Ok(None);
	};

	let subpaths: Vec<_> = vector_mask.paths.iter().filter(|path| !path.knots.is_empty()).map(|path| convert_subpath(path, document_size)).collect();
	if subpaths.is_empty() {
		debug!("Skipping shape layer {:?} whose vector mask has no knots", layer.name);
		return Ok(None);
	}

	let shape = ShapeLayer::new(subpaths, preferences.shape_style);
	Ok(Some(Layer::new(LayerDataType::Shape(shape), layer.name.clone()).with_visibility(layer.visible)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::foreign::{ForeignLayerKind, VectorMask};
	use pretty_assertions::assert_eq;
	use strata_document::color::Color;
	use strata_document::layers::style::Fill;
	use strata_document::layers::vector::{Bezier, BezierHandles};

	const DOCUMENT_SIZE: DVec2 = DVec2::new(100., 200.);

	fn shape_layer(paths: Vec<ForeignSubpath>) -> ForeignLayer {
		let mut layer = ForeignLayer::new(ForeignLayerKind::Shape, "Outline");
		layer.offset = (40, 40);
		layer.vector_mask = Some(VectorMask { paths });
		layer
	}

	fn segments(layer: &Layer) -> Vec<Bezier> {
		let LayerDataType::Shape(shape) = &layer.data else { panic!("expected a shape layer") };
		shape.subpaths.iter().flat_map(|subpath| subpath.iter().collect::<Vec<_>>()).collect()
	}

	#[test]
	fn knots_become_cubic_segments_scaled_per_axis() {
		let first = Knot { preceding: [0., 0.], anchor: [0., 0.], leaving: [0.25, 0.] };
		let second = Knot { preceding: [0.75, 1.], anchor: [1., 1.], leaving: [1., 1.] };
		let layer = shape_layer(vec![ForeignSubpath { closed: false, knots: vec![first, second] }]);

		let layer = convert_shape_layer(&layer, DOCUMENT_SIZE, &ImportPreferences::default()).unwrap().unwrap();

		let expected = Bezier::from_cubic_dvec2(DVec2::new(0., 0.), DVec2::new(0., 50.), DVec2::new(100., 150.), DVec2::new(100., 200.));
		assert_eq!(segments(&layer), vec![expected]);
		assert_eq!(layer.position, DVec2::ZERO);
	}

	#[test]
	fn closed_subpaths_get_a_closing_segment() {
		let knots = vec![Knot::corner([0., 0.]), Knot::corner([0., 1.]), Knot::corner([1., 1.])];
		let layer = shape_layer(vec![ForeignSubpath { closed: true, knots }]);

		let layer = convert_shape_layer(&layer, DOCUMENT_SIZE, &ImportPreferences::default()).unwrap().unwrap();
		let segments = segments(&layer);

		assert_eq!(segments.len(), 3);
		let closing = segments[2];
		assert_eq!((closing.start, closing.end), (DVec2::new(100., 200.), DVec2::ZERO));
		assert!(matches!(closing.handles, BezierHandles::Cubic { .. }));
	}

	#[test]
	fn empty_subpaths_and_missing_masks_contribute_nothing() {
		let preferences = ImportPreferences::default();

		let mut no_mask = shape_layer(vec![]);
		no_mask.vector_mask = None;
		assert_eq!(convert_shape_layer(&no_mask, DOCUMENT_SIZE, &preferences).unwrap(), None);

		let knotless = shape_layer(vec![ForeignSubpath::default(), ForeignSubpath::default()]);
		assert_eq!(convert_shape_layer(&knotless, DOCUMENT_SIZE, &preferences).unwrap(), None);

		let mixed = shape_layer(vec![ForeignSubpath::default(), ForeignSubpath { closed: false, knots: vec![Knot::corner([0.5, 0.5])] }]);
		let LayerDataType::Shape(shape) = convert_shape_layer(&mixed, DOCUMENT_SIZE, &preferences).unwrap().unwrap().data else {
			panic!("expected a shape layer")
		};
		assert_eq!(shape.subpaths.len(), 1);
		assert_eq!(shape.subpaths[0].manipulator_groups()[0].anchor, DVec2::new(50., 100.));
	}

	#[test]
	fn shapes_use_the_preferred_style() {
		let mut preferences = ImportPreferences::default();
		preferences.shape_style.clear_stroke();
		preferences.shape_style.set_fill(Fill::new(Color::from_rgb8(20, 40, 60)));
		let layer = shape_layer(vec![ForeignSubpath { closed: true, knots: vec![Knot::corner([0., 0.]), Knot::corner([1., 1.])] }]);

		let LayerDataType::Shape(shape) = convert_shape_layer(&layer, DOCUMENT_SIZE, &preferences).unwrap().unwrap().data else {
			panic!("expected a shape layer")
		};

		assert_eq!(shape.style.stroke(), None);
		assert_eq!(shape.style.fill(), Some(Fill::new(Color::from_rgb8(20, 40, 60))));
	}
}
