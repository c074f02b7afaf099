use crate::error::ImportError;
use crate::foreign::ForeignLayer;

use glam::DVec2;
use image::RgbaImage;
use log::debug;
use strata_document::layers::layer_info::Layer;

/// Converts a pixel layer. Layers without pixels are skipped rather than reported.
pub fn convert_pixel_layer(layer: &ForeignLayer) -> Result<Option<Layer>, ImportError> {
	let Some(raster) = layer.raster.as_ref().filter(|raster| raster.width > 0 && raster.height > 0) else {
		debug!("Skipping pixel layer {:?} without pixels", layer.name);
		return Ok(None);
	};

	let expected = raster.width as usize * raster.height as usize * 4;
	let actual = raster.data.len();
	let image = RgbaImage::from_raw(raster.width, raster.height, raster.data.clone())
		.ok_or_else(|| ImportError::DecodeFailure(format!("a {}x{} raster needs {expected} bytes but {actual} were given", raster.width, raster.height)))?;

	let (left, top) = layer.offset;
	let converted = Layer::new_image(image, layer.name.clone())
		.with_position(DVec2::new(left as f64, top as f64))
		.with_visibility(layer.visible);
	Ok(Some(converted))
}
