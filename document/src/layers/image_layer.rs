use super::layer_info::{LayerData, transform_rect};
use crate::error::RenderError;
use crate::render::{Canvas, to_skia_transform};

use glam::{DAffine2, DVec2};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat, RgbaImage};
use resvg::tiny_skia::{ColorU8, Pixmap, PixmapPaint};

/// A raster layer. Pixels are straight-alpha RGBA8 and the layer's origin is the raster's top left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
	pub raster: RgbaImage,
}

impl LayerData for ImageLayer {
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		let Some(source) = self.to_pixmap() else { return Ok(()) };

		canvas.pixmap_mut().draw_pixmap(0, 0, source.as_ref(), &PixmapPaint::default(), to_skia_transform(transform), None);
		Ok(())
	}

	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		if self.is_empty() {
			return None;
		}
		Some(transform_rect(transform, [DVec2::ZERO, self.dimensions()]))
	}
}

impl ImageLayer {
	pub fn new(raster: RgbaImage) -> Self {
		Self { raster }
	}

	pub fn dimensions(&self) -> DVec2 {
		DVec2::new(self.raster.width() as f64, self.raster.height() as f64)
	}

	pub fn is_empty(&self) -> bool {
		self.raster.width() == 0 || self.raster.height() == 0
	}

	/// Encodes the raster as PNG. An empty raster has no PNG form and encodes to no bytes at all.
	pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
		let mut png = Vec::new();
		if self.is_empty() {
			return Ok(png);
		}
		let encoder = PngEncoder::new(&mut png);
		encoder.write_image(self.raster.as_raw(), self.raster.width(), self.raster.height(), ExtendedColorType::Rgba8)?;
		Ok(png)
	}

	/// Decodes the output of [`ImageLayer::to_png`], so no bytes give an empty raster.
	pub fn from_png(bytes: &[u8]) -> Result<Self, ImageError> {
		if bytes.is_empty() {
			return Ok(Self::new(RgbaImage::new(0, 0)));
		}
		let raster = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
		Ok(Self::new(raster))
	}

	/// Premultiplied copy for compositing, `None` when the raster is empty.
	fn to_pixmap(&self) -> Option<Pixmap> {
		let mut pixmap = Pixmap::new(self.raster.width(), self.raster.height())?;
		for (target, source) in pixmap.pixels_mut().iter_mut().zip(self.raster.pixels()) {
			let [red, green, blue, alpha] = source.0;
			*target = ColorU8::from_rgba(red, green, blue, alpha).premultiply();
		}
		Some(pixmap)
	}
}
