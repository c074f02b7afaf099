//! Flattening a document into a single raster.

use crate::Document;
use crate::error::RenderError;

use glam::{DAffine2, DVec2};
use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::path::Path;

pub fn to_skia_transform(transform: DAffine2) -> Transform {
	let [a, b, c, d, e, f] = transform.to_cols_array().map(|value| value as f32);
	Transform::from_row(a, b, c, d, e, f)
}

/// The surface layers paint themselves into.
pub struct Canvas<'a> {
	pixmap: Pixmap,
	svg_options: &'a usvg::Options<'static>,
}

impl<'a> Canvas<'a> {
	pub fn new(width: u32, height: u32, svg_options: &'a usvg::Options<'static>) -> Result<Self, RenderError> {
		let pixmap = Pixmap::new(width, height).ok_or(RenderError::CanvasAllocation { width, height })?;
		Ok(Self { pixmap, svg_options })
	}

	pub fn pixmap_mut(&mut self) -> &mut Pixmap {
		&mut self.pixmap
	}

	pub fn svg_options(&self) -> &usvg::Options<'static> {
		self.svg_options
	}

	/// Converts the premultiplied canvas back to straight alpha.
	pub fn into_image(self) -> RgbaImage {
		let (width, height) = (self.pixmap.width(), self.pixmap.height());
		let mut data = Vec::with_capacity(width as usize * height as usize * 4);
		for pixel in self.pixmap.pixels() {
			let color = pixel.demultiply();
			data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
		}
		RgbaImage::from_raw(width, height, data).unwrap_or_else(|| RgbaImage::new(width, height))
	}
}

/// Composes documents into rasters. Holds the font database used for text layers.
pub struct Renderer {
	svg_options: usvg::Options<'static>,
}

impl Default for Renderer {
	fn default() -> Self {
		Self {
			svg_options: usvg::Options::default(),
		}
	}
}

impl Renderer {
	pub fn with_system_fonts() -> Self {
		let mut renderer = Self::default();
		renderer.svg_options.fontdb_mut().load_system_fonts();
		log::debug!("Loaded {} system font faces", renderer.svg_options.fontdb.len());
		renderer
	}

	pub fn load_font_dir(&mut self, directory: &Path) {
		self.svg_options.fontdb_mut().load_fonts_dir(directory);
	}

	/// Paints every visible layer back to front into a transparent raster covering their union bounding box.
	///
	/// The raster's top left pixel corresponds to the floor of the box's minimum corner. Hidden layers and their
	/// subtrees neither paint nor contribute to the size. An empty document gives a 0x0 raster.
	pub fn flatten(&self, document: &Document) -> Result<RgbaImage, RenderError> {
		let Some([min, max]) = document.visible_layers_bounding_box() else {
			return Ok(RgbaImage::new(0, 0));
		};
		let origin = min.floor();
		let extent = (max.ceil() - origin).max(DVec2::ONE);
		if !extent.is_finite() || extent.x > u32::MAX as f64 || extent.y > u32::MAX as f64 {
			return Err(RenderError::TooLarge(extent.to_array()));
		}
		let (width, height) = (extent.x as u32, extent.y as u32);
		log::debug!("Flattening document into a {width}x{height} raster with origin {origin}");

		let mut canvas = Canvas::new(width, height, &self.svg_options)?;
		let transform = DAffine2::from_translation(-origin);
		for layer in document.root().layers() {
			layer.render(&mut canvas, transform)?;
		}
		Ok(canvas.into_image())
	}
}
