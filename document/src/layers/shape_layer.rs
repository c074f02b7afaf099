use super::layer_info::LayerData;
use super::style::PathStyle;
use super::vector::{BezierHandles, Subpath};
use crate::color::Color;
use crate::error::RenderError;
use crate::render::{Canvas, to_skia_transform};

use glam::{DAffine2, DVec2};
use kurbo::{Affine, Shape as KurboShape};
use resvg::tiny_skia::{self, FillRule, Paint, PathBuilder};

fn glam_to_kurbo(transform: DAffine2) -> Affine {
	Affine::new(transform.to_cols_array())
}

/// A vector layer made of one or more sub-paths sharing a single style.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLayer {
	pub subpaths: Vec<Subpath>,
	pub style: PathStyle,
}

impl LayerData for ShapeLayer {
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		let Some(path) = self.to_skia_path() else { return Ok(()) };
		let transform = to_skia_transform(transform);

		if let Some(fill) = self.style.fill() {
			let paint = solid_paint(fill.color());
			canvas.pixmap_mut().fill_path(&path, &paint, FillRule::Winding, transform, None);
		}
		if let Some(stroke) = self.style.stroke() {
			let paint = solid_paint(stroke.color());
			let stroke = tiny_skia::Stroke {
				width: stroke.width(),
				..Default::default()
			};
			canvas.pixmap_mut().stroke_path(&path, &paint, &stroke, transform, None);
		}
		Ok(())
	}

	/// Sub-paths without segments paint nothing and are left out.
	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		let affine = glam_to_kurbo(transform);
		let kurbo::Rect { x0, y0, x1, y1 } = self
			.subpaths
			.iter()
			.filter(|subpath| subpath.len_segments() > 0)
			.map(|subpath| (affine * subpath.to_bez_path()).bounding_box())
			.reduce(|bounds, other| bounds.union(other))?;

		let overhang = self.style.stroke_overhang();
		Some([DVec2::new(x0 - overhang, y0 - overhang), DVec2::new(x1 + overhang, y1 + overhang)])
	}
}

impl ShapeLayer {
	/// Builds a shape, dropping sub-paths without any anchors.
	pub fn new(subpaths: Vec<Subpath>, style: PathStyle) -> Self {
		let subpaths = subpaths.into_iter().filter(|subpath| !subpath.is_empty()).collect();
		Self { subpaths, style }
	}

	fn to_skia_path(&self) -> Option<tiny_skia::Path> {
		let mut builder = PathBuilder::new();
		for subpath in &self.subpaths {
			let Some(first) = subpath.manipulator_groups().first() else { continue };
			builder.move_to(first.anchor.x as f32, first.anchor.y as f32);

			for segment in subpath.iter() {
				let end = segment.end.as_vec2();
				match segment.handles {
					BezierHandles::Linear => builder.line_to(end.x, end.y),
					BezierHandles::Quadratic { handle } => {
						let handle = handle.as_vec2();
						builder.quad_to(handle.x, handle.y, end.x, end.y)
					}
					BezierHandles::Cubic { handle_start, handle_end } => {
						let (start, finish) = (handle_start.as_vec2(), handle_end.as_vec2());
						builder.cubic_to(start.x, start.y, finish.x, finish.y, end.x, end.y)
					}
				}
			}
			if subpath.closed {
				builder.close();
			}
		}
		builder.finish()
	}
}

fn solid_paint(color: Color) -> Paint<'static> {
	let mut paint = Paint::default();
	paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
	paint.anti_alias = true;
	paint
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Document;
	use crate::layers::layer_info::Layer;
	use crate::layers::style::Stroke;
	use crate::layers::vector::ManipulatorGroup;
	use image::{Rgba, RgbaImage};

	fn square() -> Subpath {
		let corners = [(0., 0.), (10., 0.), (10., 10.), (0., 10.)];
		Subpath::new(corners.into_iter().map(|(x, y)| ManipulatorGroup::new_anchor(DVec2::new(x, y))).collect(), true)
	}

	#[test]
	fn empty_subpaths_are_dropped() {
		let shape = ShapeLayer::new(vec![Subpath::default(), square()], PathStyle::default());
		assert_eq!(shape.subpaths.len(), 1);
	}

	#[test]
	fn bounds_include_half_the_stroke() {
		let shape = ShapeLayer::new(vec![square()], PathStyle::new(Some(Stroke::new(Color::BLACK, 2.)), None));
		let bounds = shape.bounding_box(DAffine2::IDENTITY).unwrap();
		assert_eq!(bounds, [DVec2::new(-1., -1.), DVec2::new(11., 11.)]);
	}

	#[test]
	fn lone_anchors_do_not_widen_the_bounds() {
		let lone = Subpath::new(vec![ManipulatorGroup::new_anchor(DVec2::new(40., 40.))], false);
		let shape = ShapeLayer::new(vec![lone.clone(), square()], PathStyle::default());
		let bounds = shape.bounding_box(DAffine2::from_translation(DVec2::new(5., 5.))).unwrap();
		let overhang = shape.style.stroke_overhang();
		assert_eq!(bounds, [DVec2::splat(5. - overhang), DVec2::splat(15. + overhang)]);

		let only_lone = ShapeLayer::new(vec![lone], PathStyle::default());
		assert_eq!(only_lone.bounding_box(DAffine2::IDENTITY), None);
	}

	#[test]
	fn single_knot_shapes_do_not_grow_the_flattened_raster() {
		let mut document = Document::default();
		document.append(&[], Layer::new_image(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])), "dot").with_position(DVec2::new(50., 50.))).unwrap();
		let lone = Subpath::new(vec![ManipulatorGroup::new_anchor(DVec2::ZERO)], false);
		document.append(&[], Layer::new_shape(vec![lone], "point").with_position(DVec2::new(51., 51.))).unwrap();

		assert_eq!(document.visible_layers_bounding_box(), Some([DVec2::new(50., 50.), DVec2::new(52., 52.)]));
		assert_eq!(document.flatten().unwrap().dimensions(), (2, 2));
	}

	#[test]
	fn shape_without_geometry_has_no_bounds() {
		let shape = ShapeLayer::new(vec![], PathStyle::default());
		assert_eq!(shape.bounding_box(DAffine2::IDENTITY), None);
	}
}
