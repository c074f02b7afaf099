use super::{GROUP_CHUNK, HAS_IN_HANDLE, HAS_OUT_HANDLE, IMAGE_CHUNK, LAYERS_CHUNK, MAGIC, SHAPE_CHUNK, TEXT_CHUNK};
use crate::Document;
use crate::error::FormatError;
use crate::layers::layer_info::{Layer, LayerDataType};
use crate::layers::style::PathStyle;
use crate::layers::text_layer::{TextAlignment, TextLayer};
use crate::layers::vector::Subpath;

use binary_io::BinaryWriter;
use glam::DVec2;
use std::io::Write;

/// Writes `document` to `sink`. Selection and visibility are session state and are not written.
pub fn serialize<W: Write>(document: &Document, sink: W) -> Result<(), FormatError> {
	let mut writer = BinaryWriter::new(sink);
	writer.write_raw(&MAGIC)?;
	writer.write_length_prefixed_bytes(LAYERS_CHUNK)?;

	let layers = document.root().layers();
	writer.write_length(layers.len())?;
	for layer in layers {
		write_layer(&mut writer, layer)?;
	}

	writer.flush()?;
	log::debug!("Serialized {} top level layers into {} bytes", layers.len(), writer.position());
	Ok(())
}

fn write_layer<W: Write>(writer: &mut BinaryWriter<W>, layer: &Layer) -> Result<(), FormatError> {
	let tag = match &layer.data {
		LayerDataType::Image(_) => IMAGE_CHUNK,
		LayerDataType::Shape(_) => SHAPE_CHUNK,
		LayerDataType::Text(_) => TEXT_CHUNK,
		LayerDataType::Group(_) => GROUP_CHUNK,
	};
	writer.write_length_prefixed_bytes(tag)?;
	writer.write_utf8_string(&layer.name)?;
	writer.write_f32_le(layer.position.x as f32)?;
	writer.write_f32_le(layer.position.y as f32)?;

	match &layer.data {
		LayerDataType::Image(image) => writer.write_length_prefixed_bytes(&image.to_png()?)?,
		LayerDataType::Shape(shape) => {
			write_style(writer, &shape.style)?;
			writer.write_length(shape.subpaths.len())?;
			for subpath in &shape.subpaths {
				write_subpath(writer, subpath)?;
			}
		}
		LayerDataType::Text(text) => write_text(writer, text)?,
		LayerDataType::Group(group) => {
			writer.write_length(group.len())?;
			for child in group.layers() {
				write_layer(writer, child)?;
			}
		}
	}
	Ok(())
}

fn write_point<W: Write>(writer: &mut BinaryWriter<W>, point: DVec2) -> Result<(), FormatError> {
	writer.write_f32_le(point.x as f32)?;
	writer.write_f32_le(point.y as f32)?;
	Ok(())
}

fn write_style<W: Write>(writer: &mut BinaryWriter<W>, style: &PathStyle) -> Result<(), FormatError> {
	match style.stroke() {
		Some(stroke) => {
			writer.write_u32_le(1)?;
			writer.write_u32_le(stroke.color().to_rgba_u32())?;
			writer.write_f32_le(stroke.width())?;
		}
		None => writer.write_u32_le(0)?,
	}
	match style.fill() {
		Some(fill) => {
			writer.write_u32_le(1)?;
			writer.write_u32_le(fill.color().to_rgba_u32())?;
		}
		None => writer.write_u32_le(0)?,
	}
	Ok(())
}

fn write_subpath<W: Write>(writer: &mut BinaryWriter<W>, subpath: &Subpath) -> Result<(), FormatError> {
	writer.write_u32_le(subpath.closed as u32)?;
	writer.write_length(subpath.len())?;
	for group in subpath.manipulator_groups() {
		let mut mask = 0;
		if group.in_handle.is_some() {
			mask |= HAS_IN_HANDLE;
		}
		if group.out_handle.is_some() {
			mask |= HAS_OUT_HANDLE;
		}
		writer.write_u32_le(mask)?;
		write_point(writer, group.anchor)?;
		for handle in [group.in_handle, group.out_handle].into_iter().flatten() {
			write_point(writer, handle)?;
		}
	}
	Ok(())
}

fn write_text<W: Write>(writer: &mut BinaryWriter<W>, text: &TextLayer) -> Result<(), FormatError> {
	writer.write_length(text.paragraphs.len())?;
	for paragraph in &text.paragraphs {
		let alignment = match paragraph.alignment {
			TextAlignment::Left => 0,
			TextAlignment::Center => 1,
			TextAlignment::Right => 2,
		};
		writer.write_u32_le(alignment)?;
		writer.write_length(paragraph.runs.len())?;
		for run in &paragraph.runs {
			writer.write_utf8_string(&run.text)?;
			writer.write_utf8_string(&run.font_family)?;
			writer.write_f32_le(run.size as f32)?;
			writer.write_u32_le(run.color.to_rgba_u32())?;
		}
	}
	Ok(())
}
