use super::{GROUP_CHUNK, HAS_IN_HANDLE, HAS_OUT_HANDLE, IMAGE_CHUNK, LAYERS_CHUNK, MAGIC, MAX_GROUP_DEPTH, SHAPE_CHUNK, TEXT_CHUNK};
use crate::Document;
use crate::color::Color;
use crate::error::FormatError;
use crate::layers::group_layer::GroupLayer;
use crate::layers::image_layer::ImageLayer;
use crate::layers::layer_info::{Layer, LayerDataType};
use crate::layers::shape_layer::ShapeLayer;
use crate::layers::style::{Fill, PathStyle, Stroke};
use crate::layers::text_layer::{Paragraph, TextAlignment, TextLayer, TextRun};
use crate::layers::vector::{ManipulatorGroup, Subpath};

use binary_io::BinaryReader;
use glam::DVec2;
use std::io::Read;

/// Reads a whole project. Nothing is returned unless every layer was read successfully.
pub fn deserialize<R: Read>(source: R) -> Result<Document, FormatError> {
	let mut reader = BinaryReader::new(source);

	let magic: [u8; 8] = reader.read_array()?;
	if magic != MAGIC {
		return Err(FormatError::InvalidFormat("not a project file (magic bytes do not match)".into()));
	}

	let tag = reader.read_length_prefixed_bytes()?;
	if tag != LAYERS_CHUNK {
		return Err(FormatError::InvalidFormat(format!("expected the LAYERS chunk, found {}", describe_tag(&tag))));
	}

	let layer_count = reader.read_u32_le()?;
	let mut root = GroupLayer::default();
	for _ in 0..layer_count {
		root.add_layer(read_layer(&mut reader, 0)?);
	}

	log::debug!("Deserialized {layer_count} top level layers from {} bytes", reader.position());
	Ok(Document::from_root(root))
}

fn describe_tag(tag: &[u8]) -> String {
	format!("{:?}", String::from_utf8_lossy(tag))
}

fn read_layer<R: Read>(reader: &mut BinaryReader<R>, depth: usize) -> Result<Layer, FormatError> {
	let tag_position = reader.position();
	let tag = reader.read_length_prefixed_bytes()?;
	let name = reader.read_utf8_string()?;
	let position = read_point(reader)?;

	let data = match tag.as_slice() {
		IMAGE_CHUNK => {
			let png = reader.read_length_prefixed_bytes()?;
			let image = ImageLayer::from_png(&png).map_err(|error| FormatError::InvalidFormat(format!("raster of layer {name:?} is not a valid PNG: {error}")))?;
			LayerDataType::Image(image)
		}
		SHAPE_CHUNK => {
			let style = read_style(reader)?;
			let subpath_count = reader.read_u32_le()?;
			let mut subpaths = Vec::new();
			for _ in 0..subpath_count {
				subpaths.push(read_subpath(reader)?);
			}
			LayerDataType::Shape(ShapeLayer::new(subpaths, style))
		}
		TEXT_CHUNK => LayerDataType::Text(read_text(reader)?),
		GROUP_CHUNK => {
			if depth >= MAX_GROUP_DEPTH {
				return Err(FormatError::InvalidFormat(format!("groups are nested deeper than {MAX_GROUP_DEPTH} levels")));
			}
			let child_count = reader.read_u32_le()?;
			let mut group = GroupLayer::default();
			for _ in 0..child_count {
				group.add_layer(read_layer(reader, depth + 1)?);
			}
			LayerDataType::Group(group)
		}
		_ => return Err(FormatError::InvalidFormat(format!("unknown layer chunk {} at byte {tag_position}", describe_tag(&tag)))),
	};

	Ok(Layer::new(data, name).with_position(position))
}

fn read_point<R: Read>(reader: &mut BinaryReader<R>) -> Result<DVec2, FormatError> {
	let x = reader.read_f32_le()?;
	let y = reader.read_f32_le()?;
	Ok(DVec2::new(x as f64, y as f64))
}

fn read_flag<R: Read>(reader: &mut BinaryReader<R>) -> Result<bool, FormatError> {
	match reader.read_u32_le()? {
		0 => Ok(false),
		1 => Ok(true),
		other => Err(FormatError::InvalidFormat(format!("expected a 0 or 1 flag, found {other}"))),
	}
}

fn read_style<R: Read>(reader: &mut BinaryReader<R>) -> Result<PathStyle, FormatError> {
	let stroke = match read_flag(reader)? {
		true => {
			let color = Color::from_rgba_u32(reader.read_u32_le()?);
			Some(Stroke::new(color, reader.read_f32_le()?))
		}
		false => None,
	};
	let fill = match read_flag(reader)? {
		true => Some(Fill::new(Color::from_rgba_u32(reader.read_u32_le()?))),
		false => None,
	};
	Ok(PathStyle::new(stroke, fill))
}

fn read_subpath<R: Read>(reader: &mut BinaryReader<R>) -> Result<Subpath, FormatError> {
	let closed = read_flag(reader)?;
	let knot_count = reader.read_u32_le()?;
	let mut groups = Vec::new();
	for _ in 0..knot_count {
		let mask = reader.read_u32_le()?;
		if mask & !(HAS_IN_HANDLE | HAS_OUT_HANDLE) != 0 {
			return Err(FormatError::InvalidFormat(format!("invalid handle mask {mask:#x}")));
		}
		let anchor = read_point(reader)?;
		let in_handle = if mask & HAS_IN_HANDLE != 0 { Some(read_point(reader)?) } else { None };
		let out_handle = if mask & HAS_OUT_HANDLE != 0 { Some(read_point(reader)?) } else { None };
		groups.push(ManipulatorGroup::new(anchor, in_handle, out_handle));
	}
	Ok(Subpath::new(groups, closed))
}

fn read_text<R: Read>(reader: &mut BinaryReader<R>) -> Result<TextLayer, FormatError> {
	let paragraph_count = reader.read_u32_le()?;
	let mut paragraphs = Vec::new();
	for _ in 0..paragraph_count {
		let alignment = match reader.read_u32_le()? {
			0 => TextAlignment::Left,
			1 => TextAlignment::Center,
			2 => TextAlignment::Right,
			other => return Err(FormatError::InvalidFormat(format!("unknown text alignment {other}"))),
		};
		let run_count = reader.read_u32_le()?;
		let mut runs = Vec::new();
		for _ in 0..run_count {
			let text = reader.read_utf8_string()?;
			let font_family = reader.read_utf8_string()?;
			let size = reader.read_f32_le()? as f64;
			let color = Color::from_rgba_u32(reader.read_u32_le()?);
			runs.push(TextRun { text, font_family, size, color });
		}
		paragraphs.push(Paragraph::new(alignment, runs));
	}
	Ok(TextLayer::new(paragraphs))
}
