//! # Foreign layer tree
//! A decoded PSD as handed over by an external reader (or its JSON dump). Only the parts the importer
//! consumes are modelled; unknown fields are ignored when deserializing.

use crate::base64_serde;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignDocument {
	pub width: u32,
	pub height: u32,
	/// Top-level layers, bottom-most first.
	#[serde(default)]
	pub layers: Vec<ForeignLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignLayerKind {
	Pixel,
	Shape,
	Type,
	Group,
	SmartObject,
	Adjustment,
	Fill,
}

impl fmt::Display for ForeignLayerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ForeignLayerKind::Pixel => "pixel",
			ForeignLayerKind::Shape => "shape",
			ForeignLayerKind::Type => "type",
			ForeignLayerKind::Group => "group",
			ForeignLayerKind::SmartObject => "smart object",
			ForeignLayerKind::Adjustment => "adjustment",
			ForeignLayerKind::Fill => "fill",
		};
		f.write_str(name)
	}
}

fn visible_by_default() -> bool {
	true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignLayer {
	#[serde(default)]
	pub name: String,
	pub kind: ForeignLayerKind,
	/// Top-left corner in document pixels as `(left, top)`.
	#[serde(default)]
	pub offset: (i32, i32),
	#[serde(default = "visible_by_default")]
	pub visible: bool,
	#[serde(default)]
	pub raster: Option<ForeignRaster>,
	#[serde(default)]
	pub vector_mask: Option<VectorMask>,
	#[serde(default)]
	pub text: Option<TypeData>,
	#[serde(default)]
	pub children: Vec<ForeignLayer>,
}

impl ForeignLayer {
	pub fn new(kind: ForeignLayerKind, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind,
			offset: (0, 0),
			visible: true,
			raster: None,
			vector_mask: None,
			text: None,
			children: Vec::new(),
		}
	}
}

/// Decoded straight RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignRaster {
	pub width: u32,
	pub height: u32,
	#[serde(serialize_with = "base64_serde::as_base64", deserialize_with = "base64_serde::from_base64")]
	pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorMask {
	#[serde(default)]
	pub paths: Vec<ForeignSubpath>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForeignSubpath {
	#[serde(default)]
	pub closed: bool,
	#[serde(default)]
	pub knots: Vec<Knot>,
}

/// A path point with its two control points. Every pair is normalized to the document size and
/// stored vertical component first, as `[y, x]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knot {
	pub preceding: [f64; 2],
	pub anchor: [f64; 2],
	pub leaving: [f64; 2],
}

impl Knot {
	/// A corner point whose control points sit on the anchor.
	pub fn corner(anchor: [f64; 2]) -> Self {
		Self { preceding: anchor, anchor, leaving: anchor }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeData {
	pub engine_dict: EngineDict,
	#[serde(default)]
	pub font_set: Vec<FontResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FontResource {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EngineDict {
	pub editor: Editor,
	#[serde(default)]
	pub style_run: StyleRun,
	#[serde(default)]
	pub paragraph_run: ParagraphRun,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Editor {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleRun {
	/// Characters covered by each entry of `run_array`.
	#[serde(default)]
	pub run_length_array: Vec<usize>,
	#[serde(default)]
	pub run_array: Vec<StyleRunEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleRunEntry {
	pub style_sheet: StyleSheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleSheet {
	pub style_sheet_data: StyleSheetData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleSheetData {
	/// Index into [`TypeData::font_set`].
	pub font: usize,
	pub font_size: f64,
	#[serde(default)]
	pub fill_color: Option<FillColor>,
}

/// Normalized color channels, alpha first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FillColor {
	pub values: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParagraphRun {
	#[serde(default)]
	pub run_array: Vec<ParagraphRunEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParagraphRunEntry {
	pub paragraph_sheet: ParagraphSheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParagraphSheet {
	pub properties: ParagraphProperties,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParagraphProperties {
	#[serde(default)]
	pub justification: i64,
}
