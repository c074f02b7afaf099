use super::layer_info::{LayerData, transform_rect};
use crate::color::Color;
use crate::consts::{AVERAGE_ADVANCE_EM, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, LINE_HEIGHT_EM};
use crate::error::RenderError;
use crate::render::{Canvas, to_skia_transform};

use glam::{DAffine2, DVec2};
use resvg::usvg;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Horizontal placement of each line within the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextAlignment {
	#[default]
	Left,
	Center,
	Right,
}

impl TextAlignment {
	fn svg_anchor(&self) -> &'static str {
		match self {
			TextAlignment::Left => "start",
			TextAlignment::Center => "middle",
			TextAlignment::Right => "end",
		}
	}
}

/// A span of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
	pub text: String,
	pub font_family: String,
	/// Font size in pixels.
	pub size: f64,
	pub color: Color,
}

/// Starts a new line without starting a new paragraph. May appear anywhere in a run's text.
pub const LINE_BREAK: char = '\n';

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
	pub alignment: TextAlignment,
	pub runs: Vec<TextRun>,
}

impl Paragraph {
	pub fn new(alignment: TextAlignment, runs: Vec<TextRun>) -> Self {
		Self { alignment, runs }
	}

	pub fn text(&self) -> String {
		self.runs.iter().map(|run| run.text.as_str()).collect()
	}

	fn font_size(&self) -> f64 {
		self.runs.iter().map(|run| run.size).reduce(f64::max).unwrap_or(DEFAULT_FONT_SIZE)
	}

	/// Pieces of the runs on each line. There is always at least one line, possibly empty.
	fn lines(&self) -> Vec<Vec<(&str, &TextRun)>> {
		let mut lines = vec![Vec::new()];
		for run in &self.runs {
			let mut pieces = run.text.split(LINE_BREAK).peekable();
			while let Some(piece) = pieces.next() {
				if !piece.is_empty() {
					if let Some(line) = lines.last_mut() {
						line.push((piece, run));
					}
				}
				if pieces.peek().is_some() {
					lines.push(Vec::new());
				}
			}
		}
		lines
	}
}

/// Estimated extent of one laid out line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
	pub width: f64,
	pub height: f64,
	pub font_size: f64,
}

/// Rich text made of paragraphs of styled runs. The layer's origin is the top left of the text box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayer {
	pub paragraphs: Vec<Paragraph>,
}

impl LayerData for TextLayer {
	fn render(&self, canvas: &mut Canvas, transform: DAffine2) -> Result<(), RenderError> {
		let size = self.size();
		if size.x <= 0. || size.y <= 0. {
			return Ok(());
		}

		let tree = usvg::Tree::from_str(&self.to_svg(), canvas.svg_options())?;
		resvg::render(&tree, to_skia_transform(transform), &mut canvas.pixmap_mut().as_mut());
		Ok(())
	}

	fn bounding_box(&self, transform: DAffine2) -> Option<[DVec2; 2]> {
		let size = self.size();
		if size.x <= 0. || size.y <= 0. {
			return None;
		}
		Some(transform_rect(transform, [DVec2::ZERO, size]))
	}
}

impl TextLayer {
	pub fn new(paragraphs: Vec<Paragraph>) -> Self {
		Self { paragraphs }
	}

	/// Plain text with paragraphs separated by `\n`.
	pub fn text(&self) -> String {
		self.paragraphs.iter().map(Paragraph::text).collect::<Vec<_>>().join("\n")
	}

	/// Lines in layout order, each with the alignment of its paragraph.
	fn layout(&self) -> Vec<(TextAlignment, Vec<(&str, &TextRun)>, LineMetrics)> {
		let mut layout = Vec::new();
		for paragraph in &self.paragraphs {
			// Empty lines keep the height of the paragraph's largest run
			let paragraph_font_size = paragraph.font_size();
			for line in paragraph.lines() {
				let font_size = line.iter().map(|(_, run)| run.size).reduce(f64::max).unwrap_or(paragraph_font_size);
				let metrics = LineMetrics {
					width: line.iter().map(|(piece, run)| piece.chars().count() as f64 * run.size * AVERAGE_ADVANCE_EM).sum(),
					height: font_size * LINE_HEIGHT_EM,
					font_size,
				};
				layout.push((paragraph.alignment, line, metrics));
			}
		}
		layout
	}

	pub fn line_metrics(&self) -> Vec<LineMetrics> {
		self.layout().into_iter().map(|(_, _, metrics)| metrics).collect()
	}

	/// Estimated size of the text box. Real glyph advances depend on the fonts available when rendering.
	pub fn size(&self) -> DVec2 {
		self.line_metrics().iter().fold(DVec2::ZERO, |size, line| DVec2::new(size.x.max(line.width), size.y + line.height))
	}

	/// A standalone SVG document drawing this text in a box starting at the origin.
	pub fn to_svg(&self) -> String {
		let size = self.size();
		let mut svg = String::new();
		let _ = write!(
			svg,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
			w = size.x.ceil().max(1.),
			h = size.y.ceil().max(1.)
		);

		let mut line_top = 0.;
		for (alignment, pieces, line) in self.layout() {
			let x = match alignment {
				TextAlignment::Left => 0.,
				TextAlignment::Center => size.x / 2.,
				TextAlignment::Right => size.x,
			};
			let _ = write!(
				svg,
				r#"<text x="{x}" y="{}" text-anchor="{}" xml:space="preserve">"#,
				line_top + line.font_size,
				alignment.svg_anchor()
			);
			for (piece, run) in pieces {
				let font_family = if run.font_family.is_empty() { DEFAULT_FONT_FAMILY } else { run.font_family.as_str() };
				let _ = write!(
					svg,
					r##"<tspan font-family="{}" font-size="{}" fill="#{}" fill-opacity="{}">{}</tspan>"##,
					escape_xml(font_family),
					run.size,
					run.color.rgb_hex(),
					run.color.opacity(),
					escape_xml(piece)
				);
			}
			svg.push_str("</text>");
			line_top += line.height;
		}

		svg.push_str("</svg>");
		svg
	}
}

/// Characters XML 1.0 does not allow anywhere in a document, escaped or not.
fn is_forbidden_in_xml(character: char) -> bool {
	matches!(character, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Escapes markup and drops the characters XML cannot carry.
fn escape_xml(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for character in text.chars() {
		match character {
			character if is_forbidden_in_xml(character) => {}
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			_ => escaped.push(character),
		}
	}
	escaped
}
