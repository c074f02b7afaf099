use crate::error::ImportError;
use crate::foreign::{ForeignLayer, StyleSheetData, TypeData};
use crate::preferences::ImportPreferences;

use glam::DVec2;
use log::{debug, warn};
use strata_document::color::Color;
use strata_document::layers::layer_info::Layer;
use strata_document::layers::text_layer::{LINE_BREAK, Paragraph, TextAlignment, TextRun};

/// Fill used by runs that omit one: opaque black, alpha first.
pub const DEFAULT_FILL_ARGB: [f64; 4] = [1., 0., 0., 0.];

/// Justification codes with a known counterpart.
const JUSTIFICATION_ALIGNMENTS: [(i64, TextAlignment); 2] = [(0, TextAlignment::Left), (2, TextAlignment::Center)];

/// Line break inside a paragraph (ETX).
const SOFT_LINE_BREAK: char = '\u{3}';

fn is_paragraph_separator(character: char) -> bool {
	matches!(character, '\r' | '\n')
}

pub fn map_justification(justification: i64) -> Option<TextAlignment> {
	JUSTIFICATION_ALIGNMENTS.iter().find(|(code, _)| *code == justification).map(|&(_, alignment)| alignment)
}

fn styled_run(text: String, style: &StyleSheetData, type_data: &TypeData) -> Result<TextRun, ImportError> {
	let font = type_data
		.font_set
		.get(style.font)
		.ok_or_else(|| ImportError::InvalidFormat(format!("font index {} is outside the font set of {} entries", style.font, type_data.font_set.len())))?;
	let argb = style.fill_color.map_or(DEFAULT_FILL_ARGB, |fill| fill.values);

	Ok(TextRun {
		text,
		font_family: font.name.clone(),
		size: style.font_size,
		color: Color::from_unit_argb(argb),
	})
}

/// Cuts the text into one styled run per style record.
fn split_runs(layer_name: &str, type_data: &TypeData) -> Result<Vec<TextRun>, ImportError> {
	let engine = &type_data.engine_dict;
	let lengths = &engine.style_run.run_length_array;
	let styles = &engine.style_run.run_array;
	if lengths.len() != styles.len() {
		return Err(ImportError::InvalidFormat(format!("{} run lengths were given for {} run styles", lengths.len(), styles.len())));
	}

	let characters: Vec<char> = engine.editor.text.chars().collect();
	let mut index: usize = 0;
	let mut runs = Vec::with_capacity(styles.len());
	for (&length, style) in lengths.iter().zip(styles) {
		let end = index.saturating_add(length);
		if end > characters.len() {
			warn!("Text layer {layer_name:?} has a run of {length} characters at {index} but only {} characters of text", characters.len());
		}
		let end = end.min(characters.len());
		let text = characters[index..end].iter().collect();
		runs.push(styled_run(text, &style.style_sheet.style_sheet_data, type_data)?);
		index = end;
	}
	Ok(runs)
}

/// Distributes runs over the blocks delimited by paragraph separators. There is always one more block than separators.
fn split_blocks(runs: Vec<TextRun>) -> Vec<Vec<TextRun>> {
	let mut blocks = vec![Vec::new()];
	for run in runs {
		let mut pieces = run.text.split(is_paragraph_separator).peekable();
		while let Some(piece) = pieces.next() {
			if !piece.is_empty() {
				if let Some(block) = blocks.last_mut() {
					block.push(TextRun { text: piece.to_string(), ..run.clone() });
				}
			}
			if pieces.peek().is_some() {
				blocks.push(Vec::new());
			}
		}
	}
	blocks
}

/// Converts a type layer. Mismatched style or paragraph tables reject the layer.
pub fn convert_type_layer(layer: &ForeignLayer, preferences: &ImportPreferences) -> Result<Layer, ImportError> {
	let type_data = layer.text.as_ref().ok_or_else(|| ImportError::InvalidFormat("type layer carries no text data".to_string()))?;

	let runs = split_runs(&layer.name, type_data)?;
	let mut blocks = split_blocks(runs);

	let paragraph_styles = &type_data.engine_dict.paragraph_run.run_array;
	if paragraph_styles.len() != blocks.len() - 1 {
		return Err(ImportError::InvalidFormat(format!("{} paragraph styles were given for {} paragraphs", paragraph_styles.len(), blocks.len())));
	}

	if blocks.len() > 1 && blocks.last().is_some_and(Vec::is_empty) {
		blocks.pop();
	}

	let mut paragraphs = Vec::with_capacity(blocks.len());
	for (index, runs) in blocks.into_iter().enumerate() {
		let alignment = match paragraph_styles.get(index) {
			Some(style) => {
				let justification = style.paragraph_sheet.properties.justification;
				match (map_justification(justification), preferences.unmapped_alignment) {
					(Some(alignment), _) => alignment,
					(None, Some(fallback)) => {
						debug!("Aligning paragraph {index} of {:?} to {fallback:?} in place of justification {justification}", layer.name);
						fallback
					}
					(None, None) => return Err(ImportError::UnmappedAlignment(justification)),
				}
			}
			None => TextAlignment::default(),
		};
		paragraphs.push(Paragraph::new(alignment, runs));
	}

	let (left, top) = layer.offset;
	Ok(Layer::new_text(paragraphs, layer.name.clone())
		.with_position(DVec2::new(left as f64, top as f64))
		.with_visibility(layer.visible))
}
