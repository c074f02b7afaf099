use strata_document::layers::style::PathStyle;
use strata_document::layers::text_layer::TextAlignment;

use serde::{Deserialize, Serialize};

/// Choices the foreign format leaves open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPreferences {
	/// Keep groups that end up without children, either because they were empty or every child was skipped.
	pub keep_empty_groups: bool,
	/// Used for paragraph justifications without a mapping. `None` rejects such text layers.
	pub unmapped_alignment: Option<TextAlignment>,
	/// Style given to imported shapes, which carry geometry only.
	pub shape_style: PathStyle,
}

impl Default for ImportPreferences {
	fn default() -> Self {
		Self {
			keep_empty_groups: true,
			unmapped_alignment: None,
			shape_style: PathStyle::default(),
		}
	}
}
