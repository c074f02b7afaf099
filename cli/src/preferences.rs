use strata_psd_import::ImportPreferences;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
	pub import: ImportPreferences,
	pub render: RenderPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPreferences {
	/// Make the fonts installed on this machine available to text layers.
	pub load_system_fonts: bool,
	/// Additional directories scanned for font files.
	pub font_dirs: Vec<PathBuf>,
}

impl Default for RenderPreferences {
	fn default() -> Self {
		Self {
			load_system_fonts: true,
			font_dirs: Vec::new(),
		}
	}
}

pub fn from_ron(data: &str) -> Result<Preferences, ron::error::SpannedError> {
	ron::from_str(data)
}

pub fn to_ron(preferences: &Preferences) -> Result<String> {
	ron::ser::to_string_pretty(preferences, Default::default()).context("Failed to serialize preferences")
}

/// Reads the preferences file, falling back to the defaults when it is missing or unreadable.
pub fn read(path: &Path) -> Preferences {
	let Ok(data) = std::fs::read_to_string(path) else {
		log::debug!("No preferences at {}, using the defaults", path.display());
		return Preferences::default();
	};
	match from_ron(&data) {
		Ok(preferences) => preferences,
		Err(error) => {
			log::warn!("Ignoring malformed preferences in {}: {error}", path.display());
			Preferences::default()
		}
	}
}

pub fn write(path: &Path, preferences: &Preferences) -> Result<()> {
	let data = to_ron(preferences)?;
	std::fs::write(path, data).with_context(|| format!("Failed to write preferences to {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use strata_document::layers::text_layer::TextAlignment;

	#[test]
	fn partial_files_keep_the_remaining_defaults() {
		let preferences = from_ron("(import: (keep_empty_groups: false, unmapped_alignment: Some(Right)))").unwrap();

		assert!(!preferences.import.keep_empty_groups);
		assert_eq!(preferences.import.unmapped_alignment, Some(TextAlignment::Right));
		assert_eq!(preferences.import.shape_style, ImportPreferences::default().shape_style);
		assert_eq!(preferences.render, RenderPreferences::default());
	}

	#[test]
	fn preferences_survive_a_ron_round_trip() {
		let mut preferences = Preferences::default();
		preferences.render.font_dirs.push(PathBuf::from("fonts"));
		preferences.import.unmapped_alignment = Some(TextAlignment::Center);

		let data = to_ron(&preferences).unwrap();

		assert_eq!(from_ron(&data).unwrap(), preferences);
	}

	#[test]
	fn unreadable_files_fall_back_to_defaults() {
		let path = std::env::temp_dir().join(format!("strata-preferences-test-{}.ron", std::process::id()));
		std::fs::write(&path, "not ron at all (").unwrap();

		let preferences = read(&path);
		let _ = std::fs::remove_file(&path);

		assert_eq!(preferences, Preferences::default());
		assert_eq!(read(Path::new("/nonexistent/strata-preferences.ron")), Preferences::default());
	}
}
