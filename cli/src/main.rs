mod cli;
mod inspect;
mod preferences;

use cli::{Cli, Command};
use preferences::Preferences;

use anyhow::{Context, Result, bail};
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;
use strata_document::Document;
use strata_document::consts::PROJECT_FILE_EXTENSION;
use strata_document::format;
use strata_document::render::Renderer;
use strata_psd_import::{ForeignDocument, PsdImport, import_document};

fn init_logging(level: log::LevelFilter) -> Result<()> {
	let colors = ColoredLevelConfig::new().debug(Color::Magenta).info(Color::Green).warn(Color::Yellow).error(Color::Red);

	fern::Dispatch::new()
		.chain(std::io::stderr())
		.level(level)
		.format(move |out, message, record| {
			out.finish(format_args!(
				"[{}]{} {}",
				// Only the level is colored
				colors.color(record.level()),
				chrono::Local::now().format("[%H:%M:%S]"),
				message
			))
		})
		.apply()
		.context("Failed to install the logger")
}

fn read_foreign(path: &Path) -> Result<ForeignDocument> {
	let data = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&data).with_context(|| format!("{} is not a decoded PSD layer tree", path.display()))
}

fn import(path: &Path, preferences: &Preferences) -> Result<PsdImport> {
	let foreign = read_foreign(path)?;
	let import = import_document(&foreign, &preferences.import);
	if !import.is_complete() {
		log::warn!("{} of the layers in {} could not be imported", import.diagnostics.len(), path.display());
	}
	Ok(import)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
	Project,
	DecodedPsd,
}

fn input_kind(path: &Path) -> Option<InputKind> {
	let extension = path.extension()?;
	if extension.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION) {
		Some(InputKind::Project)
	} else if extension.eq_ignore_ascii_case("json") {
		Some(InputKind::DecodedPsd)
	} else {
		None
	}
}

/// Opens a project file, or imports a decoded PSD given as JSON.
fn open(path: &Path, preferences: &Preferences) -> Result<Document> {
	match input_kind(path) {
		Some(InputKind::Project) => format::load_from_path(path).with_context(|| format!("Failed to open project {}", path.display())),
		Some(InputKind::DecodedPsd) => Ok(import(path, preferences)?.document),
		None => bail!("{} is neither a .{PROJECT_FILE_EXTENSION} project nor a decoded PSD (.json)", path.display()),
	}
}

fn renderer(preferences: &Preferences) -> Renderer {
	let mut renderer = if preferences.render.load_system_fonts { Renderer::with_system_fonts() } else { Renderer::default() };
	for directory in &preferences.render.font_dirs {
		renderer.load_font_dir(directory);
	}
	renderer
}

fn save_raster(raster: RgbaImage, path: &Path) -> Result<()> {
	let format = ImageFormat::from_path(path).with_context(|| format!("Cannot tell the image format of {}", path.display()))?;
	let image = DynamicImage::ImageRgba8(raster);
	// JPEG has no alpha channel
	let image = if format == ImageFormat::Jpeg { DynamicImage::ImageRgb8(image.to_rgb8()) } else { image };
	image.save_with_format(path, format).with_context(|| format!("Failed to write {}", path.display()))
}

fn run(command: Command, preferences: &Preferences, preferences_path: &Path) -> Result<()> {
	match command {
		Command::Import { input, output, strict } => {
			let import = import(&input, preferences)?;
			if strict && !import.is_complete() {
				for diagnostic in &import.diagnostics {
					log::error!("{:?} at {:?}: {}", diagnostic.layer_name, diagnostic.foreign_path, diagnostic.error);
				}
				bail!("{} layers were skipped, not writing {}", import.diagnostics.len(), output.display());
			}
			format::save_to_path(&import.document, &output).with_context(|| format!("Failed to save {}", output.display()))?;
			log::info!("Wrote {} layers to {}", import.document.layer_paths().len(), output.display());
		}
		Command::Flatten { input, output } => {
			let document = open(&input, preferences)?;
			let raster = renderer(preferences).flatten(&document).context("Failed to flatten the document")?;
			if raster.width() == 0 || raster.height() == 0 {
				bail!("{} has no visible content to flatten", input.display());
			}
			log::info!("Flattened {} into a {}x{} image", input.display(), raster.width(), raster.height());
			save_raster(raster, &output)?;
		}
		Command::Inspect { input } => {
			let document = open(&input, preferences)?;
			let summary = serde_json::to_string_pretty(&inspect::summarize(&document))?;
			println!("{summary}");
		}
		Command::Preferences { write } => {
			if write {
				preferences::write(preferences_path, preferences)?;
				log::info!("Wrote preferences to {}", preferences_path.display());
			} else {
				println!("{}", preferences::to_ron(preferences)?);
			}
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.log_level())?;

	let preferences = preferences::read(&cli.preferences);
	run(cli.command, &preferences, &cli.preferences)
}
