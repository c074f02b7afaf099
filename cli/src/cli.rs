use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_PREFERENCES_FILE: &str = "strata-preferences.ron";

#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(about = "Import, inspect and flatten layered Strata documents")]
pub struct Cli {
	/// Preferences file in RON format. Defaults are used when it does not exist
	#[arg(short, long, global = true, default_value = DEFAULT_PREFERENCES_FILE)]
	pub preferences: PathBuf,

	/// Log more detail (-v for debug, -vv for trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Convert a decoded PSD layer tree (JSON) into a project file
	Import {
		input: PathBuf,
		output: PathBuf,
		/// Fail instead of writing the project when any layer was skipped
		#[arg(long)]
		strict: bool,
	},
	/// Compose the visible layers of a project or decoded PSD into an image (PNG, JPEG or BMP by extension)
	Flatten { input: PathBuf, output: PathBuf },
	/// Print the layer tree of a project or decoded PSD as JSON
	Inspect { input: PathBuf },
	/// Print the preferences in effect, or write them to the preferences file
	Preferences {
		#[arg(long)]
		write: bool,
	},
}

impl Cli {
	pub fn log_level(&self) -> log::LevelFilter {
		match self.verbose {
			0 => log::LevelFilter::Info,
			1 => log::LevelFilter::Debug,
			_ => log::LevelFilter::Trace,
		}
	}
}
