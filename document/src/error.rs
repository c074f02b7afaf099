use super::LayerId;

use binary_io::BinaryError;
use resvg::usvg;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
	#[error("no layer at path {0:?}")]
	LayerNotFound(Vec<LayerId>),
	#[error("the path does not name a removable layer")]
	InvalidPath,
	#[error("the layer is not a group")]
	NotAGroup,
}

/// Failures while reading or writing a project file.
#[derive(Debug, Error)]
pub enum FormatError {
	#[error("the project file ends early at byte {position}: expected {expected} bytes, found {available}")]
	TruncatedInput { position: u64, expected: usize, available: usize },
	#[error("text at byte {position} of the project file is not valid UTF-8")]
	InvalidEncoding { position: u64 },
	#[error("invalid project file: {0}")]
	InvalidFormat(String),
	#[error("could not encode or decode a layer raster: {0}")]
	RasterEncoding(#[from] image::ImageError),
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl From<BinaryError> for FormatError {
	fn from(error: BinaryError) -> Self {
		match error {
			BinaryError::TruncatedInput { position, expected, available } => FormatError::TruncatedInput { position, expected, available },
			BinaryError::InvalidEncoding { position, .. } => FormatError::InvalidEncoding { position },
			BinaryError::LengthOverflow(length) => FormatError::InvalidFormat(format!("a field of {length} bytes is too large for the format")),
			BinaryError::Io(error) => FormatError::Io(error),
		}
	}
}

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("a {width}x{height} canvas could not be allocated")]
	CanvasAllocation { width: u32, height: u32 },
	#[error("the document is too large to flatten ({0:?})")]
	TooLarge([f64; 2]),
	#[error("text could not be laid out: {0}")]
	Text(#[from] usvg::Error),
}
