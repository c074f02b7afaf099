use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinaryError {
	#[error("input ended at byte {position}: expected {expected} more bytes but only {available} were available")]
	TruncatedInput { position: u64, expected: usize, available: usize },

	#[error("string at byte {position} is not valid UTF-8")]
	InvalidEncoding {
		position: u64,
		#[source]
		source: FromUtf8Error,
	},

	#[error("a payload of {0} bytes does not fit in a 32-bit length prefix")]
	LengthOverflow(usize),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl BinaryError {
	pub fn is_truncation(&self) -> bool {
		matches!(self, BinaryError::TruncatedInput { .. })
	}
}
