use crate::BinaryError;

use std::io::{ErrorKind, Read};

/// Forward-only reader of little-endian primitives.
///
/// Tracks how many bytes have been consumed so truncation errors can say where the stream ended.
pub struct BinaryReader<R> {
	inner: R,
	position: u64,
}

impl<R: Read> BinaryReader<R> {
	pub fn new(inner: R) -> Self {
		Self { inner, position: 0 }
	}

	/// Number of bytes consumed so far.
	pub fn position(&self) -> u64 {
		self.position
	}

	pub fn into_inner(self) -> R {
		self.inner
	}

	/// Fills `buffer` completely or fails with [`BinaryError::TruncatedInput`].
	pub fn read_exact_into(&mut self, buffer: &mut [u8]) -> Result<(), BinaryError> {
		let mut filled = 0;
		while filled < buffer.len() {
			match self.inner.read(&mut buffer[filled..]) {
				Ok(0) => {
					return Err(BinaryError::TruncatedInput {
						position: self.position + filled as u64,
						expected: buffer.len(),
						available: filled,
					});
				}
				Ok(read) => filled += read,
				Err(error) if error.kind() == ErrorKind::Interrupted => continue,
				Err(error) if error.kind() == ErrorKind::UnexpectedEof => {
					return Err(BinaryError::TruncatedInput {
						position: self.position + filled as u64,
						expected: buffer.len(),
						available: filled,
					});
				}
				Err(error) => return Err(error.into()),
			}
		}
		self.position += filled as u64;
		Ok(())
	}

	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BinaryError> {
		let mut buffer = [0; N];
		self.read_exact_into(&mut buffer)?;
		Ok(buffer)
	}

	pub fn read_u32_le(&mut self) -> Result<u32, BinaryError> {
		self.read_array().map(u32::from_le_bytes)
	}

	pub fn read_f32_le(&mut self) -> Result<f32, BinaryError> {
		self.read_array().map(f32::from_le_bytes)
	}

	/// Reads a `u32` length `n` followed by exactly `n` bytes.
	///
	/// The declared length is not trusted for allocation; bytes are pulled through [`Read::take`] so a corrupt
	/// prefix on a short stream ends in [`BinaryError::TruncatedInput`] instead of a huge allocation.
	pub fn read_length_prefixed_bytes(&mut self) -> Result<Vec<u8>, BinaryError> {
		let length = self.read_u32_le()? as usize;
		let start = self.position;

		let mut bytes = Vec::new();
		let read = (&mut self.inner).take(length as u64).read_to_end(&mut bytes)?;
		self.position += read as u64;

		if read < length {
			return Err(BinaryError::TruncatedInput {
				position: start + read as u64,
				expected: length,
				available: read,
			});
		}
		Ok(bytes)
	}

	/// Length-prefixed UTF-8. Invalid sequences are an error, never replaced.
	pub fn read_utf8_string(&mut self) -> Result<String, BinaryError> {
		let position = self.position;
		let bytes = self.read_length_prefixed_bytes()?;
		String::from_utf8(bytes).map_err(|source| BinaryError::InvalidEncoding { position, source })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn reads_little_endian_primitives() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&0x0403_0201_u32.to_le_bytes());
		bytes.extend_from_slice(&(-1.5_f32).to_le_bytes());
		let mut reader = BinaryReader::new(bytes.as_slice());

		assert_eq!(reader.read_u32_le().unwrap(), 0x0403_0201);
		assert_eq!(reader.read_f32_le().unwrap(), -1.5);
		assert_eq!(reader.position(), 8);
	}

	#[test]
	fn short_u32_is_truncated() {
		let mut reader = BinaryReader::new([1_u8, 2, 3].as_slice());
		match reader.read_u32_le() {
			Err(BinaryError::TruncatedInput { expected, available, .. }) => {
				assert_eq!(expected, 4);
				assert_eq!(available, 3);
			}
			other => panic!("expected truncation, got {other:?}"),
		}
	}

	#[test]
	fn length_prefix_longer_than_stream_is_truncated() {
		let mut bytes = u32::MAX.to_le_bytes().to_vec();
		bytes.extend_from_slice(b"abc");
		let mut reader = BinaryReader::new(bytes.as_slice());

		let error = reader.read_length_prefixed_bytes().unwrap_err();
		assert!(error.is_truncation());
	}

	#[test]
	fn invalid_utf8_is_not_replaced() {
		let mut bytes = 2_u32.to_le_bytes().to_vec();
		bytes.extend_from_slice(&[0xC3, 0x28]);
		let mut reader = BinaryReader::new(bytes.as_slice());

		assert!(matches!(reader.read_utf8_string(), Err(BinaryError::InvalidEncoding { position: 0, .. })));
	}

	#[test]
	fn empty_string() {
		let mut reader = BinaryReader::new([0_u8, 0, 0, 0].as_slice());
		assert_eq!(reader.read_utf8_string().unwrap(), "");
	}

	#[test]
	fn source_eof_error_is_truncation() {
		struct EndsEarly;
		impl Read for EndsEarly {
			fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
				Err(ErrorKind::UnexpectedEof.into())
			}
		}

		let mut reader = BinaryReader::new(EndsEarly);
		assert!(reader.read_f32_le().unwrap_err().is_truncation());
	}
}
