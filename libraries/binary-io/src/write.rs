use crate::BinaryError;

use std::io::Write;

/// Append-only writer of little-endian primitives, the mirror image of [`crate::BinaryReader`].
pub struct BinaryWriter<W> {
	inner: W,
	position: u64,
}

impl<W: Write> BinaryWriter<W> {
	pub fn new(inner: W) -> Self {
		Self { inner, position: 0 }
	}

	pub fn position(&self) -> u64 {
		self.position
	}

	pub fn into_inner(self) -> W {
		self.inner
	}

	pub fn flush(&mut self) -> Result<(), BinaryError> {
		self.inner.flush().map_err(Into::into)
	}

	pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), BinaryError> {
		self.inner.write_all(bytes)?;
		self.position += bytes.len() as u64;
		Ok(())
	}

	pub fn write_u32_le(&mut self, value: u32) -> Result<(), BinaryError> {
		self.write_raw(&value.to_le_bytes())
	}

	pub fn write_f32_le(&mut self, value: f32) -> Result<(), BinaryError> {
		self.write_raw(&value.to_le_bytes())
	}

	/// Writes a `u32` length prefix, failing before anything is written if it would overflow.
	pub fn write_length(&mut self, length: usize) -> Result<(), BinaryError> {
		let length = u32::try_from(length).map_err(|_| BinaryError::LengthOverflow(length))?;
		self.write_u32_le(length)
	}

	pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<(), BinaryError> {
		self.write_length(bytes.len())?;
		self.write_raw(bytes)
	}

	pub fn write_utf8_string(&mut self, string: &str) -> Result<(), BinaryError> {
		self.write_length_prefixed_bytes(string.as_bytes())
	}
}
