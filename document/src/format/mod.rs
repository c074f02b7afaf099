//! # Project file format
//!
//! ```text
//! MAGIC (8 bytes)
//! CHUNK "LAYERS"
//!   u32 layer_count
//!   layer_count x (CHUNK tag, payload)
//! ```
//!
//! Integers and floats are little-endian, strings are length-prefixed UTF-8 and a chunk is a length-prefixed
//! ASCII tag. Every layer payload begins with `name, x (f32), y (f32)`:
//!
//! - `IMAGE`: `u32` byte length, PNG bytes
//! - `SHAPE`: style, `u32` sub-path count, per sub-path `u32` closed flag, `u32` knot count, per knot a `u32`
//!   handle mask (bit 0 in, bit 1 out) then the anchor and each present handle as two `f32`s
//! - `TEXT`: `u32` paragraph count, per paragraph `u32` alignment, `u32` run count, per run text, font
//!   family, `f32` size, `u32` RGBA color
//! - `GROUP`: `u32` child count followed by that many layer chunks
//!
//! Layers are written back to front so reading them in order restores the stacking. Payloads are not framed
//! by an overall length, which is why an unknown tag cannot be skipped and is rejected.

mod read;
mod write;

pub use read::deserialize;
pub use write::serialize;

use crate::Document;
use crate::error::FormatError;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub const MAGIC: [u8; 8] = *b"\x89STR\r\n\x1a\n";

// Chunk tags
pub const LAYERS_CHUNK: &[u8] = b"LAYERS";
pub const IMAGE_CHUNK: &[u8] = b"IMAGE";
pub const SHAPE_CHUNK: &[u8] = b"SHAPE";
pub const TEXT_CHUNK: &[u8] = b"TEXT";
pub const GROUP_CHUNK: &[u8] = b"GROUP";

/// Deepest group nesting accepted when reading.
pub const MAX_GROUP_DEPTH: usize = 256;

const HAS_IN_HANDLE: u32 = 1;
const HAS_OUT_HANDLE: u32 = 1 << 1;

pub fn save_to_path(document: &Document, path: &Path) -> Result<(), FormatError> {
	let file = File::create(path)?;
	serialize(document, BufWriter::new(file))
}

pub fn load_from_path(path: &Path) -> Result<Document, FormatError> {
	let file = File::open(path)?;
	deserialize(BufReader::new(file))
}
