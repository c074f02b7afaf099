//! Sequential little-endian primitives shared by the project file format.
//!
//! All values are read from a forward-only [`std::io::Read`] and written to an append-only
//! [`std::io::Write`]. Nothing is buffered or seeked; wrap the stream in a `BufReader`/`BufWriter`
//! when that matters.

mod error;
mod read;
mod write;

pub use error::BinaryError;
pub use read::BinaryReader;
pub use write::BinaryWriter;
