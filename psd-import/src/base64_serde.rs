//! Basic wrapper for [`serde`] to perform [`base64`] encoding

use base64::Engine;
use serde::{Deserialize, Deserializer, Serializer};

pub fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

pub fn from_base64<'a, D: Deserializer<'a>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
	use serde::de::Error;

	let string = String::deserialize(deserializer)?;
	base64::engine::general_purpose::STANDARD.decode(string).map_err(|err| Error::custom(err.to_string()))
}
