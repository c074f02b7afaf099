use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
	red: u8,
	green: u8,
	blue: u8,
	alpha: u8,
}

impl Color {
	pub const BLACK: Color = Color::from_rgba8(0, 0, 0, 255);

	pub const fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
		Color { red, green, blue, alpha }
	}

	/// Return a Color without transparency (alpha = 0xFF).
	pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Color {
		Color::from_rgba8(red, green, blue, 255)
	}

	/// Builds a color from unit floats stored alpha first (`[a, r, g, b]`).
	///
	/// Each channel is clamped to `0..=1` and converted with `round(x * 255)`.
	/// ```
	/// use strata_document::color::Color;
	/// assert_eq!(Color::from_unit_argb([1., 0., 0.5, 1.]), Color::from_rgba8(0, 128, 255, 255));
	/// ```
	pub fn from_unit_argb([alpha, red, green, blue]: [f64; 4]) -> Color {
		let channel = |value: f64| (value.clamp(0., 1.) * 255.).round() as u8;
		Color::from_rgba8(channel(red), channel(green), channel(blue), channel(alpha))
	}

	/// Unpacks `0xRRGGBBAA`.
	pub const fn from_rgba_u32(packed: u32) -> Color {
		let [red, green, blue, alpha] = packed.to_be_bytes();
		Color::from_rgba8(red, green, blue, alpha)
	}

	/// Packs into `0xRRGGBBAA`.
	pub const fn to_rgba_u32(self) -> u32 {
		u32::from_be_bytes([self.red, self.green, self.blue, self.alpha])
	}

	pub fn r(&self) -> u8 {
		self.red
	}

	pub fn g(&self) -> u8 {
		self.green
	}

	pub fn b(&self) -> u8 {
		self.blue
	}

	pub fn a(&self) -> u8 {
		self.alpha
	}

	pub fn opacity(&self) -> f32 {
		self.alpha as f32 / 255.
	}

	pub fn components(&self) -> [u8; 4] {
		[self.red, self.green, self.blue, self.alpha]
	}

	/// Return a String of hexadecimal value with two digits per channel (RGB).
	/// ```
	/// use strata_document::color::Color;
	/// assert_eq!(Color::from_rgb8(0x72, 0x67, 0x62).rgb_hex(), "726762");
	/// ```
	pub fn rgb_hex(&self) -> String {
		format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
	}

	pub fn rgba_hex(&self) -> String {
		format!("{:02x}{:02x}{:02x}{:02x}", self.red, self.green, self.blue, self.alpha)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn argb_is_reordered() {
		let color = Color::from_unit_argb([0.5, 1., 0., 0.]);
		assert_eq!(color.components(), [255, 0, 0, 128]);
	}

	#[test]
	fn out_of_range_channels_are_clamped() {
		let color = Color::from_unit_argb([2., -1., f64::NAN, 0.2]);
		assert_eq!(color.components(), [0, 0, 51, 255]);
	}

	#[test]
	fn packing() {
		let color = Color::from_rgba8(0x12, 0x34, 0x56, 0x78);
		assert_eq!(color.to_rgba_u32(), 0x1234_5678);
		assert_eq!(Color::from_rgba_u32(0x1234_5678), color);
		assert_eq!(color.rgba_hex(), "12345678");
	}
}
