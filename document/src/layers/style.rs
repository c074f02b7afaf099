use crate::color::Color;
use crate::consts::DEFAULT_STROKE_WIDTH;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Fill {
	color: Color,
}

impl Fill {
	pub const fn new(color: Color) -> Self {
		Self { color }
	}

	pub fn color(&self) -> Color {
		self.color
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
	color: Color,
	width: f32,
}

impl Stroke {
	pub const fn new(color: Color, width: f32) -> Self {
		Self { color, width }
	}

	pub fn color(&self) -> Color {
		self.color
	}

	pub fn width(&self) -> f32 {
		self.width
	}
}

impl Default for Stroke {
	fn default() -> Self {
		Self::new(Color::BLACK, DEFAULT_STROKE_WIDTH)
	}
}

/// How a shape is painted. The default is a one pixel black outline with no fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
	stroke: Option<Stroke>,
	fill: Option<Fill>,
}

impl Default for PathStyle {
	fn default() -> Self {
		Self {
			stroke: Some(Stroke::default()),
			fill: None,
		}
	}
}

impl PathStyle {
	pub fn new(stroke: Option<Stroke>, fill: Option<Fill>) -> Self {
		Self { stroke, fill }
	}

	pub fn fill(&self) -> Option<Fill> {
		self.fill
	}

	pub fn stroke(&self) -> Option<Stroke> {
		self.stroke
	}

	pub fn set_fill(&mut self, fill: Fill) {
		self.fill = Some(fill);
	}

	pub fn clear_stroke(&mut self) {
		self.stroke = None;
	}

	/// Distance the painted outline extends past the geometry.
	pub fn stroke_overhang(&self) -> f64 {
		self.stroke.map_or(0., |stroke| stroke.width as f64 / 2.)
	}
}
