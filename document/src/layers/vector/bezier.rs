use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BezierHandles {
	Linear,
	/// Handles for a quadratic curve.
	Quadratic {
		handle: DVec2,
	},
	/// Handles for a cubic curve.
	Cubic {
		/// Point describing the tangent at the start of the curve.
		handle_start: DVec2,
		/// Point describing the tangent at the end of the curve.
		handle_end: DVec2,
	},
}

/// A single linear, quadratic or cubic segment.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bezier {
	pub start: DVec2,
	pub end: DVec2,
	pub handles: BezierHandles,
}

impl Bezier {
	pub fn from_linear_dvec2(start: DVec2, end: DVec2) -> Self {
		Bezier { start, end, handles: BezierHandles::Linear }
	}

	pub fn from_quadratic_dvec2(start: DVec2, handle: DVec2, end: DVec2) -> Self {
		Bezier {
			start,
			end,
			handles: BezierHandles::Quadratic { handle },
		}
	}

	pub fn from_cubic_dvec2(start: DVec2, handle_start: DVec2, handle_end: DVec2, end: DVec2) -> Self {
		Bezier {
			start,
			end,
			handles: BezierHandles::Cubic { handle_start, handle_end },
		}
	}

	/// Appends this segment to `path`, which must already be positioned at `self.start`.
	pub fn append_to_bez_path(&self, path: &mut kurbo::BezPath) {
		let point = |v: DVec2| kurbo::Point::new(v.x, v.y);
		match self.handles {
			BezierHandles::Linear => path.line_to(point(self.end)),
			BezierHandles::Quadratic { handle } => path.quad_to(point(handle), point(self.end)),
			BezierHandles::Cubic { handle_start, handle_end } => path.curve_to(point(handle_start), point(handle_end), point(self.end)),
		}
	}
}
