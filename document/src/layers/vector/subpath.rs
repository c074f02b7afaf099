use super::Bezier;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A single anchor with up to two optional associated handles along a [`Subpath`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManipulatorGroup {
	pub anchor: DVec2,
	pub in_handle: Option<DVec2>,
	pub out_handle: Option<DVec2>,
}

impl ManipulatorGroup {
	pub fn new(anchor: DVec2, in_handle: Option<DVec2>, out_handle: Option<DVec2>) -> Self {
		Self { anchor, in_handle, out_handle }
	}

	pub fn new_anchor(anchor: DVec2) -> Self {
		Self::new(anchor, None, None)
	}

	/// The segment from this group to `end_group`, using this group's out handle and the end group's in handle.
	pub fn to_bezier(&self, end_group: &ManipulatorGroup) -> Bezier {
		let start = self.anchor;
		let end = end_group.anchor;

		match (self.out_handle, end_group.in_handle) {
			(Some(handle1), Some(handle2)) => Bezier::from_cubic_dvec2(start, handle1, handle2, end),
			(Some(handle), None) | (None, Some(handle)) => Bezier::from_quadratic_dvec2(start, handle, end),
			(None, None) => Bezier::from_linear_dvec2(start, end),
		}
	}
}

/// An open or closed path made of [`Bezier`] segments between consecutive manipulator groups.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Subpath {
	manipulator_groups: Vec<ManipulatorGroup>,
	pub closed: bool,
}

/// Iterates over each segment of a [`Subpath`], including the closing segment of a closed one.
pub struct SubpathIter<'a> {
	index: usize,
	subpath: &'a Subpath,
}

impl Iterator for SubpathIter<'_> {
	type Item = Bezier;

	fn next(&mut self) -> Option<Self::Item> {
		let groups = &self.subpath.manipulator_groups;
		if self.index >= self.subpath.len_segments() {
			return None;
		}
		let start_index = self.index;
		let end_index = (self.index + 1) % groups.len();
		self.index += 1;

		Some(groups[start_index].to_bezier(&groups[end_index]))
	}
}

impl Subpath {
	pub fn new(manipulator_groups: Vec<ManipulatorGroup>, closed: bool) -> Self {
		Self { manipulator_groups, closed }
	}

	pub fn manipulator_groups(&self) -> &[ManipulatorGroup] {
		&self.manipulator_groups
	}

	pub fn len(&self) -> usize {
		self.manipulator_groups.len()
	}

	pub fn is_empty(&self) -> bool {
		self.manipulator_groups.is_empty()
	}

	/// Number of segments, counting the closing one.
	pub fn len_segments(&self) -> usize {
		match self.manipulator_groups.len() {
			0 => 0,
			len => len - 1 + usize::from(self.closed),
		}
	}

	pub fn iter(&self) -> SubpathIter<'_> {
		SubpathIter { index: 0, subpath: self }
	}

	pub fn to_bez_path(&self) -> kurbo::BezPath {
		let mut path = kurbo::BezPath::new();
		let Some(first) = self.manipulator_groups.first() else { return path };

		path.move_to((first.anchor.x, first.anchor.y));
		for segment in self.iter() {
			segment.append_to_bez_path(&mut path);
		}
		if self.closed {
			path.close_path();
		}
		path
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layers::vector::BezierHandles;

	fn triangle(closed: bool) -> Subpath {
		Subpath::new(
			vec![
				ManipulatorGroup::new_anchor(DVec2::new(0., 0.)),
				ManipulatorGroup::new(DVec2::new(10., 0.), Some(DVec2::new(5., -5.)), None),
				ManipulatorGroup::new_anchor(DVec2::new(10., 10.)),
			],
			closed,
		)
	}

	#[test]
	fn open_subpath_has_one_segment_per_pair() {
		let segments: Vec<_> = triangle(false).iter().collect();
		assert_eq!(segments.len(), 2);
		assert_eq!(segments[0].handles, BezierHandles::Quadratic { handle: DVec2::new(5., -5.) });
		assert_eq!(segments[1].handles, BezierHandles::Linear);
	}

	#[test]
	fn closed_subpath_returns_to_start() {
		let segments: Vec<_> = triangle(true).iter().collect();
		assert_eq!(segments.len(), 3);
		assert_eq!(segments[2].start, DVec2::new(10., 10.));
		assert_eq!(segments[2].end, DVec2::new(0., 0.));
	}

	#[test]
	fn empty_subpath_has_no_segments() {
		assert_eq!(Subpath::default().iter().count(), 0);
		assert!(Subpath::default().to_bez_path().elements().is_empty());
	}
}
