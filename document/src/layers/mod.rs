//! # Layers
//! A document is a tree of [`layer_info::Layer`]s rooted in a group. Each layer carries the shared
//! properties (name, position, visibility, selection) and one kind-specific payload from the closed
//! [`layer_info::LayerDataType`] enum.

pub mod group_layer;
pub mod image_layer;
pub mod layer_info;
pub mod shape_layer;
pub mod style;
pub mod text_layer;
pub mod vector;
