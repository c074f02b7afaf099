use crate::LayerId;

use std::fmt;

/// Change notifications emitted by [`crate::Document`] while it is being mutated.
///
/// Structural changes come in pairs so a derived view can update incrementally: an `AboutTo…` response is sent
/// before the document changes and the matching past-tense response after.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentResponse {
	AboutToInsertLayer {
		parent: Vec<LayerId>,
		index: usize,
	},
	/// Sent for the appended layer, then for each of its descendants in pre-order.
	InsertedLayer {
		path: Vec<LayerId>,
	},
	AboutToRemoveLayer {
		path: Vec<LayerId>,
		index: usize,
	},
	/// Sent for each descendant of the removed layer, deepest first, then for the layer itself.
	RemovedLayer {
		path: Vec<LayerId>,
	},
	/// Name, visibility or position changed.
	LayerChanged {
		path: Vec<LayerId>,
	},
	/// Sent once per batch of selection changes with the complete resulting selection.
	SelectionChanged {
		selected: Vec<Vec<LayerId>>,
	},
}

impl fmt::Display for DocumentResponse {
	fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			DocumentResponse::AboutToInsertLayer { .. } => "AboutToInsertLayer",
			DocumentResponse::InsertedLayer { .. } => "InsertedLayer",
			DocumentResponse::AboutToRemoveLayer { .. } => "AboutToRemoveLayer",
			DocumentResponse::RemovedLayer { .. } => "RemovedLayer",
			DocumentResponse::LayerChanged { .. } => "LayerChanged",
			DocumentResponse::SelectionChanged { .. } => "SelectionChanged",
		};

		formatter.write_str(name)
	}
}

/// Receives [`DocumentResponse`]s synchronously from inside the mutating call.
///
/// Observers cannot reach the document from the callback; anything that needs to write back does so after the
/// mutation returns, under its own re-entrancy guard (see [`crate::layer_panel::LayerPanel`]).
pub trait DocumentObserver {
	fn handle_response(&self, response: &DocumentResponse);
}
