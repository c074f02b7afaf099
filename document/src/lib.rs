pub mod color;
pub mod consts;
pub mod document;
pub mod error;
pub mod format;
pub mod layer_panel;
pub mod layers;
pub mod render;
pub mod response;

pub use document::Document;
pub use error::DocumentError;
pub use response::DocumentResponse;

pub type LayerId = u64;
