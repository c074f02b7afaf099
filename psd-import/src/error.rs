use crate::foreign::ForeignLayerKind;

use strata_document::DocumentError;
use thiserror::Error;

/// Why a single foreign layer was left out of an import.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
	#[error("{0} layers have no counterpart in the document model")]
	UnsupportedLayerKind(ForeignLayerKind),
	#[error("the layer data could not be decoded: {0}")]
	DecodeFailure(String),
	#[error("the layer is malformed: {0}")]
	InvalidFormat(String),
	#[error("paragraph justification {0} has no matching alignment")]
	UnmappedAlignment(i64),
	#[error("{0}")]
	Document(#[from] DocumentError),
}
