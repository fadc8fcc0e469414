//! Sync error types.

use strata_registry::{DocumentError, Identifier, IdentifierError};

use crate::observer::ObserverId;

/// Failure to hand a payload to an observer's transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
	#[error("observer connection closed")]
	Closed,
	#[error("transport error: {0}")]
	Transport(String),
}

/// Errors building, decoding or applying a sync payload.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
	#[error("payload codec error: {0}")]
	Codec(#[from] postcard::Error),
	#[error("invalid identifier in payload: {0}")]
	Identifier(#[from] IdentifierError),
	#[error("entry '{id}': {source}")]
	Entry { id: Identifier, source: DocumentError },
	#[error("payload contains '{0}' more than once")]
	DuplicateEntry(Identifier),
	#[error("no observer with id {0}")]
	UnknownObserver(ObserverId),
}
