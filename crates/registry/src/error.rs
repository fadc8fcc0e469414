//! Error types for registration, loading, the wire format and configuration.

use std::fmt;
use std::path::PathBuf;

use strata_primitives::{Identifier, IdentifierError};

/// Which registration table already holds a conflicting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
	/// The static tier.
	Static,
	/// The expected dynamic set.
	Expected,
	/// The type registry.
	Type,
}

impl fmt::Display for Claim {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Claim::Static => f.write_str("a static entry"),
			Claim::Expected => f.write_str("an expected dynamic entry"),
			Claim::Type => f.write_str("an entry type"),
		}
	}
}

/// Fatal registration errors.
///
/// These indicate a packaging or programming defect in a content owner and
/// are surfaced synchronously to the registering caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("'{id}' is already registered as {existing}")]
	DuplicateEntry { id: Identifier, existing: Claim },
	#[error("the registration phase has already completed")]
	RegistrationClosed,
}

/// Failure to turn a single document (or wire fields) into an entry.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
	#[error("missing '{field}' discriminator")]
	MissingDiscriminator { field: String },
	#[error("unknown entry type '{key}'{}", did_you_mean(.suggestion))]
	UnknownType {
		key: String,
		suggestion: Option<String>,
	},
	#[error("missing field '{0}'")]
	MissingField(String),
	#[error("unknown entry '{0}'")]
	UnknownEntry(Identifier),
	#[error("entry '{0}' has no type key and cannot be encoded")]
	Untyped(Identifier),
	#[error("entry is not a {expected}")]
	WrongType { expected: &'static str },
	#[error("invalid identifier: {0}")]
	Identifier(#[from] IdentifierError),
	#[error("malformed document: {0}")]
	Json(#[from] serde_json::Error),
	#[error("wire codec: {0}")]
	Codec(#[from] postcard::Error),
	#[error("malformed document: {0}")]
	Malformed(String),
}

impl DocumentError {
	/// Returns true if the error means no factory could be selected.
	pub fn is_unknown_type(&self) -> bool {
		matches!(
			self,
			DocumentError::MissingDiscriminator { .. } | DocumentError::UnknownType { .. }
		)
	}
}

fn did_you_mean(suggestion: &Option<String>) -> String {
	match suggestion {
		Some(s) => format!(" (did you mean '{s}'?)"),
		None => String::new(),
	}
}

/// Batch-wide reload failure. The previous dynamic tier stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("document '{id}': {source}")]
	UnknownType { id: Identifier, source: DocumentError },
	#[error("document '{id}': {source}")]
	MalformedDocument { id: Identifier, source: DocumentError },
	#[error("document '{0}' appears more than once in the reload batch")]
	DuplicateDocument(Identifier),
}

impl LoadError {
	/// Classifies a per-document failure into the batch error it causes.
	pub(crate) fn from_document(id: Identifier, source: DocumentError) -> Self {
		if source.is_unknown_type() {
			LoadError::UnknownType { id, source }
		} else {
			LoadError::MalformedDocument { id, source }
		}
	}

	/// Returns the id of the document that aborted the batch.
	pub fn id(&self) -> &Identifier {
		match self {
			LoadError::UnknownType { id, .. }
			| LoadError::MalformedDocument { id, .. }
			| LoadError::DuplicateDocument(id) => id,
		}
	}
}

/// Errors reading identifiers or entries off the wire.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
	#[error("wire decode failed: {0}")]
	Decode(#[from] postcard::Error),
	#[error("invalid identifier on the wire: {0}")]
	Identifier(#[from] IdentifierError),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("invalid config: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("invalid namespace '{namespace}': {source}")]
	Namespace {
		namespace: String,
		source: IdentifierError,
	},
	#[error("{0}")]
	Invalid(&'static str),
}
