//! Registry configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_primitives::{Identifier, IdentifierError};

use crate::error::ConfigError;

/// Path of the default entry inside the configured namespace.
pub const DEFAULT_ENTRY_PATH: &str = "empty";

/// Settings shared by the registry, its loader and document sources.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Namespace of the registry itself; the default entry lives here.
	pub namespace: String,
	/// Document field naming the entry type.
	pub discriminator: String,
	/// Folder below each namespace directory that holds entry documents.
	pub folder: String,
	/// Buffered reload events per subscriber before old ones are dropped.
	pub event_capacity: usize,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			namespace: "strata".to_string(),
			discriminator: "type".to_string(),
			folder: "entries".to_string(),
			event_capacity: 16,
		}
	}
}

impl RegistryConfig {
	/// Parses and validates a TOML config.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML config file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	/// Identifier of the default entry.
	pub fn default_id(&self) -> Result<Identifier, IdentifierError> {
		Identifier::new(&self.namespace, DEFAULT_ENTRY_PATH)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		self.default_id().map_err(|source| ConfigError::Namespace {
			namespace: self.namespace.clone(),
			source,
		})?;
		if self.discriminator.is_empty() {
			return Err(ConfigError::Invalid("discriminator must not be empty"));
		}
		if self.folder.is_empty() {
			return Err(ConfigError::Invalid("folder must not be empty"));
		}
		if self.event_capacity == 0 {
			return Err(ConfigError::Invalid("event_capacity must be at least 1"));
		}
		Ok(())
	}
}
