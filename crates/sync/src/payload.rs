//! Sync payload codec.
//!
//! A payload is an unordered list of `(type key, identifier, fields)` triples,
//! postcard-encoded. Identifiers travel as their canonical `namespace:path`
//! text and are validated on receipt; fields are whatever the entry type's
//! factory produced.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strata_registry::wire::parse_wire_identifier;
use strata_registry::{DynamicTier, DynamicTierBuilder, Registry, TypeRegistry};

use crate::error::SyncError;

/// One serialized dynamic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntry {
	pub type_key: String,
	pub id: String,
	pub fields: Vec<u8>,
}

/// The full dynamic tier of the sending registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
	pub entries: Vec<WireEntry>,
}

impl SyncPayload {
	/// Serializes every entry of `tier` through its type's factory.
	pub fn from_tier(types: &TypeRegistry, tier: &DynamicTier) -> Result<Self, SyncError> {
		let entries = tier
			.entries()
			.map(|entry| {
				let (type_key, fields) = types.encode(entry).map_err(|source| SyncError::Entry {
					id: entry.id().clone(),
					source,
				})?;
				Ok(WireEntry {
					type_key: type_key.to_string(),
					id: entry.id().to_string(),
					fields,
				})
			})
			.collect::<Result<Vec<_>, SyncError>>()?;
		Ok(Self { entries })
	}

	pub fn encode(&self) -> Result<Bytes, SyncError> {
		Ok(Bytes::from(postcard::to_allocvec(self)?))
	}

	pub fn decode(bytes: &[u8]) -> Result<Self, SyncError> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Rebuilds a dynamic tier for `registry` from the payload.
	///
	/// Entries are decoded through the registry's type table. Entries whose id
	/// the receiving registry holds statically are dropped with a warning,
	/// as during a local reload. Fails on the first invalid identifier,
	/// unknown type, undecodable fields or repeated identifier.
	pub fn into_tier(self, registry: &Registry) -> Result<DynamicTier, SyncError> {
		let types = registry.types();
		let mut builder = DynamicTierBuilder::new();
		for wire in self.entries {
			let id = parse_wire_identifier(&wire.id)?;
			let type_key = parse_wire_identifier(&wire.type_key)?;
			let entry = types
				.decode(&type_key, &wire.fields)
				.map_err(|source| SyncError::Entry { id: id.clone(), source })?;
			if registry.is_static(&id) {
				tracing::warn!(%id, "synced entry ignored, a static entry owns this id");
				continue;
			}
			if !builder.insert(id.clone(), type_key, entry) {
				return Err(SyncError::DuplicateEntry(id));
			}
		}
		Ok(builder.build())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
