//! Immutable dynamic tier snapshots.

use rustc_hash::FxHashMap;
use strata_primitives::Identifier;

use crate::entry::{Entry, EntryRef};

/// One published generation of dynamically loaded entries.
///
/// A tier is never mutated after it is built; reloads publish a new one.
#[derive(Debug, Default)]
pub struct DynamicTier {
	entries: FxHashMap<Identifier, EntryRef>,
}

impl DynamicTier {
	pub fn get(&self, id: &Identifier) -> Option<&EntryRef> {
		self.entries.get(id)
	}

	pub fn contains(&self, id: &Identifier) -> bool {
		self.entries.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates identifiers in unspecified order.
	pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
		self.entries.keys()
	}

	/// Iterates entries in unspecified order.
	pub fn entries(&self) -> impl Iterator<Item = &EntryRef> {
		self.entries.values()
	}
}

/// Accumulates entries for a tier that has not been published yet.
#[derive(Debug, Default)]
pub struct DynamicTierBuilder {
	entries: FxHashMap<Identifier, EntryRef>,
}

impl DynamicTierBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assigns `id` to a freshly materialized entry and adds it.
	///
	/// Returns false, leaving the builder unchanged, if `id` is already present.
	pub fn insert(&mut self, id: Identifier, type_key: Identifier, entry: Box<dyn Entry>) -> bool {
		if self.entries.contains_key(&id) {
			return false;
		}
		let entry = EntryRef::new(id.clone(), Some(type_key), entry);
		self.entries.insert(id, entry);
		true
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn build(self) -> DynamicTier {
		DynamicTier {
			entries: self.entries,
		}
	}
}
