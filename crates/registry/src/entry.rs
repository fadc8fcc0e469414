//! Entry trait and the shared handle returned by registry lookups.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use strata_primitives::{CapabilitySet, Identifier};

/// A value stored in the registry.
///
/// Entries do not carry their own identifier; the registry assigns it once
/// when the entry is wrapped in an [`EntryRef`].
pub trait Entry: Any + Send + Sync + fmt::Debug {
	/// Capabilities this entry provides, checked against expected reservations.
	fn capabilities(&self) -> CapabilitySet {
		CapabilitySet::empty()
	}

	/// Whether the entry should be shown as a user-visible, selectable item.
	fn should_display(&self, _advanced: bool) -> bool {
		true
	}
}

struct Registered {
	id: Identifier,
	type_key: Option<Identifier>,
	value: Box<dyn Entry>,
}

/// Shared handle to a registered entry.
///
/// Cloning is a refcount bump. Equality is identity: two handles are equal
/// only if they point at the same registered instance.
#[derive(Clone)]
pub struct EntryRef(Arc<Registered>);

impl EntryRef {
	pub(crate) fn new(id: Identifier, type_key: Option<Identifier>, value: Box<dyn Entry>) -> Self {
		Self(Arc::new(Registered { id, type_key, value }))
	}

	/// Returns the identifier assigned at registration.
	pub fn id(&self) -> &Identifier {
		&self.0.id
	}

	/// Returns the type key that materialized this entry.
	///
	/// `None` for entries registered directly into the static tier.
	pub fn type_key(&self) -> Option<&Identifier> {
		self.0.type_key.as_ref()
	}

	/// Returns the entry as a trait object.
	pub fn value(&self) -> &dyn Entry {
		&*self.0.value
	}

	/// Returns the entry as `T` if that is its concrete type.
	pub fn downcast_ref<T: Entry>(&self) -> Option<&T> {
		let any: &dyn Any = self.value();
		any.downcast_ref::<T>()
	}

	/// Returns true if both handles point at the same registered instance.
	pub fn ptr_eq(a: &Self, b: &Self) -> bool {
		Arc::ptr_eq(&a.0, &b.0)
	}
}

impl Deref for EntryRef {
	type Target = dyn Entry;

	fn deref(&self) -> &Self::Target {
		self.value()
	}
}

impl PartialEq for EntryRef {
	fn eq(&self, other: &Self) -> bool {
		Self::ptr_eq(self, other)
	}
}

impl Eq for EntryRef {}

impl fmt::Debug for EntryRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntryRef")
			.field("id", &self.0.id)
			.field("type_key", &self.0.type_key)
			.field("value", &self.0.value)
			.finish()
	}
}

/// The default entry returned for any identifier the registry cannot resolve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmptyEntry;

impl Entry for EmptyEntry {
	fn should_display(&self, _advanced: bool) -> bool {
		false
	}
}
