//! Type registry: maps discriminator keys to entry factories.

use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strata_primitives::Identifier;

use crate::entry::{Entry, EntryRef};
use crate::error::{Claim, DocumentError, RegistryError};

/// Builds entries of one kind from documents and from wire fields.
pub trait EntryFactory: Send + Sync + 'static {
	/// Materializes an entry from a configuration document (a JSON object).
	fn from_document(&self, document: &Value) -> Result<Box<dyn Entry>, DocumentError>;

	/// Encodes the type-specific fields of an entry this factory produced.
	fn encode(&self, entry: &dyn Entry) -> Result<Vec<u8>, DocumentError>;

	/// Rebuilds an entry from fields produced by [`EntryFactory::encode`].
	fn decode(&self, fields: &[u8]) -> Result<Box<dyn Entry>, DocumentError>;
}

/// Factory for entry types that are plain serde data.
///
/// Documents go through `serde_json`, wire fields through `postcard`. Since
/// postcard is not self-describing, `T` must not rely on `deserialize_any`
/// (untagged enums, `flatten`, embedded `serde_json::Value`).
pub struct SerdeFactory<T>(PhantomData<fn() -> T>);

impl<T> SerdeFactory<T> {
	pub const fn new() -> Self {
		Self(PhantomData)
	}
}

impl<T> Default for SerdeFactory<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> EntryFactory for SerdeFactory<T>
where
	T: Entry + Serialize + DeserializeOwned,
{
	fn from_document(&self, document: &Value) -> Result<Box<dyn Entry>, DocumentError> {
		let value = T::deserialize(document)?;
		Ok(Box::new(value))
	}

	fn encode(&self, entry: &dyn Entry) -> Result<Vec<u8>, DocumentError> {
		let any: &dyn Any = entry;
		let value = any
			.downcast_ref::<T>()
			.ok_or(DocumentError::WrongType {
				expected: type_name::<T>(),
			})?;
		Ok(postcard::to_allocvec(value)?)
	}

	fn decode(&self, fields: &[u8]) -> Result<Box<dyn Entry>, DocumentError> {
		let value: T = postcard::from_bytes(fields)?;
		Ok(Box::new(value))
	}
}

/// Discriminator-driven dispatch table.
///
/// Populated during the registration phase only; kinds stay open to
/// extension by any content owner.
pub struct TypeRegistry {
	discriminator: String,
	factories: FxHashMap<Identifier, Arc<dyn EntryFactory>>,
}

impl TypeRegistry {
	/// Creates an empty registry reading the type key from `discriminator`.
	pub fn new(discriminator: impl Into<String>) -> Self {
		Self {
			discriminator: discriminator.into(),
			factories: FxHashMap::default(),
		}
	}

	/// Registers a factory, rejecting a type key that is already taken.
	pub fn register(&mut self, key: Identifier, factory: Arc<dyn EntryFactory>) -> Result<(), RegistryError> {
		if self.factories.contains_key(&key) {
			return Err(RegistryError::DuplicateEntry {
				id: key,
				existing: Claim::Type,
			});
		}
		self.factories.insert(key, factory);
		Ok(())
	}

	/// Returns the name of the discriminator field.
	pub fn discriminator(&self) -> &str {
		&self.discriminator
	}

	/// Returns the factory registered for `key`.
	pub fn get(&self, key: &Identifier) -> Option<&dyn EntryFactory> {
		self.factories.get(key).map(|f| &**f)
	}

	pub fn contains(&self, key: &Identifier) -> bool {
		self.factories.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.factories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}

	/// Returns every registered type key.
	pub fn keys(&self) -> impl Iterator<Item = &Identifier> {
		self.factories.keys()
	}

	/// Resolves the factory named by a document's discriminator.
	pub fn resolve(&self, document: &Value) -> Result<(Identifier, &dyn EntryFactory), DocumentError> {
		let Some(raw) = document.get(&self.discriminator).and_then(Value::as_str) else {
			return Err(DocumentError::MissingDiscriminator {
				field: self.discriminator.clone(),
			});
		};
		let key = Identifier::parse(raw).map_err(|_| self.unknown(raw))?;
		match self.factories.get(&key) {
			Some(factory) => Ok((key, &**factory)),
			None => Err(self.unknown(raw)),
		}
	}

	/// Reads the discriminator and materializes the document through its factory.
	pub fn deserialize(&self, document: &Value) -> Result<(Identifier, Box<dyn Entry>), DocumentError> {
		let (key, factory) = self.resolve(document)?;
		let entry = factory.from_document(document)?;
		Ok((key, entry))
	}

	/// Encodes a dynamic entry's type-specific fields.
	pub fn encode(&self, entry: &EntryRef) -> Result<(Identifier, Vec<u8>), DocumentError> {
		let Some(key) = entry.type_key() else {
			return Err(DocumentError::Untyped(entry.id().clone()));
		};
		let factory = self.get(key).ok_or_else(|| self.unknown(key.as_str()))?;
		let fields = factory.encode(entry.value())?;
		Ok((key.clone(), fields))
	}

	/// Rebuilds an entry of type `key` from wire fields.
	pub fn decode(&self, key: &Identifier, fields: &[u8]) -> Result<Box<dyn Entry>, DocumentError> {
		let factory = self.get(key).ok_or_else(|| self.unknown(key.as_str()))?;
		factory.decode(fields)
	}

	fn unknown(&self, key: &str) -> DocumentError {
		DocumentError::UnknownType {
			key: key.to_string(),
			suggestion: self.suggest(key),
		}
	}

	/// Suggests a registered type key close to `key`.
	fn suggest(&self, key: &str) -> Option<String> {
		self.factories
			.keys()
			.map(Identifier::as_str)
			.min_by_key(|k| strsim::levenshtein(key, k))
			.filter(|k| strsim::levenshtein(key, k) <= 3)
			.map(str::to_string)
	}
}

impl std::fmt::Debug for TypeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut keys: Vec<_> = self.factories.keys().map(Identifier::as_str).collect();
		keys.sort_unstable();
		f.debug_struct("TypeRegistry")
			.field("discriminator", &self.discriminator)
			.field("keys", &keys)
			.finish()
	}
}
