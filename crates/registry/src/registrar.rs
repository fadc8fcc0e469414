//! One-shot registration phase for content owners.

use std::sync::Arc;

use strata_primitives::{CapabilitySet, Identifier};

use crate::entry::{Entry, EntryRef};
use crate::error::{Claim, RegistryError};
use crate::registry::Registry;
use crate::types::EntryFactory;

/// A registration whose namespace differs from the registering owner's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMismatch {
	pub owner: String,
	pub id: Identifier,
}

pub(crate) type NamespaceHook = Box<dyn Fn(&NamespaceMismatch) + Send + Sync>;

/// A collaborator that contributes static entries, expected dynamic entries
/// or entry types during the registration phase.
pub trait ContentOwner {
	/// Namespace the owner is expected to register under.
	fn namespace(&self) -> &str;

	fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistryError>;
}

/// Registration surface handed to one content owner.
pub struct Registrar<'a> {
	registry: &'a mut Registry,
	owner: String,
}

impl Registrar<'_> {
	/// Namespace of the owner this registrar was created for.
	pub fn owner(&self) -> &str {
		&self.owner
	}

	/// Registers a static entry; it can never be shadowed by a dynamic document.
	pub fn register_static(&mut self, id: Identifier, entry: impl Entry) -> Result<EntryRef, RegistryError> {
		self.register_static_boxed(id, Box::new(entry))
	}

	pub fn register_static_boxed(&mut self, id: Identifier, entry: Box<dyn Entry>) -> Result<EntryRef, RegistryError> {
		self.check_namespace(&id);
		if self.registry.expected.contains_key(&id) {
			return Err(RegistryError::DuplicateEntry {
				id,
				existing: Claim::Expected,
			});
		}
		if self.registry.statics.contains_key(&id) {
			return Err(RegistryError::DuplicateEntry {
				id,
				existing: Claim::Static,
			});
		}
		let entry = EntryRef::new(id.clone(), None, entry);
		self.registry.statics.insert(id, entry.clone());
		Ok(entry)
	}

	/// Reserves `id` for a dynamic document expected to provide `capabilities`.
	///
	/// Accepts a single [`Capability`](strata_primitives::Capability) or a
	/// [`CapabilitySet`]. The registry only reserves the key; whether the
	/// loaded entry actually satisfies the capabilities is reported by
	/// [`Registry::expectation_issues`] for the owner to act on.
	pub fn register_expected(
		&mut self,
		id: Identifier,
		capabilities: impl Into<CapabilitySet>,
	) -> Result<(), RegistryError> {
		let capabilities = capabilities.into();
		self.check_namespace(&id);
		if self.registry.statics.contains_key(&id) {
			return Err(RegistryError::DuplicateEntry {
				id,
				existing: Claim::Static,
			});
		}
		if self.registry.expected.contains_key(&id) {
			return Err(RegistryError::DuplicateEntry {
				id,
				existing: Claim::Expected,
			});
		}
		self.registry.expected.insert(id, capabilities);
		Ok(())
	}

	/// Registers a factory for documents whose discriminator is `key`.
	pub fn register_type(&mut self, key: Identifier, factory: impl EntryFactory) -> Result<(), RegistryError> {
		self.register_type_shared(key, Arc::new(factory))
	}

	pub fn register_type_shared(&mut self, key: Identifier, factory: Arc<dyn EntryFactory>) -> Result<(), RegistryError> {
		self.check_namespace(&key);
		self.registry.types.register(key, factory)
	}

	/// Warns when an owner registers outside its namespace.
	///
	/// Deliberate cross-owner overrides rely on this being allowed.
	fn check_namespace(&self, id: &Identifier) {
		if id.namespace() == self.owner {
			return;
		}
		tracing::warn!(
			id = %id,
			owner = %self.owner,
			"registration outside the owner's namespace; this may be an intended override, but usually indicates a broken owner"
		);
		if let Some(hook) = &self.registry.namespace_hook {
			hook(&NamespaceMismatch {
				owner: self.owner.clone(),
				id: id.clone(),
			});
		}
	}
}

impl Registry {
	/// Opens a registrar for one owner.
	///
	/// Fails once the registration phase has been closed.
	pub fn registrar(&mut self, owner: &str) -> Result<Registrar<'_>, RegistryError> {
		if self.registered {
			return Err(RegistryError::RegistrationClosed);
		}
		Ok(Registrar {
			registry: self,
			owner: owner.to_string(),
		})
	}

	/// Marks the registration phase as complete.
	pub fn close_registration(&mut self) {
		if self.registered {
			return;
		}
		self.registered = true;
		tracing::info!(
			statics = self.statics.len(),
			expected = self.expected.len(),
			types = self.types.len(),
			"registration phase complete"
		);
	}

	/// Runs the registration phase for every owner, then closes it.
	///
	/// The phase runs once per registry: a second call fails with
	/// [`RegistryError::RegistrationClosed`]. If an owner fails, its error is
	/// returned and the phase stays open.
	pub fn run_registration(&mut self, owners: &[&dyn ContentOwner]) -> Result<(), RegistryError> {
		for owner in owners {
			let mut registrar = self.registrar(owner.namespace())?;
			owner.register(&mut registrar)?;
		}
		if self.registered {
			return Err(RegistryError::RegistrationClosed);
		}
		self.close_registration();
		Ok(())
	}

	/// Installs a callback invoked for every namespace mismatch, in addition
	/// to the warning log.
	pub fn set_namespace_hook(&mut self, hook: impl Fn(&NamespaceMismatch) + Send + Sync + 'static) {
		self.namespace_hook = Some(Box::new(hook));
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use strata_primitives::Capability;

	use super::*;
	use crate::config::RegistryConfig;
	use crate::test_fixtures::{Fixed, Trait, id, trait_type};
	use crate::types::SerdeFactory;

	fn open_registry() -> Registry {
		Registry::new(RegistryConfig::default()).unwrap()
	}

	#[test]
	fn static_registration_assigns_id() {
		let mut registry = open_registry();
		let entry = registry
			.registrar("test")
			.unwrap()
			.register_static(id("test:anvil"), Fixed(7))
			.unwrap();
		assert_eq!(entry.id(), &id("test:anvil"));
		assert_eq!(registry.get(&id("test:anvil")), entry);
	}

	#[test]
	fn duplicate_static_keeps_original() {
		let mut registry = open_registry();
		let mut registrar = registry.registrar("test").unwrap();
		let first = registrar.register_static(id("test:anvil"), Fixed(1)).unwrap();
		let err = registrar.register_static(id("test:anvil"), Fixed(2)).unwrap_err();
		assert_eq!(
			err,
			RegistryError::DuplicateEntry {
				id: id("test:anvil"),
				existing: Claim::Static
			}
		);
		assert_eq!(registry.get(&id("test:anvil")), first);
		assert_eq!(registry.get(&id("test:anvil")).downcast_ref::<Fixed>(), Some(&Fixed(1)));
	}

	#[test]
	fn expected_then_static_conflicts() {
		let mut registry = open_registry();
		let mut registrar = registry.registrar("test").unwrap();
		registrar
			.register_expected(id("test:sharp"), CapabilitySet::LEVELED)
			.unwrap();
		let err = registrar.register_static(id("test:sharp"), Fixed(0)).unwrap_err();
		assert_eq!(
			err,
			RegistryError::DuplicateEntry {
				id: id("test:sharp"),
				existing: Claim::Expected
			}
		);
		assert!(!registry.contains(&id("test:sharp")));
	}

	#[test]
	fn static_then_expected_conflicts() {
		let mut registry = open_registry();
		let mut registrar = registry.registrar("test").unwrap();
		registrar.register_static(id("test:sharp"), Fixed(0)).unwrap();
		let err = registrar
			.register_expected(id("test:sharp"), CapabilitySet::empty())
			.unwrap_err();
		assert!(matches!(
			err,
			RegistryError::DuplicateEntry {
				existing: Claim::Static,
				..
			}
		));
	}

	#[test]
	fn duplicate_expected_conflicts() {
		let mut registry = open_registry();
		let mut registrar = registry.registrar("test").unwrap();
		registrar
			.register_expected(id("test:sharp"), CapabilitySet::empty())
			.unwrap();
		assert!(
			registrar
				.register_expected(id("test:sharp"), CapabilitySet::DISPLAY)
				.is_err()
		);
	}

	#[test]
	fn default_id_is_claimed_by_static_tier() {
		let mut registry = open_registry();
		let default_id = registry.default_id().clone();
		let mut registrar = registry.registrar("strata").unwrap();
		assert!(registrar.register_static(default_id.clone(), Fixed(0)).is_err());
		assert!(
			registrar
				.register_expected(default_id, CapabilitySet::empty())
				.is_err()
		);
	}

	#[test]
	fn namespace_mismatch_warns_but_registers() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let mut registry = open_registry();
		let sink = Arc::clone(&seen);
		registry.set_namespace_hook(move |mismatch| sink.lock().unwrap().push(mismatch.clone()));

		let mut registrar = registry.registrar("test").unwrap();
		registrar.register_static(id("other:override"), Fixed(0)).unwrap();
		registrar.register_static(id("test:own"), Fixed(0)).unwrap();
		registrar
			.register_type(id("other:trait"), SerdeFactory::<Trait>::new())
			.unwrap();
		registrar
			.register_expected(id("other:reserved"), Capability::Hooks)
			.unwrap();

		let seen = seen.lock().unwrap();
		assert_eq!(seen.len(), 3);
		assert_eq!(seen[0].owner, "test");
		assert_eq!(seen[0].id, id("other:override"));
		assert_eq!(seen[1].id, id("other:trait"));
		assert_eq!(seen[2].id, id("other:reserved"));
		assert!(registry.contains(&id("other:override")));
		assert_eq!(
			registry.expected_capabilities(&id("other:reserved")),
			Some(CapabilitySet::HOOKS)
		);
	}

	struct Owner {
		namespace: &'static str,
	}

	impl ContentOwner for Owner {
		fn namespace(&self) -> &str {
			self.namespace
		}

		fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistryError> {
			let ns = self.namespace;
			registrar.register_static(Identifier::new(ns, "fixed").unwrap(), Fixed(1))?;
			registrar.register_expected(Identifier::new(ns, "sharp").unwrap(), CapabilitySet::LEVELED)?;
			Ok(())
		}
	}

	#[test]
	fn run_registration_is_single_shot() {
		let mut registry = open_registry();
		let a = Owner { namespace: "alpha" };
		let b = Owner { namespace: "beta" };
		registry.run_registration(&[&a, &b]).unwrap();
		assert!(registry.is_registered());
		assert!(registry.contains(&id("alpha:fixed")));
		assert!(registry.contains(&id("beta:fixed")));

		assert_eq!(
			registry.run_registration(&[&a]),
			Err(RegistryError::RegistrationClosed)
		);
		assert!(matches!(
			registry.registrar("late"),
			Err(RegistryError::RegistrationClosed)
		));
	}

	#[test]
	fn failed_owner_leaves_phase_open() {
		let mut registry = open_registry();
		let a = Owner { namespace: "alpha" };
		let err = registry.run_registration(&[&a, &a]).unwrap_err();
		assert!(matches!(err, RegistryError::DuplicateEntry { .. }));
		assert!(!registry.is_registered());
	}

	#[test]
	fn registered_types_are_visible() {
		let mut registry = open_registry();
		registry
			.registrar("test")
			.unwrap()
			.register_type(trait_type(), SerdeFactory::<Trait>::new())
			.unwrap();
		assert!(registry.types().contains(&trait_type()));
	}
}
