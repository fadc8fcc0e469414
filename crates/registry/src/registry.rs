//! Registry core: tier storage and the read path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use serde_json::Value;
use strata_primitives::{CapabilitySet, Identifier};
use tokio::sync::broadcast;

use crate::condition::{AcceptAll, ConditionContext, ConditionPredicate};
use crate::config::RegistryConfig;
use crate::entry::{EmptyEntry, Entry, EntryRef};
use crate::error::{ConfigError, DocumentError};
use crate::registrar::NamespaceHook;
use crate::tier::DynamicTier;
use crate::types::TypeRegistry;

/// Where a published dynamic tier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOrigin {
	/// Built locally from configuration documents.
	Local,
	/// Applied from a sync payload sent by an authoritative node.
	Remote,
}

/// Published on the registry's notification channel after every swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
	/// Monotonic publication counter, starting at 1.
	pub generation: u64,
	pub origin: ReloadOrigin,
	/// Number of entries in the new dynamic tier.
	pub entries: usize,
}

/// Two-tier content registry.
///
/// Constructed once by the application root and shared (usually behind an
/// `Arc`) with every consumer after the registration phase. The static tier
/// and type table are only mutable through `&mut self`, which rules out
/// concurrent readers during registration.
pub struct Registry {
	pub(crate) config: RegistryConfig,
	pub(crate) default_entry: EntryRef,
	pub(crate) statics: FxHashMap<Identifier, EntryRef>,
	pub(crate) expected: FxHashMap<Identifier, CapabilitySet>,
	pub(crate) types: TypeRegistry,
	pub(crate) registered: bool,
	pub(crate) namespace_hook: Option<NamespaceHook>,
	pub(crate) predicate: Box<dyn ConditionPredicate>,
	pub(crate) condition: ArcSwap<ConditionContext>,
	dynamic: ArcSwap<DynamicTier>,
	dynamic_loaded: AtomicBool,
	generation: AtomicU64,
	events: broadcast::Sender<ReloadEvent>,
}

impl Registry {
	/// Creates a registry whose default entry is an [`EmptyEntry`].
	pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
		Self::with_default_entry(config, Box::new(EmptyEntry))
	}

	/// Creates a registry with a custom default entry.
	///
	/// The default entry is placed in the static tier under
	/// `<namespace>:empty` and is the fallback for every unresolved lookup.
	pub fn with_default_entry(config: RegistryConfig, default: Box<dyn Entry>) -> Result<Self, ConfigError> {
		config.validate()?;
		let default_id = config.default_id().map_err(|source| ConfigError::Namespace {
			namespace: config.namespace.clone(),
			source,
		})?;
		let default_entry = EntryRef::new(default_id.clone(), None, default);
		let mut statics = FxHashMap::default();
		statics.insert(default_id, default_entry.clone());
		let (events, _) = broadcast::channel(config.event_capacity);

		Ok(Self {
			types: TypeRegistry::new(config.discriminator.clone()),
			config,
			default_entry,
			statics,
			expected: FxHashMap::default(),
			registered: false,
			namespace_hook: None,
			predicate: Box::new(AcceptAll),
			condition: ArcSwap::from_pointee(ConditionContext::empty()),
			dynamic: ArcSwap::from_pointee(DynamicTier::default()),
			dynamic_loaded: AtomicBool::new(false),
			generation: AtomicU64::new(0),
			events,
		})
	}

	/// Installs the predicate used to filter documents during reloads.
	pub fn set_predicate(&mut self, predicate: impl ConditionPredicate + 'static) {
		self.predicate = Box::new(predicate);
	}

	/// Swaps in the condition context for subsequent reloads.
	pub fn set_condition_context(&self, context: ConditionContext) {
		self.condition.store(Arc::new(context));
	}

	/// Returns the current condition context.
	pub fn condition_context(&self) -> Arc<ConditionContext> {
		self.condition.load_full()
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	pub fn types(&self) -> &TypeRegistry {
		&self.types
	}

	pub fn default_entry(&self) -> &EntryRef {
		&self.default_entry
	}

	pub fn default_id(&self) -> &Identifier {
		self.default_entry.id()
	}

	/// True once the registration phase has completed.
	pub fn is_registered(&self) -> bool {
		self.registered
	}

	/// True once a dynamic tier has been published; never resets.
	pub fn is_dynamic_loaded(&self) -> bool {
		self.dynamic_loaded.load(Ordering::Acquire)
	}

	/// Looks up an entry: static tier, then dynamic tier, then the default entry.
	pub fn get(&self, id: &Identifier) -> EntryRef {
		if let Some(entry) = self.statics.get(id) {
			return entry.clone();
		}
		self.dynamic
			.load()
			.get(id)
			.cloned()
			.unwrap_or_else(|| self.default_entry.clone())
	}

	/// Looks up an entry in the static tier only, falling back to the default entry.
	///
	/// Safe before the first reload since it never consults the dynamic tier.
	pub fn get_static(&self, id: &Identifier) -> EntryRef {
		self.statics
			.get(id)
			.cloned()
			.unwrap_or_else(|| self.default_entry.clone())
	}

	/// True if `id` is registered in the static tier.
	///
	/// Dynamic entries under such an id are unreachable, so loaders drop them.
	pub fn is_static(&self, id: &Identifier) -> bool {
		self.statics.contains_key(id)
	}

	/// True if `id` is a key of the static or the dynamic tier.
	pub fn contains(&self, id: &Identifier) -> bool {
		self.statics.contains_key(id) || self.dynamic.load().contains(id)
	}

	/// All identifiers of both tiers, in unspecified order.
	pub fn all_identifiers(&self) -> Vec<Identifier> {
		self.snapshot().identifiers()
	}

	/// All entries of both tiers, in unspecified order.
	pub fn all_entries(&self) -> Vec<EntryRef> {
		self.snapshot().entries()
	}

	/// Number of entries in the current dynamic tier.
	pub fn dynamic_len(&self) -> usize {
		self.dynamic.load().len()
	}

	pub fn static_len(&self) -> usize {
		self.statics.len()
	}

	/// Returns the current dynamic tier.
	pub fn dynamic(&self) -> Arc<DynamicTier> {
		self.dynamic.load_full()
	}

	/// Pins the current dynamic tier for a series of consistent reads.
	pub fn snapshot(&self) -> RegistryView<'_> {
		RegistryView {
			registry: self,
			dynamic: self.dynamic.load_full(),
		}
	}

	/// Subscribes to reload notifications.
	pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
		self.events.subscribe()
	}

	/// Atomically replaces the dynamic tier and notifies subscribers.
	///
	/// Readers observe either the previous tier or `tier`, never a mix.
	/// Callers must not publish concurrently.
	pub fn publish(&self, tier: DynamicTier, origin: ReloadOrigin) -> ReloadEvent {
		let entries = tier.len();
		self.dynamic.store(Arc::new(tier));
		self.dynamic_loaded.store(true, Ordering::Release);
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		let event = ReloadEvent {
			generation,
			origin,
			entries,
		};
		// No subscribers is fine.
		let _ = self.events.send(event.clone());
		event
	}

	/// Resolves an entry referenced by identifier from a JSON object field.
	///
	/// Unlike [`Registry::get`], an identifier the registry does not contain
	/// is an error here, since a document naming a missing entry is broken.
	pub fn resolve_json(&self, parent: &Value, key: &str) -> Result<EntryRef, DocumentError> {
		let raw = parent
			.get(key)
			.ok_or_else(|| DocumentError::MissingField(key.to_string()))?;
		let text = raw
			.as_str()
			.ok_or_else(|| DocumentError::Malformed(format!("expected '{key}' to be an identifier string")))?;
		let id = Identifier::parse(text)?;
		if self.contains(&id) {
			Ok(self.get(&id))
		} else {
			Err(DocumentError::UnknownEntry(id))
		}
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("default_id", self.default_id())
			.field("statics", &self.statics.len())
			.field("expected", &self.expected.len())
			.field("types", &self.types)
			.field("registered", &self.registered)
			.field("dynamic", &self.dynamic_len())
			.field("dynamic_loaded", &self.is_dynamic_loaded())
			.finish()
	}
}

/// Read view pinned to one dynamic tier.
///
/// Every query through a view resolves against the same snapshot, even if a
/// reload publishes a new tier meanwhile.
pub struct RegistryView<'a> {
	registry: &'a Registry,
	dynamic: Arc<DynamicTier>,
}

impl RegistryView<'_> {
	pub fn get(&self, id: &Identifier) -> EntryRef {
		if let Some(entry) = self.registry.statics.get(id) {
			return entry.clone();
		}
		self.dynamic
			.get(id)
			.cloned()
			.unwrap_or_else(|| self.registry.default_entry.clone())
	}

	pub fn contains(&self, id: &Identifier) -> bool {
		self.registry.statics.contains_key(id) || self.dynamic.contains(id)
	}

	pub fn dynamic(&self) -> &DynamicTier {
		&self.dynamic
	}

	pub fn identifiers(&self) -> Vec<Identifier> {
		self.registry
			.statics
			.keys()
			.chain(self.dynamic.ids())
			.cloned()
			.collect()
	}

	pub fn entries(&self) -> Vec<EntryRef> {
		self.registry
			.statics
			.values()
			.chain(self.dynamic.entries())
			.cloned()
			.collect()
	}
}
