//! Tiered content registry.
//!
//! Entries resolve from two tiers:
//!
//! * the **static** tier, filled once during the registration phase through a
//!   [`Registrar`] and frozen afterwards;
//! * the **dynamic** tier, materialized from configuration documents by
//!   [`Registry::reload`] and replaced wholesale on every reload through a
//!   single atomic pointer swap.
//!
//! Lookups never fail: [`Registry::get`] consults the static tier, then the
//! dynamic tier, then falls back to the default entry.
//!
//! # Concurrency
//!
//! Reads take one [`arc_swap::ArcSwap`] load and never block. At most one
//! reload may be in flight at a time; callers serialize reload triggers.

pub mod condition;
pub mod config;
pub mod entry;
pub mod error;
pub mod expected;
pub mod loader;
pub mod registrar;
pub mod registry;
pub mod source;
pub mod tier;
pub mod types;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use condition::{AcceptAll, ConditionContext, ConditionPredicate};
pub use config::RegistryConfig;
pub use entry::{EmptyEntry, Entry, EntryRef};
pub use error::{Claim, ConfigError, DocumentError, LoadError, RegistryError, WireError};
pub use expected::ExpectationIssue;
pub use loader::ReloadReport;
pub use registrar::{ContentOwner, NamespaceMismatch, Registrar};
pub use registry::{Registry, RegistryView, ReloadEvent, ReloadOrigin};
pub use source::{DirectorySource, DocumentLoadReport};
pub use strata_primitives::{Capability, CapabilitySet, Identifier, IdentifierError, MAX_IDENTIFIER_LEN};
pub use tier::{DynamicTier, DynamicTierBuilder};
pub use types::{EntryFactory, SerdeFactory, TypeRegistry};
