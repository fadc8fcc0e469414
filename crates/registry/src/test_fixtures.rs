//! Shared entry types and helpers for unit tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strata_primitives::{CapabilitySet, Identifier};

use crate::config::RegistryConfig;
use crate::entry::Entry;
use crate::registry::Registry;
use crate::types::SerdeFactory;

/// Leveled trait entry loaded from documents.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Trait {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub level: u32,
}

impl Entry for Trait {
	fn capabilities(&self) -> CapabilitySet {
		CapabilitySet::DISPLAY | CapabilitySet::LEVELED
	}
}

/// Entry without capabilities, registered statically in tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Fixed(pub u32);

impl Entry for Fixed {}

pub(crate) fn id(s: &str) -> Identifier {
	Identifier::parse(s).expect("test identifier should parse")
}

pub(crate) fn trait_type() -> Identifier {
	id("test:trait")
}

pub(crate) fn trait_doc(name: &str, level: u32) -> Value {
	json!({ "type": "test:trait", "name": name, "level": level })
}

/// Registry with the `test:trait` factory registered and the phase closed.
pub(crate) fn registry() -> Registry {
	let mut registry = Registry::new(RegistryConfig::default()).expect("default config is valid");
	{
		let mut registrar = registry.registrar("test").expect("registration is open");
		registrar
			.register_type_shared(trait_type(), Arc::new(SerdeFactory::<Trait>::new()))
			.expect("type registers");
	}
	registry.close_registration();
	registry
}
