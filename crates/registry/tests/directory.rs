//! Registration plus a reload from documents on disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_registry::{
	CapabilitySet, ContentOwner, DirectorySource, Entry, Identifier, LoadError, Registrar, Registry, RegistryConfig,
	RegistryError, SerdeFactory,
};

#[derive(Debug, Serialize, Deserialize)]
struct Perk {
	#[serde(default)]
	level: u32,
}

impl Entry for Perk {
	fn capabilities(&self) -> CapabilitySet {
		CapabilitySet::LEVELED
	}
}

#[derive(Debug)]
struct Marker;

impl Entry for Marker {}

struct Core;

impl ContentOwner for Core {
	fn namespace(&self) -> &str {
		"core"
	}

	fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistryError> {
		registrar.register_static(Identifier::parse("core:marker").unwrap(), Marker)?;
		registrar.register_expected(Identifier::parse("core:swift").unwrap(), CapabilitySet::LEVELED)?;
		registrar.register_type(Identifier::parse("core:perk").unwrap(), SerdeFactory::<Perk>::new())
	}
}

fn write(path: &Path, content: &str) {
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, content).unwrap();
}

fn registry() -> Registry {
	let config = RegistryConfig::from_toml_str("folder = \"perks\"").unwrap();
	let mut registry = Registry::new(config).unwrap();
	registry.run_registration(&[&Core]).unwrap();
	registry
}

#[test]
fn reloads_documents_from_disk() {
	let _ = tracing_subscriber::fmt::try_init();
	let dir = tempfile::tempdir().unwrap();
	write(&dir.path().join("core/perks/swift.json"), r#"{ "type": "core:perk", "level": 2 }"#);
	write(&dir.path().join("core/perks/nested/steady.json"), r#"{ "type": "core:perk" }"#);
	write(&dir.path().join("core/perks/marker.json"), r#"{ "type": "core:perk" }"#);

	let registry = registry();
	let source = DirectorySource::from_config(dir.path(), registry.config());
	let loaded = source.load();
	assert!(loaded.errors.is_empty(), "{:?}", loaded.errors);

	let report = registry.reload(loaded.documents).unwrap();
	assert_eq!(report.loaded, 2);
	assert_eq!(report.shadowed, 1);
	assert!(registry.expectation_issues().is_empty());

	let swift = registry.get(&Identifier::parse("core:swift").unwrap());
	assert_eq!(swift.downcast_ref::<Perk>().unwrap().level, 2);
	assert!(registry.contains(&Identifier::parse("core:nested/steady").unwrap()));
	assert!(
		registry
			.get(&Identifier::parse("core:marker").unwrap())
			.downcast_ref::<Marker>()
			.is_some()
	);
}

#[test]
fn broken_document_on_disk_keeps_previous_entries() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("core/perks/swift.json");
	write(&file, r#"{ "type": "core:perk", "level": 1 }"#);

	let registry = registry();
	let source = DirectorySource::from_config(dir.path(), registry.config());
	registry.reload(source.load().documents).unwrap();

	write(&file, r#"{ "type": "core:perk", "level": -4 }"#);
	let err = registry.reload(source.load().documents).unwrap_err();
	assert!(matches!(err, LoadError::MalformedDocument { .. }));

	let swift = registry.get(&Identifier::parse("core:swift").unwrap());
	assert_eq!(swift.downcast_ref::<Perk>().unwrap().level, 1);
}

#[test]
fn registration_runs_once() {
	let mut registry = registry();
	assert!(registry.is_registered());
	assert_eq!(registry.run_registration(&[&Core]), Err(RegistryError::RegistrationClosed));
}
