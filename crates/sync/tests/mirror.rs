//! An authority and a client kept in step over a channel.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_registry::{Entry, Identifier, Registry, RegistryConfig, ReloadOrigin, SerdeFactory};
use strata_sync::{Link, Synchronizer, apply_payload};
use tokio::sync::mpsc;

#[derive(Debug, Serialize, Deserialize)]
struct Rune {
	power: i32,
}

impl Entry for Rune {}

fn id(s: &str) -> Identifier {
	Identifier::parse(s).unwrap()
}

fn registry() -> Registry {
	let mut registry = Registry::new(RegistryConfig::default()).unwrap();
	registry
		.registrar("rune")
		.unwrap()
		.register_type(id("rune:rune"), SerdeFactory::<Rune>::new())
		.unwrap();
	registry.close_registration();
	registry
}

fn power(registry: &Registry, name: &str) -> Option<i32> {
	registry.get(&id(name)).downcast_ref::<Rune>().map(|rune| rune.power)
}

#[tokio::test]
async fn client_follows_authority_reloads() {
	let authority = Arc::new(registry());
	let client = registry();
	let sync = Synchronizer::new(Arc::clone(&authority));

	let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
	let observer = sync.connect(Link::Remote, tx);
	sync.connect(Link::Loopback, mpsc::unbounded_channel::<Bytes>().0);

	authority
		.reload([(id("rune:fire"), json!({ "type": "rune:rune", "power": 3 }))])
		.unwrap();
	let report = sync.sync_to(observer).unwrap();
	assert_eq!(report.sent, 1);

	let event = apply_payload(&client, &rx.recv().await.unwrap()).unwrap();
	assert_eq!(event.origin, ReloadOrigin::Remote);
	assert_eq!(power(&client, "rune:fire"), Some(3));

	authority
		.reload([
			(id("rune:fire"), json!({ "type": "rune:rune", "power": 4 })),
			(id("rune:frost"), json!({ "type": "rune:rune", "power": -1 })),
		])
		.unwrap();
	let report = sync.broadcast().unwrap();
	assert_eq!((report.sent, report.skipped_loopback), (1, 1));

	apply_payload(&client, &rx.recv().await.unwrap()).unwrap();
	assert_eq!(power(&client, "rune:fire"), Some(4));
	assert_eq!(power(&client, "rune:frost"), Some(-1));
	assert_eq!(client.dynamic_len(), authority.dynamic_len());
}
