//! Sending and applying dynamic tier snapshots.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use strata_registry::{Registry, ReloadEvent, ReloadOrigin};
use tokio::sync::broadcast;

use crate::error::SyncError;
use crate::observer::{Link, Observer, ObserverId, Observers, PayloadSink};
use crate::payload::SyncPayload;

/// Outcome of one sync round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
	/// Observers that accepted the payload.
	pub sent: usize,
	/// Loopback observers that were not sent anything.
	pub skipped_loopback: usize,
	/// Observers whose sink rejected the payload.
	pub failed: usize,
}

/// Pushes the authoritative registry's dynamic tier to its observers.
#[derive(Debug)]
pub struct Synchronizer {
	registry: Arc<Registry>,
	observers: Observers,
}

impl Synchronizer {
	pub fn new(registry: Arc<Registry>) -> Self {
		Self {
			registry,
			observers: Observers::new(),
		}
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	pub fn observers(&self) -> &Observers {
		&self.observers
	}

	pub fn connect(&self, link: Link, sink: impl PayloadSink + 'static) -> ObserverId {
		self.observers.connect(link, sink)
	}

	pub fn disconnect(&self, id: ObserverId) -> bool {
		self.observers.disconnect(id)
	}

	/// Encodes the current dynamic tier.
	pub fn build_payload(&self) -> Result<Bytes, SyncError> {
		let tier = self.registry.dynamic();
		SyncPayload::from_tier(self.registry.types(), &tier)?.encode()
	}

	/// Sends the current tier to every remote observer.
	pub fn broadcast(&self) -> Result<SyncReport, SyncError> {
		let observers = self.observers.all();
		let report = self.deliver(&observers)?;
		tracing::info!(
			sent = report.sent,
			skipped_loopback = report.skipped_loopback,
			failed = report.failed,
			"broadcast dynamic entries"
		);
		Ok(report)
	}

	/// Sends the current tier to one observer, e.g. when its session starts.
	pub fn sync_to(&self, id: ObserverId) -> Result<SyncReport, SyncError> {
		let observer = self.observers.get(id).ok_or(SyncError::UnknownObserver(id))?;
		self.deliver(&[(id, observer)])
	}

	/// Broadcasts after every locally originated reload.
	///
	/// Reloads applied from a remote payload are not re-broadcast. Returns
	/// once the event channel closes.
	pub async fn run(&self, mut events: broadcast::Receiver<ReloadEvent>) {
		loop {
			match events.recv().await {
				Ok(event) if event.origin == ReloadOrigin::Local => self.broadcast_logged(),
				Ok(event) => {
					tracing::debug!(generation = event.generation, "remote reload, not re-broadcasting");
				}
				Err(broadcast::error::RecvError::Lagged(missed)) => {
					// The payload always carries the current tier, so one send covers the gap.
					tracing::warn!(missed, "sync loop lagged behind reload events");
					self.broadcast_logged();
				}
				Err(broadcast::error::RecvError::Closed) => break,
			}
		}
	}

	fn broadcast_logged(&self) {
		if let Err(err) = self.broadcast() {
			tracing::error!(error = %err, "failed to build sync payload");
		}
	}

	fn deliver(&self, observers: &[(ObserverId, Observer)]) -> Result<SyncReport, SyncError> {
		let mut report = SyncReport::default();
		let mut payload = None;
		for (id, observer) in observers {
			if observer.link.is_loopback() {
				tracing::debug!(observer = %id, "skipping loopback observer");
				report.skipped_loopback += 1;
				continue;
			}
			let bytes = match &payload {
				Some(bytes) => Bytes::clone(bytes),
				None => {
					let bytes = self.build_payload()?;
					payload = Some(bytes.clone());
					bytes
				}
			};
			match observer.sink.send_payload(bytes) {
				Ok(()) => report.sent += 1,
				Err(err) => {
					tracing::warn!(observer = %id, error = %err, "failed to send sync payload");
					report.failed += 1;
				}
			}
		}
		Ok(report)
	}
}

/// Installs a payload received from the authoritative registry.
///
/// The entries are decoded through `registry`'s type table and published as
/// the new dynamic tier with [`ReloadOrigin::Remote`]. Conditions are not
/// re-evaluated. On any error the current tier stays in place.
pub fn apply_payload(registry: &Registry, bytes: &[u8]) -> Result<ReloadEvent, SyncError> {
	let start = Instant::now();
	let tier = SyncPayload::decode(bytes).and_then(|payload| payload.into_tier(registry));
	let tier = match tier {
		Ok(tier) => tier,
		Err(err) => {
			tracing::error!(error = %err, "rejected sync payload, keeping previous dynamic entries");
			return Err(err);
		}
	};
	let event = registry.publish(tier, ReloadOrigin::Remote);
	tracing::info!(
		count = event.entries,
		elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
		"applied synced dynamic entries"
	);
	Ok(event)
}
