//! Connected observers and the send primitive used to reach them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::error::SendError;

/// Identifies one connected observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// How an observer is attached to the authoritative registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
	/// Same process; the observer already reads the sender's tier.
	Loopback,
	/// Separate process reached through a transport.
	Remote,
}

impl Link {
	pub fn is_loopback(self) -> bool {
		matches!(self, Link::Loopback)
	}
}

/// Transport hook that delivers an encoded payload to one observer.
///
/// Must not block: the synchronizer calls it inline for every observer.
pub trait PayloadSink: Send + Sync {
	fn send_payload(&self, payload: Bytes) -> Result<(), SendError>;
}

impl PayloadSink for mpsc::UnboundedSender<Bytes> {
	fn send_payload(&self, payload: Bytes) -> Result<(), SendError> {
		self.send(payload).map_err(|_| SendError::Closed)
	}
}

#[derive(Clone)]
pub(crate) struct Observer {
	pub(crate) link: Link,
	pub(crate) sink: Arc<dyn PayloadSink>,
}

/// Set of connected observers.
#[derive(Default)]
pub struct Observers {
	inner: Mutex<FxHashMap<ObserverId, Observer>>,
	next_id: AtomicU64,
}

impl Observers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an observer and returns its id.
	pub fn connect(&self, link: Link, sink: impl PayloadSink + 'static) -> ObserverId {
		let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.inner.lock().insert(
			id,
			Observer {
				link,
				sink: Arc::new(sink),
			},
		);
		tracing::debug!(observer = %id, ?link, "observer connected");
		id
	}

	/// Removes an observer. Returns false if it was not connected.
	pub fn disconnect(&self, id: ObserverId) -> bool {
		let removed = self.inner.lock().remove(&id).is_some();
		if removed {
			tracing::debug!(observer = %id, "observer disconnected");
		}
		removed
	}

	pub fn link(&self, id: ObserverId) -> Option<Link> {
		self.inner.lock().get(&id).map(|observer| observer.link)
	}

	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}

	/// Connected ids in ascending order.
	pub fn ids(&self) -> Vec<ObserverId> {
		let mut ids: Vec<_> = self.inner.lock().keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	pub(crate) fn get(&self, id: ObserverId) -> Option<Observer> {
		self.inner.lock().get(&id).cloned()
	}

	/// Copies the current observers out so sends happen without the lock held.
	pub(crate) fn all(&self) -> Vec<(ObserverId, Observer)> {
		let mut all: Vec<_> = self
			.inner
			.lock()
			.iter()
			.map(|(id, observer)| (*id, observer.clone()))
			.collect();
		all.sort_unstable_by_key(|(id, _)| *id);
		all
	}
}

impl fmt::Debug for Observers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.lock();
		f.debug_map()
			.entries(inner.iter().map(|(id, observer)| (id, observer.link)))
			.finish()
	}
}
