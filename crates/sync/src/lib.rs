//! Dynamic tier synchronization.
//!
//! After every local reload the authoritative node encodes its whole dynamic
//! tier into one [`SyncPayload`] and pushes it to each connected remote
//! observer. Observers attached over a loopback link share the sender's
//! registry in memory and are never sent anything. Receivers install the
//! payload with [`apply_payload`], which swaps the tier atomically just like
//! a local reload does.
//!
//! Delivery is fire-and-forget: there are no acknowledgements or retries.

pub mod error;
pub mod observer;
pub mod payload;
pub mod synchronizer;

pub use error::{SendError, SyncError};
pub use observer::{Link, ObserverId, Observers, PayloadSink};
pub use payload::{SyncPayload, WireEntry};
pub use synchronizer::{SyncReport, Synchronizer, apply_payload};
