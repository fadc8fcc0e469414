//! Core types shared by the registry and sync crates: namespaced identifiers
//! and capability sets.

/// Capabilities an entry can provide.
pub mod capability;
/// Namespaced `namespace:path` identifiers.
pub mod identifier;

pub use capability::{Capability, CapabilitySet};
pub use identifier::{Identifier, IdentifierError, MAX_IDENTIFIER_LEN};
