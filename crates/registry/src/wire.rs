//! Identifier and entry references on the wire.
//!
//! An identifier is written as its canonical `namespace:path` text using
//! postcard's length-prefixed string encoding. Readers reject text longer than
//! [`MAX_IDENTIFIER_LEN`] and anything that does not split into exactly two
//! components.

use strata_primitives::{Identifier, IdentifierError, MAX_IDENTIFIER_LEN};

use crate::entry::EntryRef;
use crate::error::WireError;
use crate::registry::Registry;

/// Appends an identifier to `out`.
pub fn write_identifier(id: &Identifier, out: &mut Vec<u8>) -> Result<(), WireError> {
	let encoded = postcard::to_allocvec(id.as_str())?;
	out.extend_from_slice(&encoded);
	Ok(())
}

/// Reads an identifier, returning it with the unread remainder.
pub fn read_identifier(bytes: &[u8]) -> Result<(Identifier, &[u8]), WireError> {
	let (text, rest) = postcard::take_from_bytes::<&str>(bytes)?;
	Ok((parse_wire_identifier(text)?, rest))
}

/// Parses identifier text received from a peer.
pub fn parse_wire_identifier(text: &str) -> Result<Identifier, IdentifierError> {
	if text.len() > MAX_IDENTIFIER_LEN {
		return Err(IdentifierError::TooLong {
			len: text.len(),
			max: MAX_IDENTIFIER_LEN,
		});
	}
	Identifier::parse(text)
}

impl Registry {
	/// Writes a reference to `entry` (its identifier) to `out`.
	pub fn write_entry(&self, entry: &EntryRef, out: &mut Vec<u8>) -> Result<(), WireError> {
		write_identifier(entry.id(), out)
	}

	/// Reads an entry reference and resolves it.
	///
	/// Identifiers the registry does not know resolve to the default entry;
	/// only undecodable bytes or invalid identifier text are errors.
	pub fn read_entry<'b>(&self, bytes: &'b [u8]) -> Result<(EntryRef, &'b [u8]), WireError> {
		let (id, rest) = read_identifier(bytes)?;
		Ok((self.get(&id), rest))
	}
}
