use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum length in bytes of an identifier's canonical text.
///
/// Matches the bound applied to identifier strings read off the wire.
pub const MAX_IDENTIFIER_LEN: usize = 32767;

/// Separator between namespace and path in the canonical text form.
pub const SEPARATOR: char = ':';

/// Component of an identifier, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
	/// The part before the separator.
	Namespace,
	/// The part after the separator.
	Path,
}

impl fmt::Display for Part {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Part::Namespace => f.write_str("namespace"),
			Part::Path => f.write_str("path"),
		}
	}
}

/// Errors produced while parsing or constructing an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
	#[error("identifier is empty")]
	Empty,
	#[error("identifier '{0}' has no ':' separator")]
	MissingSeparator(String),
	#[error("identifier '{0}' has more than one ':' separator")]
	ExtraSeparator(String),
	#[error("identifier '{input}' has an empty {part}")]
	EmptyComponent { input: String, part: Part },
	#[error("invalid character {ch:?} in {part} of identifier '{input}'")]
	InvalidCharacter { input: String, part: Part, ch: char },
	#[error("identifier is {len} bytes, exceeding the {max} byte limit")]
	TooLong { len: usize, max: usize },
}

/// Namespaced registry key with canonical text form `namespace:path`.
///
/// The canonical text is stored once and shared, so clones are a refcount
/// bump. Equality, ordering and hashing all operate on the canonical text,
/// which is equivalent to comparing the `(namespace, path)` pair because the
/// namespace can never contain the separator.
#[derive(Clone)]
pub struct Identifier {
	text: Arc<str>,
	split: usize,
}

impl Identifier {
	/// Builds an identifier from its two components.
	pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {
		let len = namespace.len() + 1 + path.len();
		if len > MAX_IDENTIFIER_LEN {
			return Err(IdentifierError::TooLong {
				len,
				max: MAX_IDENTIFIER_LEN,
			});
		}
		let text = format!("{namespace}{SEPARATOR}{path}");
		validate(&text, namespace, Part::Namespace)?;
		validate(&text, path, Part::Path)?;
		Ok(Self {
			text: Arc::from(text),
			split: namespace.len(),
		})
	}

	/// Parses canonical `namespace:path` text.
	///
	/// Exactly one separator is accepted; both components must be non-empty.
	pub fn parse(input: &str) -> Result<Self, IdentifierError> {
		if input.is_empty() {
			return Err(IdentifierError::Empty);
		}
		if input.len() > MAX_IDENTIFIER_LEN {
			return Err(IdentifierError::TooLong {
				len: input.len(),
				max: MAX_IDENTIFIER_LEN,
			});
		}
		let Some((namespace, path)) = input.split_once(SEPARATOR) else {
			return Err(IdentifierError::MissingSeparator(input.to_string()));
		};
		if path.contains(SEPARATOR) {
			return Err(IdentifierError::ExtraSeparator(input.to_string()));
		}
		validate(input, namespace, Part::Namespace)?;
		validate(input, path, Part::Path)?;
		Ok(Self {
			text: Arc::from(input),
			split: namespace.len(),
		})
	}

	/// Returns the namespace component.
	pub fn namespace(&self) -> &str {
		&self.text[..self.split]
	}

	/// Returns the path component.
	pub fn path(&self) -> &str {
		&self.text[self.split + 1..]
	}

	/// Returns the canonical `namespace:path` text.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Returns a sibling identifier in the same namespace.
	pub fn with_path(&self, path: &str) -> Result<Self, IdentifierError> {
		Self::new(self.namespace(), path)
	}
}

fn validate(input: &str, component: &str, part: Part) -> Result<(), IdentifierError> {
	if component.is_empty() {
		return Err(IdentifierError::EmptyComponent {
			input: input.to_string(),
			part,
		});
	}
	let allowed = |ch: char| match ch {
		'a'..='z' | '0'..='9' | '_' | '.' | '-' => true,
		'/' => part == Part::Path,
		_ => false,
	};
	match component.chars().find(|&ch| !allowed(ch)) {
		Some(ch) => Err(IdentifierError::InvalidCharacter {
			input: input.to_string(),
			part,
			ch,
		}),
		None => Ok(()),
	}
}

impl PartialEq for Identifier {
	fn eq(&self, other: &Self) -> bool {
		self.text == other.text
	}
}

impl Eq for Identifier {}

impl Hash for Identifier {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.text.hash(state);
	}
}

impl PartialOrd for Identifier {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Identifier {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.text.cmp(&other.text)
	}
}

impl Borrow<str> for Identifier {
	fn borrow(&self) -> &str {
		&self.text
	}
}

impl AsRef<str> for Identifier {
	fn as_ref(&self) -> &str {
		&self.text
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

impl fmt::Debug for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Identifier").field(&&*self.text).finish()
	}
}

impl FromStr for Identifier {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<&str> for Identifier {
	type Error = IdentifierError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}

impl Serialize for Identifier {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.text)
	}
}

impl<'de> Deserialize<'de> for Identifier {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		Self::parse(&text).map_err(serde::de::Error::custom)
	}
}
