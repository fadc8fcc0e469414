//! Validation of expected dynamic entries against the loaded tier.

use std::fmt;

use strata_primitives::{CapabilitySet, Identifier};

use crate::registry::Registry;

/// A reserved dynamic id whose loaded entry does not meet its reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectationIssue {
	/// No document produced an entry for the reserved id.
	Missing { id: Identifier },
	/// The loaded entry lacks some of the required capabilities.
	MissingCapabilities { id: Identifier, missing: CapabilitySet },
}

impl ExpectationIssue {
	pub fn id(&self) -> &Identifier {
		match self {
			ExpectationIssue::Missing { id } | ExpectationIssue::MissingCapabilities { id, .. } => id,
		}
	}
}

impl fmt::Display for ExpectationIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExpectationIssue::Missing { id } => write!(f, "'{id}' was not loaded"),
			ExpectationIssue::MissingCapabilities { id, missing } => {
				write!(f, "'{id}' lacks capabilities {missing:?}")
			}
		}
	}
}

impl Registry {
	/// Reports reserved dynamic ids that are absent or under-capable.
	///
	/// Only meaningful once a dynamic tier has been published. The result is
	/// sorted by identifier.
	pub fn expectation_issues(&self) -> Vec<ExpectationIssue> {
		let dynamic = self.dynamic();
		let mut issues: Vec<_> = self
			.expected
			.iter()
			.filter_map(|(id, required)| match dynamic.get(id) {
				None => Some(ExpectationIssue::Missing { id: id.clone() }),
				Some(entry) => {
					let missing = entry.capabilities().missing(*required);
					(!missing.is_empty()).then(|| ExpectationIssue::MissingCapabilities {
						id: id.clone(),
						missing,
					})
				}
			})
			.collect();
		issues.sort_by(|a, b| a.id().cmp(b.id()));
		issues
	}

	/// Capabilities reserved for `id`, if it was registered as expected.
	pub fn expected_capabilities(&self, id: &Identifier) -> Option<CapabilitySet> {
		self.expected.get(id).copied()
	}
}
