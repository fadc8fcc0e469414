//! Dynamic tier reloads.
//!
//! A reload is one atomic batch: either every surviving document becomes an
//! entry and the new tier is published, or the batch aborts and the previous
//! tier stays visible untouched.

use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde_json::Value;
use strata_primitives::Identifier;

use crate::error::LoadError;
use crate::registry::{Registry, ReloadOrigin};
use crate::tier::{DynamicTier, DynamicTierBuilder};

/// Outcome of a successful reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
	/// Generation of the published tier.
	pub generation: u64,
	/// Entries in the new dynamic tier.
	pub loaded: usize,
	/// Documents dropped by the condition predicate.
	pub filtered: usize,
	/// Documents skipped because they are not JSON objects.
	pub skipped: usize,
	/// Documents dropped because a static entry owns their id.
	pub shadowed: usize,
	pub elapsed: Duration,
}

impl Registry {
	/// Rebuilds the dynamic tier from a batch of documents and publishes it.
	///
	/// Documents rejected by the condition predicate are dropped silently. A
	/// document whose discriminator is missing or unmapped, or whose factory
	/// rejects it, aborts the whole batch and leaves the current tier in place.
	///
	/// Reloads must not overlap; the caller serializes reload triggers.
	pub fn reload<I>(&self, documents: I) -> Result<ReloadReport, LoadError>
	where
		I: IntoIterator<Item = (Identifier, Value)>,
	{
		let start = Instant::now();
		let mut report = ReloadReport::default();

		let tier = match self.build_tier(documents, &mut report) {
			Ok(tier) => tier,
			Err(err) => {
				tracing::error!(error = %err, "reload aborted, keeping previous dynamic entries");
				return Err(err);
			}
		};

		let event = self.publish(tier, ReloadOrigin::Local);
		report.generation = event.generation;
		report.loaded = event.entries;
		report.elapsed = start.elapsed();

		tracing::info!(
			count = report.loaded,
			filtered = report.filtered,
			elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
			"loaded dynamic entries"
		);
		for issue in self.expectation_issues() {
			tracing::warn!(%issue, "expected dynamic entry does not match");
		}
		Ok(report)
	}

	fn build_tier<I>(&self, documents: I, report: &mut ReloadReport) -> Result<DynamicTier, LoadError>
	where
		I: IntoIterator<Item = (Identifier, Value)>,
	{
		let context = self.condition.load_full();
		let mut seen = FxHashSet::default();
		let mut builder = DynamicTierBuilder::new();

		for (id, document) in documents {
			if !seen.insert(id.clone()) {
				return Err(LoadError::DuplicateDocument(id));
			}
			if !document.is_object() {
				tracing::debug!(%id, "skipping non-object document");
				report.skipped += 1;
				continue;
			}
			if !self.predicate.test(&document, &context) {
				tracing::debug!(%id, "document excluded by its condition");
				report.filtered += 1;
				continue;
			}

			let (type_key, entry) = self
				.types
				.deserialize(&document)
				.map_err(|source| LoadError::from_document(id.clone(), source))?;

			if self.is_static(&id) {
				tracing::warn!(%id, "dynamic document ignored, a static entry owns this id");
				report.shadowed += 1;
				continue;
			}
			builder.insert(id, type_key, entry);
		}

		Ok(builder.build())
	}
}
