//! Directory-backed document source.
//!
//! Documents live at `<root>/<namespace>/<folder>/<path>.json` and are keyed
//! by `namespace:path`, where `path` keeps its subdirectories.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde_json::Value;
use strata_primitives::Identifier;
use walkdir::WalkDir;

use crate::config::RegistryConfig;

const EXTENSION: &str = "json";

/// Documents found by a scan, plus per-file failures.
#[derive(Debug, Default)]
pub struct DocumentLoadReport {
	pub documents: FxHashMap<Identifier, Value>,
	/// Unreadable files, invalid JSON or unusable file names, keyed by path.
	pub errors: Vec<(PathBuf, String)>,
}

/// Scans a directory tree for entry documents.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
	folder: String,
}

impl DirectorySource {
	pub fn new(root: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
		Self {
			root: root.into(),
			folder: folder.into(),
		}
	}

	/// Uses the configured document folder.
	pub fn from_config(root: impl Into<PathBuf>, config: &RegistryConfig) -> Self {
		Self::new(root, config.folder.clone())
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Reads every document below the root.
	///
	/// A broken file is recorded in the report and skipped; it never prevents
	/// other files from loading. Whether the resulting batch is acceptable is
	/// decided later by [`crate::Registry::reload`].
	pub fn load(&self) -> DocumentLoadReport {
		let mut report = DocumentLoadReport::default();
		let namespaces = match std::fs::read_dir(&self.root) {
			Ok(namespaces) => namespaces,
			Err(error) => {
				report.errors.push((self.root.clone(), error.to_string()));
				return report;
			}
		};

		let mut dirs: Vec<PathBuf> = namespaces
			.filter_map(Result::ok)
			.map(|entry| entry.path())
			.filter(|path| path.is_dir())
			.collect();
		dirs.sort();

		for dir in dirs {
			let Some(namespace) = dir.file_name().and_then(|n| n.to_str()) else {
				report.errors.push((dir.clone(), "namespace directory name is not UTF-8".to_string()));
				continue;
			};
			let base = dir.join(&self.folder);
			if !base.is_dir() {
				continue;
			}
			self.load_namespace(&mut report, namespace, &base);
		}

		tracing::debug!(
			root = %self.root.display(),
			documents = report.documents.len(),
			errors = report.errors.len(),
			"scanned document directory"
		);
		report
	}

	fn load_namespace(&self, report: &mut DocumentLoadReport, namespace: &str, base: &Path) {
		for entry in WalkDir::new(base).sort_by_file_name() {
			let entry = match entry {
				Ok(entry) => entry,
				Err(error) => {
					let path = error.path().unwrap_or(base).to_path_buf();
					report.errors.push((path, error.to_string()));
					continue;
				}
			};
			let path = entry.path();
			if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
				continue;
			}

			let id = match document_id(namespace, base, path) {
				Ok(id) => id,
				Err(message) => {
					report.errors.push((path.to_path_buf(), message));
					continue;
				}
			};
			let content = match std::fs::read_to_string(path) {
				Ok(content) => content,
				Err(error) => {
					report.errors.push((path.to_path_buf(), error.to_string()));
					continue;
				}
			};
			match serde_json::from_str::<Value>(&content) {
				Ok(value) => {
					report.documents.insert(id, value);
				}
				Err(error) => report.errors.push((path.to_path_buf(), error.to_string())),
			}
		}
	}
}

fn document_id(namespace: &str, base: &Path, path: &Path) -> Result<Identifier, String> {
	let relative = path
		.strip_prefix(base)
		.map_err(|e| e.to_string())?
		.with_extension("");
	let mut parts = Vec::new();
	for component in relative.components() {
		let part = component
			.as_os_str()
			.to_str()
			.ok_or_else(|| "file name is not UTF-8".to_string())?;
		parts.push(part);
	}
	Identifier::new(namespace, &parts.join("/")).map_err(|e| e.to_string())
}
