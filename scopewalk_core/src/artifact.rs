//! Loading sources from disk and materializing transformed code as files.
//!
//! The transform itself never touches the filesystem. This module sits around
//! it: [`load_source`] reads the input, [`materialize`] writes the output to a
//! temporary file that lives as long as its [`Artifact`] guard.

use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;
use tracing::instrument;

use crate::DEFAULT_MAX_FILE_SIZE;
use crate::Mode;
use crate::RuleTree;
use crate::TransformError;
use crate::TransformResult;
use crate::transform;

/// Longest run of the original path kept in an artifact's file name.
const MAX_PREFIX_PATH_LEN: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
	/// Files larger than this many bytes are rejected.
	pub max_file_size: u64,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

/// Read the UTF-8 source at `path`.
pub fn load_source(path: &Path, options: LoadOptions) -> TransformResult<String> {
	let metadata = match std::fs::metadata(path) {
		Ok(metadata) => metadata,
		Err(error) if error.kind() == ErrorKind::NotFound => {
			return Err(TransformError::SourceNotFound {
				path: path.display().to_string(),
			});
		}
		Err(error) => return Err(error.into()),
	};

	if metadata.len() > options.max_file_size {
		return Err(TransformError::FileTooLarge {
			path: path.display().to_string(),
			size: metadata.len(),
			limit: options.max_file_size,
		});
	}

	Ok(std::fs::read_to_string(path)?)
}

/// A transformed file on disk. The file is deleted when the guard is dropped
/// unless it is [kept](Artifact::keep).
#[derive(Debug)]
pub struct Artifact {
	file: NamedTempFile,
}

impl Artifact {
	pub fn path(&self) -> &Path {
		self.file.path()
	}

	/// Persist the file past the lifetime of the guard and return its path.
	pub fn keep(self) -> TransformResult<PathBuf> {
		let (_, path) = self
			.file
			.keep()
			.map_err(|error| TransformError::Io(error.error))?;

		Ok(path)
	}
}

/// Write `code` to a temporary file named after `original`.
///
/// The file name starts with `path_<original>___`, where every character of
/// the original path that isn't alphanumeric, `.`, `-` or `_` is replaced by
/// `_`, and keeps the original extension.
pub fn materialize(code: &str, original: &Path) -> TransformResult<Artifact> {
	let prefix = artifact_prefix(original);
	let suffix = original
		.extension()
		.map(|extension| format!(".{}", extension.to_string_lossy()))
		.unwrap_or_default();

	let mut file = tempfile::Builder::new()
		.prefix(&prefix)
		.suffix(&suffix)
		.tempfile()?;
	file.write_all(code.as_bytes())?;
	file.flush()?;

	debug!(path = %file.path().display(), bytes = code.len(), "materialized artifact");

	Ok(Artifact { file })
}

/// Load, transform and materialize the file at `path`.
#[instrument(skip(tree, options), fields(path = %path.display()))]
pub fn compile_file(
	path: &Path,
	tree: &RuleTree,
	mode: Mode,
	options: LoadOptions,
) -> TransformResult<Artifact> {
	let source = load_source(path, options)?;
	let output = transform(&source, tree, mode)?;

	materialize(&output, path)
}

fn artifact_prefix(original: &Path) -> String {
	let sanitized: String = original
		.to_string_lossy()
		.chars()
		.map(|ch| {
			if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
				ch
			} else {
				'_'
			}
		})
		.collect();
	let tail = sanitized.len().saturating_sub(MAX_PREFIX_PATH_LEN);

	format!("path_{}___", &sanitized[tail..])
}
