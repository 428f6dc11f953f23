//! Materialized-path construction for the location tree.
//!
//! A path encodes the full ancestry of a location as `/`-separated segments,
//! root segment first, e.g. `/Home/Kitchen/Drawer`. Paths are rebuilt eagerly
//! on every structural change, never derived on read.

pub const SEPARATOR: char = '/';
pub const MAX_NAME_CHARS: usize = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
	#[error("Location name must not be empty.")]
	Empty,
	#[error("Location name must be at most {MAX_NAME_CHARS} characters.")]
	TooLong,
	#[error("Location name must not contain the path separator.")]
	ContainsSeparator,
}

/// Builds a child path from its parent's path. An empty or `/` parent path
/// produces a root path.
pub fn build_path(parent_path: &str, name: &str) -> String {
	if parent_path.is_empty() || parent_path == "/" {
		return format!("/{name}");
	}

	format!("{parent_path}/{name}")
}

/// Names containing the separator would make paths ambiguous to split back
/// into segments, so they are rejected rather than escaped.
pub fn validate_name(name: &str) -> Result<(), NameError> {
	if name.trim().is_empty() {
		return Err(NameError::Empty);
	}
	if name.chars().count() > MAX_NAME_CHARS {
		return Err(NameError::TooLong);
	}
	if name.contains(SEPARATOR) {
		return Err(NameError::ContainsSeparator);
	}

	Ok(())
}

/// Rewrites `path` by replacing `old_prefix` with `new_prefix`, leaving the
/// suffix untouched. Returns `None` when the path is outside the old subtree.
pub fn replace_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
	if path == old_prefix {
		return Some(new_prefix.to_string());
	}

	path.strip_prefix(old_prefix)
		.filter(|rest| rest.starts_with(SEPARATOR))
		.map(|rest| format!("{new_prefix}{rest}"))
}

/// Whether `candidate` lies at or under `ancestor` in path terms.
pub fn is_self_or_descendant(candidate: &str, ancestor: &str) -> bool {
	candidate == ancestor
		|| candidate
			.strip_prefix(ancestor)
			.map(|rest| rest.starts_with(SEPARATOR))
			.unwrap_or(false)
}

/// The `/`-separated segments of a path, root segment first.
pub fn segments(path: &str) -> Vec<&str> {
	path.split(SEPARATOR).filter(|segment| !segment.is_empty()).collect()
}
