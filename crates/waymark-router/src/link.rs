//! Programmatic links.

use crate::config::RouterConfig;
use crate::error::RouterResult;
use crate::history::HistoryBridge;
use crate::pattern::normalize_path;

/// A link to an in-app path.
///
/// # Example
///
/// ```
/// use waymark_router::{RouterConfig, RouterLink};
///
/// let config = RouterConfig::new().with_base_path("/app");
/// let link = RouterLink::new("users/42");
/// assert_eq!(link.href(&config), "/app/users/42");
/// assert!(link.is_active("users/42/posts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterLink {
	/// The destination path.
	path: String,
	/// Whether to replace the current history entry.
	replace: bool,
}

impl RouterLink {
	/// Creates a link that pushes `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			replace: false,
		}
	}

	/// Sets whether to replace the current history entry.
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Returns the destination path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns whether this is a replace navigation.
	pub fn is_replace(&self) -> bool {
		self.replace
	}

	/// The absolute `href`, base path included.
	pub fn href(&self, config: &RouterConfig) -> String {
		config.to_absolute(&self.path)
	}

	/// Navigates to the link's destination.
	pub fn follow(&self, history: &HistoryBridge, config: &RouterConfig) -> RouterResult<()> {
		let href = self.href(config);
		if self.replace {
			history.replace(&href)
		} else {
			history.push(&href)
		}
	}

	/// Returns true if `current_path` (relative to the base path) is the
	/// destination or lies below it.
	pub fn is_active(&self, current_path: &str) -> bool {
		let target = normalize_path(&self.path);
		let current = normalize_path(current_path);
		if target.is_empty() {
			return current.is_empty();
		}
		match current.strip_prefix(target) {
			Some(rest) => rest.is_empty() || rest.starts_with('/'),
			None => false,
		}
	}
}
