//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};
use crate::history::NavigationKind;
use crate::pattern::normalize_path;

/// Default hop limit for redirect chains.
pub const DEFAULT_MAX_REDIRECTS: usize = 16;

/// Default `data-router-slot` value that opts an anchor out of interception.
pub const DEFAULT_ANCHOR_OPT_OUT: &str = "disabled";

/// Settings shared by a tree of router slots.
///
/// # Example
///
/// ```
/// use waymark_router::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{"base_path": "/app/"}"#).unwrap();
/// assert_eq!(config.strip_base("/app/users/1"), Some("users/1"));
/// assert_eq!(config.to_absolute("users/1"), "/app/users/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Prefix stripped before root slots match and prepended to relative targets.
	pub base_path: String,
	/// Redirect hops allowed in one resolution.
	pub max_redirects: usize,
	/// History operation used for redirects.
	pub redirect_kind: NavigationKind,
	/// `data-router-slot` value that disables interception for an anchor.
	pub anchor_opt_out: String,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			base_path: "/".to_string(),
			max_redirects: DEFAULT_MAX_REDIRECTS,
			redirect_kind: NavigationKind::Replace,
			anchor_opt_out: DEFAULT_ANCHOR_OPT_OUT.to_string(),
		}
	}
}

impl RouterConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the base path.
	pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
		self.base_path = base_path.into();
		self
	}

	/// Sets the redirect hop limit.
	pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
		self.max_redirects = max_redirects;
		self
	}

	/// Sets the history operation used for redirects.
	pub fn with_redirect_kind(mut self, kind: NavigationKind) -> Self {
		self.redirect_kind = kind;
		self
	}

	/// Sets the anchor opt-out marker.
	pub fn with_anchor_opt_out(mut self, marker: impl Into<String>) -> Self {
		self.anchor_opt_out = marker.into();
		self
	}

	/// Parses and validates a JSON configuration. Missing fields take defaults.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Configuration`] for malformed JSON or invalid values.
	pub fn from_json(json: &str) -> RouterResult<Self> {
		let config: Self = serde_json::from_str(json)
			.map_err(|e| RouterError::Configuration(format!("invalid router config: {}", e)))?;
		config.validate()?;
		Ok(config)
	}

	/// Checks the configuration values.
	pub fn validate(&self) -> RouterResult<()> {
		if !self.base_path.starts_with('/') {
			return Err(RouterError::Configuration(format!(
				"base path {:?} must start with '/'",
				self.base_path
			)));
		}
		if self.base_path.contains(['?', '#']) {
			return Err(RouterError::Configuration(format!(
				"base path {:?} must not carry a query or fragment",
				self.base_path
			)));
		}
		if self.redirect_kind == NavigationKind::Pop {
			return Err(RouterError::Configuration(
				"redirects cannot use pop navigations".to_string(),
			));
		}
		Ok(())
	}

	/// Strips the base path from `path`, returning the normalized remainder.
	///
	/// Returns `None` if `path` lies outside the base path.
	pub fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
		let base = normalize_path(&self.base_path);
		let path = normalize_path(path);
		if base.is_empty() {
			return Some(path);
		}
		let rest = path.strip_prefix(base)?;
		if rest.is_empty() {
			Some(rest)
		} else {
			rest.strip_prefix('/')
		}
	}

	/// Turns a redirect target or link path into an absolute path.
	///
	/// Paths starting with `/` are already absolute; others are joined to the
	/// base path.
	pub fn to_absolute(&self, path: &str) -> String {
		if path.starts_with('/') {
			return path.to_string();
		}
		let base = normalize_path(&self.base_path);
		if base.is_empty() {
			format!("/{}", path)
		} else if path.is_empty() {
			format!("/{}", base)
		} else {
			format!("/{}/{}", base, path)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = RouterConfig::default();
		assert_eq!(config.base_path, "/");
		assert_eq!(config.max_redirects, 16);
		assert_eq!(config.redirect_kind, NavigationKind::Replace);
		assert_eq!(config.anchor_opt_out, "disabled");
		assert!(config.validate().is_ok());
	}

	#[rstest]
	fn test_from_json_fills_defaults() {
		let config = RouterConfig::from_json(r#"{"max_redirects": 3, "redirect_kind": "push"}"#).unwrap();
		assert_eq!(config.max_redirects, 3);
		assert_eq!(config.redirect_kind, NavigationKind::Push);
		assert_eq!(config.base_path, "/");
	}

	#[rstest]
	#[case(r#"{"base_path": "app"}"#)]
	#[case(r#"{"base_path": "/app?x=1"}"#)]
	#[case(r#"{"redirect_kind": "pop"}"#)]
	#[case(r#"{"max_redirects": "many"}"#)]
	#[case("not json")]
	fn test_from_json_rejects_invalid(#[case] json: &str) {
		assert!(matches!(
			RouterConfig::from_json(json),
			Err(RouterError::Configuration(_))
		));
	}

	#[rstest]
	#[case("/", "/users/1", Some("users/1"))]
	#[case("/app", "/app/users/1", Some("users/1"))]
	#[case("/app/", "/app", Some(""))]
	#[case("/app", "/application", None)]
	#[case("/app", "/other", None)]
	#[case("/app", "/app/users?tab=1", Some("users"))]
	fn test_strip_base(#[case] base: &str, #[case] path: &str, #[case] expected: Option<&str>) {
		let config = RouterConfig::new().with_base_path(base);
		assert_eq!(config.strip_base(path), expected);
	}

	#[rstest]
	#[case("/", "home/secret", "/home/secret")]
	#[case("/app/", "home", "/app/home")]
	#[case("/app", "", "/app")]
	#[case("/app", "/absolute", "/absolute")]
	fn test_to_absolute(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
		let config = RouterConfig::new().with_base_path(base);
		assert_eq!(config.to_absolute(path), expected);
	}
}
