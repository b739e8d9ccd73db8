//! Path Pattern Matching for router slots.
//!
//! A [`PathPattern`] is one of three shapes:
//!
//! - a literal path such as `about` or `users/{id}`, matched as a prefix on a
//!   segment boundary (or against the whole path with [`PathMatch::Full`]),
//! - a regular expression, honouring its own anchoring,
//! - the catch-all marker `**`.
//!
//! Matching consumes a prefix of the candidate path and reports the rest as
//! the unresolved suffix, which a nested slot resolves in turn. All functions
//! here are pure.

use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};

/// The catch-all marker.
pub const CATCH_ALL: &str = "**";

/// Maximum allowed length for a literal pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a literal pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled literal pattern (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// How much of the candidate path a literal pattern has to cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatch {
	/// The literal has to match a leading run of whole segments.
	#[default]
	Prefix,
	/// The literal has to match the entire path.
	Full,
}

/// Outcome of a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
	consumed: String,
	remaining: String,
	params: HashMap<String, String>,
}

impl MatchResult {
	/// Creates a match result.
	pub fn new(
		consumed: impl Into<String>,
		remaining: impl Into<String>,
		params: HashMap<String, String>,
	) -> Self {
		Self {
			consumed: consumed.into(),
			remaining: remaining.into(),
			params,
		}
	}

	/// The part of the path consumed by the pattern.
	pub fn consumed(&self) -> &str {
		&self.consumed
	}

	/// The unresolved suffix, left for a nested slot.
	pub fn remaining(&self) -> &str {
		&self.remaining
	}

	/// Captured parameters.
	pub fn params(&self) -> &HashMap<String, String> {
		&self.params
	}

	/// Returns one captured parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// True when `other` selects the same view: same consumed segment and params.
	pub fn same_target(&self, other: &MatchResult) -> bool {
		self.consumed == other.consumed && self.params == other.params
	}

	pub(crate) fn set_remaining(&mut self, remaining: impl Into<String>) {
		self.remaining = remaining.into();
	}
}

/// Strips query string, fragment, and surrounding slashes from a path.
///
/// ```
/// use waymark_router::normalize_path;
///
/// assert_eq!(normalize_path("/users/42/?tab=posts#top"), "users/42");
/// assert_eq!(normalize_path("/"), "");
/// ```
pub fn normalize_path(path: &str) -> &str {
	let end = path.find(['?', '#']).unwrap_or(path.len());
	path[..end].trim_matches('/')
}

/// A compiled literal pattern with optional `{name}` and `{name:*}` parameters.
#[derive(Debug, Clone)]
pub struct LiteralPattern {
	/// The normalized pattern string.
	pattern: String,
	/// Compiled regex, `None` for the empty literal.
	regex: Option<Regex>,
	/// Parameter names in order.
	param_names: Vec<String>,
	mode: PathMatch,
}

impl LiteralPattern {
	/// Compiles a literal pattern.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Configuration`] if the pattern exceeds the length
	/// (1024 bytes) or segment (32) limits, or does not compile.
	pub fn new(pattern: &str, mode: PathMatch) -> RouterResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouterError::Configuration(format!(
				"pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let normalized = normalize_path(pattern);
		let segment_count = normalized.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(RouterError::Configuration(format!(
				"pattern has {} path segments, exceeding maximum of {}",
				segment_count, MAX_PATH_SEGMENTS
			)));
		}

		if normalized.is_empty() {
			return Ok(Self {
				pattern: String::new(),
				regex: None,
				param_names: Vec::new(),
				mode,
			});
		}

		let (body, param_names) = Self::compile_pattern(normalized)?;
		let regex_str = match mode {
			PathMatch::Prefix => format!("^{}(?:/|$)", body),
			PathMatch::Full => format!("^{}$", body),
		};

		let regex = RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| {
				RouterError::Configuration(format!("failed to compile pattern {:?}: {}", pattern, e))
			})?;

		Ok(Self {
			pattern: normalized.to_string(),
			regex: Some(regex),
			param_names,
			mode,
		})
	}

	/// Compiles a pattern string into a regex body and extracts parameter names.
	fn compile_pattern(pattern: &str) -> RouterResult<(String, Vec<String>)> {
		let mut regex_str = String::new();
		let mut param_names = Vec::new();
		let mut chars = pattern.chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					let mut param = String::new();
					let mut is_wildcard = false;
					let mut closed = false;

					while let Some(next) = chars.next() {
						match next {
							'}' => {
								closed = true;
								break;
							}
							':' => {
								if chars.peek() == Some(&'*') {
									chars.next();
									is_wildcard = true;
								}
							}
							_ => param.push(next),
						}
					}

					if !closed || param.is_empty() {
						return Err(RouterError::Configuration(format!(
							"malformed parameter in pattern {:?}",
							pattern
						)));
					}
					if param_names.contains(&param) {
						return Err(RouterError::Configuration(format!(
							"duplicate parameter {:?} in pattern {:?}",
							param, pattern
						)));
					}

					if is_wildcard {
						regex_str.push_str(&format!("(?P<{}>.*)", param));
					} else {
						regex_str.push_str(&format!("(?P<{}>[^/]+)", param));
					}
					param_names.push(param);
				}
				_ => regex_str.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
			}
		}

		Ok((regex_str, param_names))
	}

	/// Returns the normalized pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in pattern order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the match mode.
	pub fn mode(&self) -> PathMatch {
		self.mode
	}

	fn matches(&self, path: &str) -> Option<MatchResult> {
		let Some(regex) = &self.regex else {
			return match self.mode {
				PathMatch::Prefix => Some(MatchResult::new("", path, HashMap::new())),
				PathMatch::Full if path.is_empty() => Some(MatchResult::default()),
				PathMatch::Full => None,
			};
		};

		let caps = regex.captures(path)?;
		let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
		let consumed = path[..end].trim_end_matches('/');
		let remaining = path[end..].trim_start_matches('/');

		let params = self
			.param_names
			.iter()
			.filter_map(|name| {
				caps.name(name)
					.map(|m| (name.clone(), m.as_str().to_string()))
			})
			.collect();

		Some(MatchResult::new(consumed, remaining, params))
	}
}

/// A route pattern.
#[derive(Debug, Clone)]
pub enum PathPattern {
	/// A literal path, optionally with `{name}` parameters.
	Literal(LiteralPattern),
	/// A regular expression.
	Regex(Regex),
	/// Matches everything.
	CatchAll {
		/// When set, nothing is consumed and the whole path is left to a child slot.
		delegate: bool,
	},
}

impl PathPattern {
	/// Parses a pattern string: [`CATCH_ALL`] becomes a catch-all, anything
	/// else a prefix literal.
	pub fn parse(pattern: &str) -> RouterResult<Self> {
		if pattern.trim_matches('/') == CATCH_ALL {
			return Ok(Self::catch_all());
		}
		Self::literal(pattern, PathMatch::Prefix)
	}

	/// Creates a literal pattern with an explicit match mode.
	pub fn literal(pattern: &str, mode: PathMatch) -> RouterResult<Self> {
		LiteralPattern::new(pattern, mode).map(Self::Literal)
	}

	/// Creates a regular expression pattern.
	pub fn regex(regex: Regex) -> Self {
		Self::Regex(regex)
	}

	/// Creates a catch-all that consumes the entire path.
	pub fn catch_all() -> Self {
		Self::CatchAll { delegate: false }
	}

	/// Creates a catch-all that consumes nothing and delegates the whole path.
	pub fn catch_all_delegating() -> Self {
		Self::CatchAll { delegate: true }
	}

	/// Returns true for the catch-all variants.
	pub fn is_catch_all(&self) -> bool {
		matches!(self, Self::CatchAll { .. })
	}

	/// Attempts to match a path against this pattern.
	///
	/// The path is normalized first, so `"/about/"` and `"about"` are the same
	/// candidate.
	pub fn matches(&self, path: &str) -> Option<MatchResult> {
		let path = normalize_path(path);
		match self {
			Self::Literal(literal) => literal.matches(path),
			Self::Regex(regex) => match_regex(regex, path),
			Self::CatchAll { delegate: false } => {
				Some(MatchResult::new(path, "", HashMap::new()))
			}
			Self::CatchAll { delegate: true } => {
				Some(MatchResult::new("", path, HashMap::new()))
			}
		}
	}

	/// Checks if this pattern would match the given path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}
}

fn match_regex(regex: &Regex, path: &str) -> Option<MatchResult> {
	let caps = regex.captures(path)?;
	let end = caps.get(0).map(|m| m.end()).unwrap_or(0);

	let params = regex
		.capture_names()
		.enumerate()
		.skip(1)
		.filter_map(|(index, name)| {
			let value = caps.get(index)?.as_str().to_string();
			let key = name.map(str::to_string).unwrap_or_else(|| index.to_string());
			Some((key, value))
		})
		.collect();

	Some(MatchResult::new(
		path[..end].trim_end_matches('/'),
		path[end..].trim_start_matches('/'),
		params,
	))
}

/// Matches `candidate` against `pattern`.
pub fn match_path(pattern: &PathPattern, candidate: &str) -> Option<MatchResult> {
	pattern.matches(candidate)
}

impl From<Regex> for PathPattern {
	fn from(regex: Regex) -> Self {
		Self::Regex(regex)
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Literal(a), Self::Literal(b)) => a.pattern == b.pattern && a.mode == b.mode,
			(Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
			(Self::CatchAll { delegate: a }, Self::CatchAll { delegate: b }) => a == b,
			_ => false,
		}
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(literal) => write!(f, "{}", literal.pattern),
			Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
			Self::CatchAll { .. } => write!(f, "{}", CATCH_ALL),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn literal(pattern: &str) -> PathPattern {
		PathPattern::parse(pattern).unwrap()
	}

	#[rstest]
	#[case("/users/42/", "users/42")]
	#[case("users", "users")]
	#[case("/", "")]
	#[case("", "")]
	#[case("/search?q=rust", "search")]
	#[case("/docs#intro", "docs")]
	fn test_normalize_path(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_path(input), expected);
	}

	#[rstest]
	#[case("about", "about", "about", "")]
	#[case("about", "about/team", "about", "team")]
	#[case("/about/", "/about/team/lead", "about", "team/lead")]
	#[case("home/secret", "home/secret/x", "home/secret", "x")]
	fn test_literal_prefix_match(
		#[case] pattern: &str,
		#[case] path: &str,
		#[case] consumed: &str,
		#[case] remaining: &str,
	) {
		let result = literal(pattern).matches(path).unwrap();
		assert_eq!(result.consumed(), consumed);
		assert_eq!(result.remaining(), remaining);
	}

	#[rstest]
	#[case("about", "aboutus")]
	#[case("about", "abou")]
	#[case("users/list", "users")]
	fn test_literal_respects_segment_boundary(#[case] pattern: &str, #[case] path: &str) {
		assert!(literal(pattern).matches(path).is_none());
	}

	#[rstest]
	fn test_full_match_rejects_suffix() {
		let pattern = PathPattern::literal("about", PathMatch::Full).unwrap();
		assert!(pattern.is_match("/about/"));
		assert!(!pattern.is_match("about/team"));
	}

	#[rstest]
	fn test_empty_literal_prefix_consumes_nothing() {
		let result = literal("").matches("/a/b").unwrap();
		assert_eq!(result.consumed(), "");
		assert_eq!(result.remaining(), "a/b");
	}

	#[rstest]
	fn test_empty_literal_full_matches_root_only() {
		let pattern = PathPattern::literal("/", PathMatch::Full).unwrap();
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/home"));
	}

	#[rstest]
	fn test_single_param() {
		let result = literal("users/{id}").matches("/users/42/posts").unwrap();
		assert_eq!(result.param("id"), Some("42"));
		assert_eq!(result.consumed(), "users/42");
		assert_eq!(result.remaining(), "posts");
	}

	#[rstest]
	fn test_wildcard_param_takes_rest() {
		let result = literal("static/{path:*}")
			.matches("static/css/main.css")
			.unwrap();
		assert_eq!(result.param("path"), Some("css/main.css"));
		assert_eq!(result.remaining(), "");
	}

	#[rstest]
	fn test_special_chars_escaped() {
		let pattern = literal("api/v1.0");
		assert!(pattern.is_match("api/v1.0"));
		assert!(!pattern.is_match("api/v1X0"));
	}

	#[rstest]
	fn test_regex_named_and_positional_captures() {
		let pattern = PathPattern::regex(Regex::new(r"^user/(?P<id>\d+)/(\w+)").unwrap());
		let result = pattern.matches("/user/7/edit/advanced").unwrap();
		assert_eq!(result.param("id"), Some("7"));
		assert_eq!(result.param("2"), Some("edit"));
		assert_eq!(result.consumed(), "user/7/edit");
		assert_eq!(result.remaining(), "advanced");
	}

	#[rstest]
	fn test_unanchored_regex_matches_anywhere() {
		let pattern = PathPattern::regex(Regex::new("secret").unwrap());
		let result = pattern.matches("home/secret/inner").unwrap();
		assert_eq!(result.consumed(), "home/secret");
		assert_eq!(result.remaining(), "inner");
	}

	#[rstest]
	#[case("")]
	#[case("anything")]
	#[case("/deep/nested/path?x=1")]
	fn test_catch_all_consumes_everything(#[case] path: &str) {
		let result = literal("**").matches(path).unwrap();
		assert_eq!(result.remaining(), "");
		assert_eq!(result.consumed(), normalize_path(path));
	}

	#[rstest]
	fn test_delegating_catch_all_reserves_sub_path() {
		let result = PathPattern::catch_all_delegating()
			.matches("/a/b")
			.unwrap();
		assert_eq!(result.consumed(), "");
		assert_eq!(result.remaining(), "a/b");
	}

	#[rstest]
	fn test_pattern_rejects_excessive_length() {
		let long_pattern = "/".to_string() + &"a".repeat(1025);
		let err = PathPattern::parse(&long_pattern).unwrap_err();
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let err = PathPattern::parse(&segments.join("/")).unwrap_err();
		assert!(err.to_string().contains("exceeding maximum"));
	}

	#[rstest]
	#[case("users/{id")]
	#[case("users/{}")]
	#[case("{a}/{a}")]
	fn test_malformed_params_rejected(#[case] pattern: &str) {
		assert!(matches!(
			PathPattern::parse(pattern),
			Err(RouterError::Configuration(_))
		));
	}

	#[rstest]
	fn test_match_is_deterministic() {
		let pattern = literal("users/{id}");
		assert_eq!(pattern.matches("users/1/x"), pattern.matches("users/1/x"));
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		assert_eq!(literal("/users/{id}/").to_string(), "users/{id}");
		assert_eq!(literal("**").to_string(), "**");
		assert_eq!(literal("a"), literal("/a/"));
		assert_ne!(
			literal("a"),
			PathPattern::literal("a", PathMatch::Full).unwrap()
		);
	}
}
