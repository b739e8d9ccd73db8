//! Error types for router slots.

use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// A route or configuration value was rejected at registration time.
	#[error("invalid route configuration: {0}")]
	Configuration(String),

	/// No route (catch-all included) matches the path.
	#[error("no route matches path: {path:?}")]
	NoMatch {
		/// The path, relative to the slot, that failed to resolve.
		path: String,
	},

	/// A redirect chain revisited a path it had already produced.
	#[error("redirect cycle detected: {}", chain.join(" -> "))]
	RedirectCycle {
		/// Every path visited by the chain, ending with the repeated one.
		chain: Vec<String>,
	},

	/// A redirect chain did not terminate within the configured hop limit.
	#[error("redirect chain starting at {start:?} exceeded {limit} hops")]
	TooManyRedirects {
		/// The path that started the chain.
		start: String,
		/// The configured limit.
		limit: usize,
	},

	/// The slot has been torn down.
	#[error("router slot has been torn down")]
	Disposed,

	/// The history backend failed or was asked for an unsupported operation.
	#[error("history operation failed: {0}")]
	History(String),

	/// A lazily loaded component resolved to an error.
	#[error("component failed to load: {0}")]
	ComponentLoad(String),

	/// The spawner refused the component loading task.
	#[error("failed to spawn component load: {0}")]
	Spawn(String),
}

impl RouterError {
	/// Creates a [`RouterError::NoMatch`] for the given path.
	pub fn no_match(path: impl Into<String>) -> Self {
		Self::NoMatch { path: path.into() }
	}

	/// Returns true for errors caused by the route table rather than the platform.
	pub fn is_routing_error(&self) -> bool {
		matches!(
			self,
			Self::NoMatch { .. } | Self::RedirectCycle { .. } | Self::TooManyRedirects { .. }
		)
	}
}

impl From<url::ParseError> for RouterError {
	fn from(err: url::ParseError) -> Self {
		Self::History(format!("invalid URL: {}", err))
	}
}

impl From<futures::task::SpawnError> for RouterError {
	fn from(err: futures::task::SpawnError) -> Self {
		Self::Spawn(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_no_match_display() {
		assert_eq!(
			RouterError::no_match("users/42").to_string(),
			"no route matches path: \"users/42\""
		);
	}

	#[rstest]
	fn test_redirect_cycle_display() {
		let err = RouterError::RedirectCycle {
			chain: vec!["/a".to_string(), "/b".to_string(), "/a".to_string()],
		};
		assert_eq!(err.to_string(), "redirect cycle detected: /a -> /b -> /a");
	}

	#[rstest]
	#[case(RouterError::no_match("x"), true)]
	#[case(RouterError::RedirectCycle { chain: vec![] }, true)]
	#[case(RouterError::TooManyRedirects { start: "/".into(), limit: 3 }, true)]
	#[case(RouterError::Disposed, false)]
	#[case(RouterError::History("boom".into()), false)]
	fn test_is_routing_error(#[case] err: RouterError, #[case] expected: bool) {
		assert_eq!(err.is_routing_error(), expected);
	}

	#[rstest]
	fn test_url_parse_error_converts_to_history() {
		let err: RouterError = url::Url::parse("not a url").unwrap_err().into();
		assert!(matches!(err, RouterError::History(_)));
	}
}
