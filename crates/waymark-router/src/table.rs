//! Ordered route tables.

use crate::error::RouterResult;
use crate::pattern::MatchResult;
use crate::route::{Route, RouteId};

/// A route that matched a path, with the match outcome.
#[derive(Debug, Clone)]
pub struct RouteMatch {
	/// The matched route.
	pub route: Route,
	/// Consumed segment, remaining suffix, and parameters.
	pub result: MatchResult,
}

impl RouteMatch {
	/// Returns a captured parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.result.param(name)
	}
}

/// An ordered list of routes. The first matching route wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<Route>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends routes, keeping their order.
	///
	/// The whole batch is validated before anything is appended.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Configuration`](crate::RouterError::Configuration)
	/// for the first invalid route; the table is left unchanged.
	pub fn add(&mut self, routes: impl IntoIterator<Item = Route>) -> RouterResult<()> {
		let routes: Vec<Route> = routes.into_iter().collect();
		for route in &routes {
			route.validate()?;
		}
		self.routes.extend(routes);
		Ok(())
	}

	/// Removes routes by identity and returns how many were removed.
	///
	/// Routes that are not in the table are ignored.
	pub fn remove(&mut self, routes: &[Route]) -> usize {
		let ids: Vec<RouteId> = routes.iter().map(Route::id).collect();
		let before = self.routes.len();
		self.routes.retain(|route| !ids.contains(&route.id()));
		before - self.routes.len()
	}

	/// Removes every route.
	pub fn clear(&mut self) {
		self.routes.clear();
	}

	/// Finds the first route matching `path`.
	///
	/// Guards are not consulted here.
	pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
		self.routes.iter().find_map(|route| {
			route.matches(path).map(|result| RouteMatch {
				route: route.clone(),
				result,
			})
		})
	}

	/// Returns the routes in order.
	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns true if the table holds no routes.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
