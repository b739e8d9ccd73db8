//! Route definitions.
//!
//! A [`Route`] maps a [`PathPattern`] to exactly one resolver: a component
//! provider or a redirect target. Routes are plain builders; they are
//! validated when added to a [`RouteTable`](crate::RouteTable), so a
//! malformed route fails at registration rather than at navigation time.

use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{FutureExt, LocalBoxFuture};
use regex::Regex;

use crate::component::{Component, ComponentHandle};
use crate::error::{RouterError, RouterResult};
use crate::pattern::{MatchResult, PathMatch, PathPattern};

/// Future resolving to a lazily loaded component.
pub type ComponentFuture = LocalBoxFuture<'static, RouterResult<ComponentHandle>>;

/// Produces the component for a matched route.
pub type ComponentProvider = Rc<dyn Fn(&MatchResult) -> Loadable>;

/// Type alias for route guard functions.
pub type RouteGuard = Rc<dyn Fn(&MatchResult) -> bool>;

/// What a component provider hands back.
pub enum Loadable {
	/// The component is available now.
	Ready(ComponentHandle),
	/// The component arrives later.
	Pending(ComponentFuture),
}

impl Loadable {
	/// Wraps a component that is available now.
	pub fn ready<C: Component>(component: C) -> Self {
		Self::Ready(Rc::new(component))
	}

	/// Wraps a future resolving to a component.
	pub fn pending<F>(future: F) -> Self
	where
		F: Future<Output = RouterResult<ComponentHandle>> + 'static,
	{
		Self::Pending(future.boxed_local())
	}
}

impl From<ComponentHandle> for Loadable {
	fn from(component: ComponentHandle) -> Self {
		Self::Ready(component)
	}
}

impl fmt::Debug for Loadable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ready(component) => f.debug_tuple("Ready").field(&component.name()).finish(),
			Self::Pending(_) => f.write_str("Pending"),
		}
	}
}

/// A validated route resolver.
#[derive(Clone)]
pub enum Resolver {
	/// Activate a component.
	Component(ComponentProvider),
	/// Navigate elsewhere.
	Redirect(String),
}

impl fmt::Debug for Resolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Component(_) => f.write_str("Component"),
			Self::Redirect(target) => f.debug_tuple("Redirect").field(target).finish(),
		}
	}
}

/// Identity of a route. Clones of a route share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(u64);

impl RouteId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for RouteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "route#{}", self.0)
	}
}

/// A single route definition.
///
/// # Example
///
/// ```
/// use waymark_router::{Component, Route};
///
/// struct About;
/// impl Component for About {}
///
/// let about = Route::new("about").component(|| About);
/// let fallback = Route::new("**").redirect_to("about");
/// ```
#[derive(Clone)]
pub struct Route {
	id: RouteId,
	/// The pattern, or the reason it failed to compile.
	pattern: Result<PathPattern, String>,
	name: Option<String>,
	component: Option<ComponentProvider>,
	redirect_to: Option<String>,
	guard: Option<RouteGuard>,
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("id", &self.id)
			.field("pattern", &self.pattern)
			.field("name", &self.name)
			.field("has_component", &self.component.is_some())
			.field("redirect_to", &self.redirect_to)
			.field("has_guard", &self.guard.is_some())
			.finish()
	}
}

impl Route {
	/// Creates a route from a pattern string (`**` is the catch-all).
	pub fn new(pattern: &str) -> Self {
		Self::from_result(PathPattern::parse(pattern))
	}

	/// Creates a route whose literal pattern has to match the whole path.
	pub fn exact(pattern: &str) -> Self {
		Self::from_result(PathPattern::literal(pattern, PathMatch::Full))
	}

	/// Creates a route from a regular expression.
	pub fn regex(regex: Regex) -> Self {
		Self::with_pattern(PathPattern::regex(regex))
	}

	/// Creates a catch-all route.
	pub fn catch_all() -> Self {
		Self::with_pattern(PathPattern::catch_all())
	}

	/// Creates a route from a compiled pattern.
	pub fn with_pattern(pattern: PathPattern) -> Self {
		Self::from_result(Ok(pattern))
	}

	fn from_result(pattern: RouterResult<PathPattern>) -> Self {
		Self {
			id: RouteId::next(),
			pattern: pattern.map_err(|e| e.to_string()),
			name: None,
			component: None,
			redirect_to: None,
			guard: None,
		}
	}

	/// Sets a component constructor that produces the view synchronously.
	pub fn component<F, C>(self, factory: F) -> Self
	where
		F: Fn() -> C + 'static,
		C: Component,
	{
		self.provider(move |_| Loadable::ready(factory()))
	}

	/// Sets a lazily loaded component.
	pub fn lazy<F, Fut>(self, loader: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = RouterResult<ComponentHandle>> + 'static,
	{
		self.provider(move |_| Loadable::pending(loader()))
	}

	/// Sets a provider that sees the match result.
	pub fn provider<F>(mut self, provider: F) -> Self
	where
		F: Fn(&MatchResult) -> Loadable + 'static,
	{
		self.component = Some(Rc::new(provider));
		self
	}

	/// Sets a redirect target.
	///
	/// `{name}` placeholders are filled from the match parameters. Targets
	/// without a leading `/` are relative to the configured base path.
	pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
		self.redirect_to = Some(target.into());
		self
	}

	/// Sets the route name.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Adds a guard to this route.
	pub fn with_guard<G>(mut self, guard: G) -> Self
	where
		G: Fn(&MatchResult) -> bool + 'static,
	{
		self.guard = Some(Rc::new(guard));
		self
	}

	/// Returns the route identity.
	pub fn id(&self) -> RouteId {
		self.id
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the pattern, or `None` if it failed to compile.
	pub fn pattern(&self) -> Option<&PathPattern> {
		self.pattern.as_ref().ok()
	}

	/// Returns true if this route redirects.
	pub fn is_redirect(&self) -> bool {
		self.redirect_to.is_some()
	}

	/// Checks if the guard allows access.
	pub fn check_guard(&self, result: &MatchResult) -> bool {
		self.guard.as_ref().map(|g| g(result)).unwrap_or(true)
	}

	/// Checks that the pattern compiled and exactly one resolver is set.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Configuration`] describing the problem.
	pub fn validate(&self) -> RouterResult<()> {
		if let Err(reason) = &self.pattern {
			return Err(RouterError::Configuration(reason.clone()));
		}
		match (&self.component, &self.redirect_to) {
			(Some(_), None) | (None, Some(_)) => Ok(()),
			(Some(_), Some(_)) => Err(RouterError::Configuration(format!(
				"route {} sets both a component and a redirect",
				self.label()
			))),
			(None, None) => Err(RouterError::Configuration(format!(
				"route {} sets neither a component nor a redirect",
				self.label()
			))),
		}
	}

	/// Returns the resolver of a valid route.
	pub fn resolver(&self) -> RouterResult<Resolver> {
		self.validate()?;
		match (&self.component, &self.redirect_to) {
			(Some(provider), _) => Ok(Resolver::Component(Rc::clone(provider))),
			(None, Some(target)) => Ok(Resolver::Redirect(target.clone())),
			(None, None) => Err(RouterError::Configuration(format!(
				"route {} has no resolver",
				self.label()
			))),
		}
	}

	/// Gets the redirect target with parameters substituted.
	///
	/// Returns None if this is not a redirect route.
	///
	/// Placeholders are replaced in one pass, so substituted values are never
	/// expanded again. Unknown placeholders are kept as written.
	pub fn redirect_target(&self, result: &MatchResult) -> Option<String> {
		let template = self.redirect_to.as_deref()?;
		let mut target = String::with_capacity(template.len());
		let mut rest = template;

		while let Some(open) = rest.find('{') {
			target.push_str(&rest[..open]);
			let tail = &rest[open..];
			let Some(close) = tail.find('}') else {
				rest = tail;
				break;
			};
			let placeholder = &tail[..=close];
			match result.param(&placeholder[1..close]) {
				Some(value) => target.push_str(value),
				None => target.push_str(placeholder),
			}
			rest = &tail[close + 1..];
		}
		target.push_str(rest);
		Some(target)
	}

	/// Matches a path against this route's pattern.
	pub fn matches(&self, path: &str) -> Option<MatchResult> {
		self.pattern().and_then(|pattern| pattern.matches(path))
	}

	pub(crate) fn label(&self) -> String {
		match (&self.name, &self.pattern) {
			(Some(name), _) => name.clone(),
			(None, Ok(pattern)) => format!("{:?}", pattern.to_string()),
			(None, Err(_)) => self.id.to_string(),
		}
	}
}
