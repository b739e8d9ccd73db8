//! Router slots.
//!
//! A [`RouterSlot`] is one node of the navigation state machine. Root slots
//! subscribe to the [`HistoryBridge`]; nested slots are registered with a
//! parent slot, resolve the parent's unresolved suffix, and receive events
//! only through the parent.
//!
//! ```text
//! Idle --navigate--> Resolving --component ready--> Active
//!                        ^                            |
//!                        +--------navigate------------+
//! any --teardown--> Disposed
//! ```
//!
//! Lazily loaded components are spawned on the context's [`LocalSpawn`] and
//! tagged with a [`ResolutionToken`]. A result whose token is no longer the
//! pending one is dropped without touching the slot.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::component::{ComponentHandle, Outlet};
use crate::config::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::history::{HistoryBridge, NavigationEvent};
use crate::listeners::{Listeners, Subscription};
use crate::pattern::{MatchResult, normalize_path};
use crate::route::{ComponentFuture, Loadable, Resolver, Route};
use crate::table::{RouteMatch, RouteTable};

/// Services shared by a tree of slots.
#[derive(Clone)]
pub struct RouterContext {
	history: HistoryBridge,
	spawner: Rc<dyn LocalSpawn>,
	config: Rc<RouterConfig>,
	/// Absolute paths visited by the redirect chain under resolution.
	redirects: Rc<RefCell<Vec<String>>>,
}

impl fmt::Debug for RouterContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterContext")
			.field("history", &self.history)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl RouterContext {
	/// Creates a context.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Configuration`] if `config` is invalid.
	pub fn new<S>(history: HistoryBridge, spawner: S, config: RouterConfig) -> RouterResult<Self>
	where
		S: LocalSpawn + 'static,
	{
		config.validate()?;
		Ok(Self {
			history,
			spawner: Rc::new(spawner),
			config: Rc::new(config),
			redirects: Rc::new(RefCell::new(Vec::new())),
		})
	}

	/// Creates a context on this thread's global bridge.
	pub fn global<S>(spawner: S, config: RouterConfig) -> RouterResult<Self>
	where
		S: LocalSpawn + 'static,
	{
		Self::new(HistoryBridge::global()?, spawner, config)
	}

	/// Returns the history bridge.
	pub fn history(&self) -> &HistoryBridge {
		&self.history
	}

	/// Returns the configuration.
	pub fn config(&self) -> &RouterConfig {
		&self.config
	}

	/// Returns the spawner used for lazily loaded components.
	pub fn spawner(&self) -> &Rc<dyn LocalSpawn> {
		&self.spawner
	}
}

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
	/// No component is active.
	Idle,
	/// A route matched and its component is loading.
	Resolving,
	/// A component is mounted.
	Active,
	/// The slot was torn down.
	Disposed,
}

/// Marks one resolution of a slot. Later resolutions get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolutionToken(u64);

impl ResolutionToken {
	/// Returns the raw counter value.
	pub fn value(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ResolutionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Lifecycle notifications of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEvent {
	/// The slot started resolving `path`.
	NavigationStart {
		/// Path relative to the slot.
		path: String,
	},
	/// A component was activated for `path`.
	NavigationSuccess {
		/// Path relative to the slot.
		path: String,
		/// Name of the activated component.
		component: String,
	},
	/// A guard rejected the matched route.
	NavigationCancel {
		/// Path relative to the slot.
		path: String,
	},
	/// Resolving `path` failed.
	NavigationError {
		/// Path relative to the slot.
		path: String,
		/// The failure.
		error: RouterError,
	},
	/// A redirect route sent the history to `to`.
	Redirect {
		/// Path relative to the slot that matched the redirect.
		from: String,
		/// Absolute target.
		to: String,
	},
}

struct ActiveEntry {
	route: Route,
	result: MatchResult,
	component: ComponentHandle,
}

struct PendingEntry {
	token: ResolutionToken,
	route: Route,
	result: MatchResult,
	path: String,
}

struct SlotInner {
	ctx: RouterContext,
	outlet: Box<dyn Outlet>,
	table: RefCell<RouteTable>,
	state: Cell<SlotState>,
	active: RefCell<Option<ActiveEntry>>,
	pending: RefCell<Option<PendingEntry>>,
	next_token: Cell<u64>,
	/// `None` for a root slot.
	parent: RefCell<Option<Weak<SlotInner>>>,
	child: RefCell<Option<RouterSlot>>,
	subscription: RefCell<Option<Subscription>>,
	events: Listeners<SlotEvent>,
}

/// Handle to a router slot. Clones refer to the same slot.
#[derive(Clone)]
pub struct RouterSlot {
	inner: Rc<SlotInner>,
}

impl fmt::Debug for RouterSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterSlot")
			.field("state", &self.state())
			.field("routes", &self.inner.table.borrow().len())
			.field("root", &self.is_root())
			.field("pending", &self.pending_token())
			.finish()
	}
}

impl RouterSlot {
	/// Creates an idle slot rendering into `outlet`.
	pub fn new<O: Outlet + 'static>(ctx: RouterContext, outlet: O) -> Self {
		Self {
			inner: Rc::new(SlotInner {
				ctx,
				outlet: Box::new(outlet),
				table: RefCell::new(RouteTable::new()),
				state: Cell::new(SlotState::Idle),
				active: RefCell::new(None),
				pending: RefCell::new(None),
				next_token: Cell::new(0),
				parent: RefCell::new(None),
				child: RefCell::new(None),
				subscription: RefCell::new(None),
				events: Listeners::new(),
			}),
		}
	}

	/// Creates an idle slot sharing `parent`'s context.
	///
	/// The slot is not attached until [`Self::setup`] is called with `parent`.
	pub fn nested<O: Outlet + 'static>(parent: &RouterSlot, outlet: O) -> Self {
		Self::new(parent.inner.ctx.clone(), outlet)
	}

	/// Installs `routes`, attaches the slot, and resolves the current path.
	///
	/// Without a parent the slot subscribes to the history bridge; with one
	/// it becomes the parent's child and resolves the parent's unresolved
	/// suffix. Calling `setup` again appends routes and re-resolves.
	///
	/// # Errors
	///
	/// - [`RouterError::Configuration`] if a route is invalid; nothing is installed.
	/// - [`RouterError::NoMatch`] if no route matches the current path.
	/// - [`RouterError::Disposed`] if this slot or `parent` was torn down.
	pub fn setup(
		&self,
		routes: impl IntoIterator<Item = Route>,
		parent: Option<&RouterSlot>,
	) -> RouterResult<()> {
		self.ensure_live()?;
		if let Some(parent) = parent {
			parent.ensure_live()?;
		}
		self.inner.table.borrow_mut().add(routes)?;

		match parent {
			Some(parent) => self.attach_to(parent),
			None => self.subscribe(),
		}
		self.handle(None)
	}

	fn attach_to(&self, parent: &RouterSlot) {
		let subscription = self.inner.subscription.borrow_mut().take();
		drop(subscription);
		*self.inner.parent.borrow_mut() = Some(Rc::downgrade(&parent.inner));
		let previous = parent.inner.child.borrow_mut().replace(self.clone());
		if let Some(previous) = previous
			&& !previous.ptr_eq(self)
		{
			previous.dispose();
		}
	}

	fn subscribe(&self) {
		if self.inner.subscription.borrow().is_some() {
			return;
		}
		let weak = Rc::downgrade(&self.inner);
		let subscription = self.inner.ctx.history.subscribe(move |event| match weak.upgrade() {
			Some(inner) => (RouterSlot { inner }).on_navigation_event(event),
			None => Ok(()),
		});
		*self.inner.subscription.borrow_mut() = Some(subscription);
	}

	/// Resolves the path this slot is responsible for after `event`.
	///
	/// Root slots strip the base path from the event's target; nested slots
	/// use the parent's unresolved suffix. Root slots skip events that a
	/// nested navigation already superseded.
	pub fn on_navigation_event(&self, event: &NavigationEvent) -> RouterResult<()> {
		self.ensure_live()?;
		if self.is_root() {
			let current = self.inner.ctx.history.current_path()?;
			if current != event.to_path() {
				tracing::debug!(event = %event, current = %current, "skipping superseded navigation");
				return Ok(());
			}
		}
		self.handle(Some(event.to_path()))
	}

	fn handle(&self, to_path: Option<&str>) -> RouterResult<()> {
		let path = self.relevant_path(to_path)?;
		self.resolve_path(&path)
	}

	fn relevant_path(&self, to_path: Option<&str>) -> RouterResult<String> {
		if !self.is_root() {
			let parent = self.parent().ok_or(RouterError::Disposed)?;
			return Ok(parent.remaining_path().unwrap_or_default());
		}
		let full = match to_path {
			Some(path) => path.to_string(),
			None => self.inner.ctx.history.current_path()?,
		};
		self.inner
			.ctx
			.config
			.strip_base(&full)
			.map(str::to_string)
			.ok_or_else(|| RouterError::no_match(full.as_str()))
	}

	fn resolve_path(&self, path: &str) -> RouterResult<()> {
		self.emit(SlotEvent::NavigationStart {
			path: path.to_string(),
		});

		let matched = self.inner.table.borrow().resolve(path);
		let Some(matched) = matched else {
			self.drop_pending();
			return Err(self.fail(path, RouterError::no_match(path)));
		};

		if !matched.route.check_guard(&matched.result) {
			self.drop_pending();
			tracing::debug!(path = %path, route = %matched.route.label(), "guard rejected navigation");
			self.emit(SlotEvent::NavigationCancel {
				path: path.to_string(),
			});
			return Ok(());
		}

		match matched.route.resolver()? {
			Resolver::Redirect(_) => {
				self.drop_pending();
				self.redirect(path, &matched)
			}
			Resolver::Component(provider) => {
				if self.reuse_active(&matched)? || self.refresh_pending(path, &matched) {
					return Ok(());
				}
				let token = self.begin(path, &matched);
				match provider(&matched.result) {
					Loadable::Ready(component) => self.complete(token, Ok(component)),
					Loadable::Pending(future) => self.spawn_load(token, future),
				}
			}
		}
	}

	fn redirect(&self, path: &str, matched: &RouteMatch) -> RouterResult<()> {
		let config = &self.inner.ctx.config;
		let target = matched
			.route
			.redirect_target(&matched.result)
			.ok_or_else(|| RouterError::Configuration("redirect route without target".to_string()))?;
		let target = config.to_absolute(&target);

		let started = {
			let mut chain = self.inner.ctx.redirects.borrow_mut();
			let started = chain.is_empty();
			if started {
				let origin = self.inner.ctx.history.location()?;
				chain.push(origin.path().to_string());
			}
			if chain
				.iter()
				.any(|seen| normalize_path(seen) == normalize_path(&target))
			{
				chain.push(target.clone());
				let err = RouterError::RedirectCycle {
					chain: std::mem::take(&mut *chain),
				};
				drop(chain);
				return Err(self.fail(path, err));
			}
			if chain.len() > config.max_redirects {
				let err = RouterError::TooManyRedirects {
					start: chain.first().cloned().unwrap_or_default(),
					limit: config.max_redirects,
				};
				chain.clear();
				drop(chain);
				return Err(self.fail(path, err));
			}
			chain.push(target.clone());
			started
		};

		tracing::debug!(from = %path, to = %target, "following redirect");
		self.emit(SlotEvent::Redirect {
			from: path.to_string(),
			to: target.clone(),
		});
		let result = self.inner.ctx.history.navigate(&target, config.redirect_kind);
		if started {
			self.inner.ctx.redirects.borrow_mut().clear();
		}
		result
	}

	/// Keeps the active component when the same route matches the same
	/// segment and forwards the event to the child.
	fn reuse_active(&self, matched: &RouteMatch) -> RouterResult<bool> {
		{
			let mut active = self.inner.active.borrow_mut();
			let Some(entry) = active.as_mut() else {
				return Ok(false);
			};
			if entry.route.id() != matched.route.id() || !entry.result.same_target(&matched.result) {
				return Ok(false);
			}
			entry.result.set_remaining(matched.result.remaining());
		}

		self.drop_pending();
		self.inner.state.set(SlotState::Active);
		tracing::debug!(
			route = %matched.route.label(),
			remaining = %matched.result.remaining(),
			"route already active"
		);

		let child = self.inner.child.borrow().clone();
		if let Some(child) = child {
			child.handle(None)?;
		}
		Ok(true)
	}

	fn refresh_pending(&self, path: &str, matched: &RouteMatch) -> bool {
		let mut pending = self.inner.pending.borrow_mut();
		match pending.as_mut() {
			Some(entry)
				if entry.route.id() == matched.route.id()
					&& entry.result.same_target(&matched.result) =>
			{
				entry.result = matched.result.clone();
				entry.path = path.to_string();
				tracing::debug!(token = %entry.token, path = %path, "route already loading");
				true
			}
			_ => false,
		}
	}

	fn begin(&self, path: &str, matched: &RouteMatch) -> ResolutionToken {
		let token = ResolutionToken(self.inner.next_token.get() + 1);
		self.inner.next_token.set(token.0);
		*self.inner.pending.borrow_mut() = Some(PendingEntry {
			token,
			route: matched.route.clone(),
			result: matched.result.clone(),
			path: path.to_string(),
		});
		self.inner.state.set(SlotState::Resolving);
		tracing::debug!(token = %token, path = %path, route = %matched.route.label(), "resolving");
		token
	}

	fn spawn_load(&self, token: ResolutionToken, future: ComponentFuture) -> RouterResult<()> {
		let weak = Rc::downgrade(&self.inner);
		let spawned = self.inner.ctx.spawner.spawn_local(async move {
			let outcome = future.await;
			let Some(inner) = weak.upgrade() else {
				tracing::debug!(token = %token, "slot dropped before component arrived");
				return;
			};
			if let Err(err) = (RouterSlot { inner }).complete(token, outcome) {
				tracing::warn!(token = %token, error = %err, "component activation failed");
			}
		});

		if let Err(err) = spawned {
			let pending = self.inner.pending.borrow_mut().take();
			self.restore_state();
			let path = pending.map(|p| p.path).unwrap_or_default();
			return Err(self.fail(&path, err.into()));
		}
		Ok(())
	}

	fn is_current(&self, token: ResolutionToken) -> bool {
		self.state() != SlotState::Disposed
			&& self.is_hosted()
			&& self
				.inner
				.pending
				.borrow()
				.as_ref()
				.is_some_and(|pending| pending.token == token)
	}

	fn is_hosted(&self) -> bool {
		let parent = self.inner.parent.borrow().clone();
		match parent {
			None => true,
			Some(weak) => weak.upgrade().is_some_and(|parent| {
				parent.state.get() != SlotState::Disposed
					&& parent
						.child
						.borrow()
						.as_ref()
						.is_some_and(|child| child.ptr_eq(self))
			}),
		}
	}

	fn complete(&self, token: ResolutionToken, outcome: RouterResult<ComponentHandle>) -> RouterResult<()> {
		if !self.is_current(token) {
			tracing::debug!(token = %token, "discarding stale component");
			return Ok(());
		}
		let Some(pending) = self.inner.pending.borrow_mut().take() else {
			return Ok(());
		};

		match outcome {
			Ok(component) => self.activate(pending, component),
			Err(err) => {
				self.restore_state();
				let err = match err {
					RouterError::ComponentLoad(_) => err,
					other => RouterError::ComponentLoad(other.to_string()),
				};
				tracing::warn!(path = %pending.path, error = %err, "component failed to load");
				Err(self.fail(&pending.path, err))
			}
		}
	}

	fn activate(&self, pending: PendingEntry, component: ComponentHandle) -> RouterResult<()> {
		let previous = self.inner.active.borrow_mut().take();
		if let Some(previous) = previous {
			self.release(previous);
		}

		if let Err(err) = self.inner.outlet.mount(&component) {
			self.inner.state.set(SlotState::Idle);
			return Err(self.fail(&pending.path, err));
		}

		*self.inner.active.borrow_mut() = Some(ActiveEntry {
			route: pending.route,
			result: pending.result,
			component: Rc::clone(&component),
		});
		self.inner.state.set(SlotState::Active);
		tracing::info!(
			token = %pending.token,
			path = %pending.path,
			component = component.name(),
			"activated component"
		);

		if let Err(err) = component.activated(self) {
			return Err(self.fail(&pending.path, err));
		}
		self.emit(SlotEvent::NavigationSuccess {
			path: pending.path,
			component: component.name().to_string(),
		});
		Ok(())
	}

	/// Tears down the hosted child, then deactivates and unmounts `entry`.
	fn release(&self, entry: ActiveEntry) {
		let child = self.inner.child.borrow_mut().take();
		if let Some(child) = child {
			child.dispose();
		}
		entry.component.deactivated();
		self.inner.outlet.unmount(&entry.component);
		tracing::debug!(component = entry.component.name(), "deactivated component");
	}

	/// Invalidates the load in flight; its result will be discarded.
	fn drop_pending(&self) {
		let stale = self.inner.pending.borrow_mut().take();
		if let Some(stale) = stale {
			tracing::debug!(token = %stale.token, path = %stale.path, "superseded pending load");
			self.restore_state();
		}
	}

	fn restore_state(&self) {
		let state = if self.inner.active.borrow().is_some() {
			SlotState::Active
		} else {
			SlotState::Idle
		};
		self.inner.state.set(state);
	}

	fn fail(&self, path: &str, error: RouterError) -> RouterError {
		tracing::debug!(path = %path, error = %error, "navigation failed");
		self.emit(SlotEvent::NavigationError {
			path: path.to_string(),
			error: error.clone(),
		});
		error
	}

	fn emit(&self, event: SlotEvent) {
		if let Err(err) = self.inner.events.emit(&event) {
			tracing::warn!(error = %err, "slot event listener failed");
		}
	}

	/// Returns whether this slot would match `path`, ignoring guards and
	/// pending loads. Root slots strip the base path first.
	pub fn get_route_match(&self, path: &str) -> RouterResult<bool> {
		self.ensure_live()?;
		let path = if self.is_root() {
			match self.inner.ctx.config.strip_base(path) {
				Some(path) => path,
				None => return Ok(false),
			}
		} else {
			normalize_path(path)
		};
		Ok(self.inner.table.borrow().resolve(path).is_some())
	}

	/// Appends routes. Takes effect from the next navigation.
	pub fn add(&self, routes: impl IntoIterator<Item = Route>) -> RouterResult<()> {
		self.ensure_live()?;
		self.inner.table.borrow_mut().add(routes)
	}

	/// Removes routes by identity, returning how many were removed.
	pub fn remove(&self, routes: &[Route]) -> RouterResult<usize> {
		self.ensure_live()?;
		Ok(self.inner.table.borrow_mut().remove(routes))
	}

	/// Removes every route, drops the pending load, and deactivates the
	/// active component.
	pub fn clear(&self) -> RouterResult<()> {
		self.ensure_live()?;
		self.inner.table.borrow_mut().clear();
		self.inner.pending.borrow_mut().take();
		let active = self.inner.active.borrow_mut().take();
		if let Some(active) = active {
			self.release(active);
		}
		self.inner.state.set(SlotState::Idle);
		Ok(())
	}

	/// Pushes `path` through the history bridge. Relative paths are joined to
	/// the base path.
	pub fn push(&self, path: &str) -> RouterResult<()> {
		self.ensure_live()?;
		let target = self.inner.ctx.config.to_absolute(path);
		self.inner.ctx.history.push(&target)
	}

	/// Replaces the current entry with `path`. Relative paths are joined to
	/// the base path.
	pub fn replace(&self, path: &str) -> RouterResult<()> {
		self.ensure_live()?;
		let target = self.inner.ctx.config.to_absolute(path);
		self.inner.ctx.history.replace(&target)
	}

	/// Tears the slot down: unsubscribes, drops the pending load, deactivates
	/// the active component and its child, detaches from the parent.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Disposed`] if the slot was already torn down.
	pub fn teardown(&self) -> RouterResult<()> {
		self.ensure_live()?;
		self.dispose();
		Ok(())
	}

	fn dispose(&self) {
		if self.state() == SlotState::Disposed {
			return;
		}
		self.inner.state.set(SlotState::Disposed);
		let subscription = self.inner.subscription.borrow_mut().take();
		drop(subscription);
		self.inner.pending.borrow_mut().take();

		let active = self.inner.active.borrow_mut().take();
		match active {
			Some(active) => self.release(active),
			None => {
				let child = self.inner.child.borrow_mut().take();
				if let Some(child) = child {
					child.dispose();
				}
			}
		}

		if let Some(parent) = self.parent() {
			let mut child = parent.inner.child.borrow_mut();
			if child.as_ref().is_some_and(|c| c.ptr_eq(self)) {
				child.take();
			}
		}
		self.inner.table.borrow_mut().clear();
		tracing::debug!("router slot torn down");
	}

	/// Subscribes to this slot's lifecycle events.
	pub fn on_event<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&SlotEvent) + 'static,
	{
		self.inner.events.subscribe(move |event| {
			listener(event);
			Ok(())
		})
	}

	fn ensure_live(&self) -> RouterResult<()> {
		if self.state() == SlotState::Disposed {
			return Err(RouterError::Disposed);
		}
		Ok(())
	}

	/// Returns the lifecycle state.
	pub fn state(&self) -> SlotState {
		self.inner.state.get()
	}

	/// Returns the shared context.
	pub fn context(&self) -> &RouterContext {
		&self.inner.ctx
	}

	/// Returns the route of the active component.
	pub fn active_route(&self) -> Option<Route> {
		self.inner.active.borrow().as_ref().map(|a| a.route.clone())
	}

	/// Returns the active component.
	pub fn active_component(&self) -> Option<ComponentHandle> {
		self.inner
			.active
			.borrow()
			.as_ref()
			.map(|a| Rc::clone(&a.component))
	}

	/// Returns the match that activated the current component.
	pub fn match_result(&self) -> Option<MatchResult> {
		self.inner.active.borrow().as_ref().map(|a| a.result.clone())
	}

	/// Returns the path left for a nested slot.
	pub fn remaining_path(&self) -> Option<String> {
		self.inner
			.active
			.borrow()
			.as_ref()
			.map(|a| a.result.remaining().to_string())
	}

	/// Returns the token of the load in flight.
	pub fn pending_token(&self) -> Option<ResolutionToken> {
		self.inner.pending.borrow().as_ref().map(|p| p.token)
	}

	/// Returns the nested slot hosted by the active component.
	pub fn child(&self) -> Option<RouterSlot> {
		self.inner.child.borrow().clone()
	}

	/// Returns the parent slot, if it is still alive.
	pub fn parent(&self) -> Option<RouterSlot> {
		let parent = self.inner.parent.borrow().clone()?;
		parent.upgrade().map(|inner| RouterSlot { inner })
	}

	/// Returns true for slots without a parent.
	pub fn is_root(&self) -> bool {
		self.inner.parent.borrow().is_none()
	}

	/// Returns the installed routes in order.
	pub fn routes(&self) -> Vec<Route> {
		self.inner.table.borrow().routes().to_vec()
	}

	/// Returns true if both handles refer to the same slot.
	pub fn ptr_eq(&self, other: &RouterSlot) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::{Component, NullOutlet};
	use futures::executor::LocalPool;
	use rstest::{fixture, rstest};

	struct Page(&'static str);

	impl Component for Page {
		fn name(&self) -> &str {
			self.0
		}
	}

	struct Harness {
		pool: LocalPool,
		slot: RouterSlot,
		history: HistoryBridge,
	}

	#[fixture]
	fn harness() -> Harness {
		let pool = LocalPool::new();
		let history = HistoryBridge::memory("http://localhost/").unwrap();
		let ctx = RouterContext::new(history.clone(), pool.spawner(), RouterConfig::default()).unwrap();
		Harness {
			slot: RouterSlot::new(ctx, NullOutlet),
			pool,
			history,
		}
	}

	fn active_name(slot: &RouterSlot) -> Option<String> {
		slot.active_component().map(|c| c.name().to_string())
	}

	#[rstest]
	fn test_setup_activates_current_path(harness: Harness) {
		harness.history.replace("/about").unwrap();
		harness
			.slot
			.setup(
				[
					Route::new("home").component(|| Page("home")),
					Route::new("about").component(|| Page("about")),
				],
				None,
			)
			.unwrap();

		assert_eq!(harness.slot.state(), SlotState::Active);
		assert_eq!(active_name(&harness.slot).as_deref(), Some("about"));
	}

	#[rstest]
	fn test_setup_without_match_fails(harness: Harness) {
		let err = harness
			.slot
			.setup([Route::new("home").component(|| Page("home"))], None)
			.unwrap_err();
		assert_eq!(err, RouterError::no_match(""));
		assert_eq!(harness.slot.state(), SlotState::Idle);
	}

	#[rstest]
	fn test_setup_twice_subscribes_once(harness: Harness) {
		harness.slot.setup([Route::catch_all().component(|| Page("all"))], None).unwrap();
		harness.slot.setup([Route::new("x").component(|| Page("x"))], None).unwrap();
		assert_eq!(harness.history.listener_count(), 1);
		assert_eq!(harness.slot.routes().len(), 2);
	}

	#[rstest]
	fn test_navigation_swaps_component(harness: Harness) {
		harness
			.slot
			.setup(
				[
					Route::new("a").component(|| Page("a")),
					Route::catch_all().component(|| Page("fallback")),
				],
				None,
			)
			.unwrap();
		assert_eq!(active_name(&harness.slot).as_deref(), Some("fallback"));

		harness.history.push("/a").unwrap();
		assert_eq!(active_name(&harness.slot).as_deref(), Some("a"));
	}

	#[rstest]
	fn test_guard_rejection_cancels(harness: Harness) {
		let events = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&events);
		let _sub = harness.slot.on_event(move |e| sink.borrow_mut().push(e.clone()));
		harness
			.slot
			.setup(
				[
					Route::new("admin").component(|| Page("admin")).with_guard(|_| false),
					Route::catch_all().component(|| Page("home")),
				],
				None,
			)
			.unwrap();

		harness.history.push("/admin").unwrap();
		assert_eq!(active_name(&harness.slot).as_deref(), Some("home"));
		assert!(events.borrow().contains(&SlotEvent::NavigationCancel {
			path: "admin".to_string()
		}));
	}

	#[rstest]
	fn test_lazy_component_resolves_through_pool(mut harness: Harness) {
		harness
			.slot
			.setup(
				[Route::catch_all().lazy(|| async {
					Ok(Rc::new(Page("lazy")) as ComponentHandle)
				})],
				None,
			)
			.unwrap();
		assert_eq!(harness.slot.state(), SlotState::Resolving);
		assert!(harness.slot.pending_token().is_some());

		harness.pool.run_until_stalled();
		assert_eq!(harness.slot.state(), SlotState::Active);
		assert_eq!(active_name(&harness.slot).as_deref(), Some("lazy"));
		assert!(harness.slot.pending_token().is_none());
	}

	#[rstest]
	fn test_failed_load_restores_previous_state(mut harness: Harness) {
		harness
			.slot
			.setup(
				[
					Route::new("broken").lazy(|| async {
						Err(RouterError::ComponentLoad("chunk missing".to_string()))
					}),
					Route::catch_all().component(|| Page("home")),
				],
				None,
			)
			.unwrap();
		harness.history.push("/broken").unwrap();
		assert_eq!(harness.slot.state(), SlotState::Resolving);

		harness.pool.run_until_stalled();
		assert_eq!(harness.slot.state(), SlotState::Active);
		assert_eq!(active_name(&harness.slot).as_deref(), Some("home"));
	}

	#[rstest]
	fn test_same_route_is_not_reactivated(harness: Harness) {
		let created = Rc::new(Cell::new(0));
		let counter = Rc::clone(&created);
		harness.history.replace("/users/1").unwrap();
		harness
			.slot
			.setup(
				[Route::new("users").component(move || {
					counter.set(counter.get() + 1);
					Page("users")
				})],
				None,
			)
			.unwrap();
		harness.history.push("/users/2").unwrap();
		assert_eq!(created.get(), 1);
		assert_eq!(harness.slot.remaining_path().as_deref(), Some("2"));
	}

	#[rstest]
	fn test_self_redirect_is_a_cycle(harness: Harness) {
		harness
			.slot
			.setup([Route::new("loop").redirect_to("loop"), Route::catch_all().component(|| Page("home"))], None)
			.unwrap();

		let err = harness.history.push("/loop").unwrap_err();
		assert!(matches!(err, RouterError::RedirectCycle { .. }));
		assert_eq!(active_name(&harness.slot).as_deref(), Some("home"));
	}

	#[rstest]
	fn test_redirect_limit(harness: Harness) {
		let ctx = RouterContext::new(
			harness.history.clone(),
			harness.pool.spawner(),
			RouterConfig::new().with_max_redirects(2),
		)
		.unwrap();
		let slot = RouterSlot::new(ctx, NullOutlet);
		slot.setup(
			[
				Route::new("a").redirect_to("b"),
				Route::new("b").redirect_to("c"),
				Route::new("c").redirect_to("d"),
				Route::catch_all().component(|| Page("home")),
			],
			None,
		)
		.unwrap();

		let err = harness.history.push("/a").unwrap_err();
		assert_eq!(
			err,
			RouterError::TooManyRedirects {
				start: "/a".to_string(),
				limit: 2
			}
		);
	}

	#[rstest]
	fn test_teardown_disposes(harness: Harness) {
		harness.slot.setup([Route::catch_all().component(|| Page("home"))], None).unwrap();
		harness.slot.teardown().unwrap();

		assert_eq!(harness.slot.state(), SlotState::Disposed);
		assert_eq!(harness.history.listener_count(), 0);
		assert!(harness.slot.active_component().is_none());
		assert_eq!(harness.slot.teardown(), Err(RouterError::Disposed));
		assert_eq!(harness.slot.get_route_match("/"), Err(RouterError::Disposed));
		assert_eq!(harness.slot.push("/x"), Err(RouterError::Disposed));
	}

	#[rstest]
	fn test_clear_returns_to_idle(harness: Harness) {
		harness.slot.setup([Route::catch_all().component(|| Page("home"))], None).unwrap();
		harness.slot.clear().unwrap();
		assert_eq!(harness.slot.state(), SlotState::Idle);
		assert!(!harness.slot.get_route_match("/anything").unwrap());
	}

	#[rstest]
	fn test_get_route_match_strips_base() {
		let pool = LocalPool::new();
		let history = HistoryBridge::memory("http://localhost/app/").unwrap();
		let ctx = RouterContext::new(history, pool.spawner(), RouterConfig::new().with_base_path("/app")).unwrap();
		let slot = RouterSlot::new(ctx, NullOutlet);
		slot.add([Route::exact("about").component(|| Page("about"))]).unwrap();

		assert!(slot.get_route_match("/app/about").unwrap());
		assert!(!slot.get_route_match("/about").unwrap());
		assert_eq!(slot.state(), SlotState::Idle);
	}
}
