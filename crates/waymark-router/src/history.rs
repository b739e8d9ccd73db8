//! History bridge.
//!
//! [`HistoryBridge`] is the single chokepoint through which the history stack
//! is mutated. Every push or replace is broadcast as a [`NavigationEvent`] to
//! all subscribers before the call returns; back/forward traversals arrive
//! through [`HistoryBridge::notify_pop`].
//!
//! The stack itself sits behind [`HistoryBackend`]: [`MemoryHistory`] keeps
//! it in process, the browser backend wraps `window.history`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RouterError, RouterResult};
use crate::listeners::{Listeners, Subscription};

/// Origin used by the default in-memory history.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

/// How the history stack changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
	/// A new entry was pushed.
	Push,
	/// The current entry was replaced.
	Replace,
	/// The platform moved back or forward.
	Pop,
}

impl fmt::Display for NavigationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Push => write!(f, "push"),
			Self::Replace => write!(f, "replace"),
			Self::Pop => write!(f, "pop"),
		}
	}
}

/// A path change. Paths carry the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
	from_path: String,
	to_path: String,
	kind: NavigationKind,
}

impl NavigationEvent {
	/// Creates an event.
	pub fn new(from_path: impl Into<String>, to_path: impl Into<String>, kind: NavigationKind) -> Self {
		Self {
			from_path: from_path.into(),
			to_path: to_path.into(),
			kind,
		}
	}

	/// The path before the change.
	pub fn from_path(&self) -> &str {
		&self.from_path
	}

	/// The path after the change.
	pub fn to_path(&self) -> &str {
		&self.to_path
	}

	/// The kind of change.
	pub fn kind(&self) -> NavigationKind {
		self.kind
	}

	/// `to_path` without query string and fragment.
	pub fn pathname(&self) -> &str {
		let end = self.to_path.find(['?', '#']).unwrap_or(self.to_path.len());
		&self.to_path[..end]
	}

	/// Decoded query parameters of `to_path`. Malformed queries decode as empty.
	pub fn query(&self) -> HashMap<String, String> {
		let Some((_, rest)) = self.to_path.split_once('?') else {
			return HashMap::new();
		};
		let query = rest.split('#').next().unwrap_or_default();
		serde_urlencoded::from_str(query).unwrap_or_default()
	}
}

impl fmt::Display for NavigationEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} -> {}", self.kind, self.from_path, self.to_path)
	}
}

/// How a backend reports the outcome of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopDelivery {
	/// The move happened synchronously; the bridge notifies listeners itself.
	Immediate,
	/// The platform reports the move later (popstate).
	Deferred,
	/// The delta left the stack bounds; nothing moved.
	Unchanged,
}

/// Storage for the history stack.
pub trait HistoryBackend {
	/// Returns the current URL.
	fn location(&self) -> RouterResult<Url>;

	/// Pushes a new entry. `path` is resolved against the current URL.
	fn push(&self, path: &str) -> RouterResult<()>;

	/// Replaces the current entry. `path` is resolved against the current URL.
	fn replace(&self, path: &str) -> RouterResult<()>;

	/// Moves `delta` entries through the stack.
	fn go(&self, delta: i32) -> RouterResult<PopDelivery>;
}

/// Path plus query of a URL, as carried by navigation events.
pub fn path_of(url: &Url) -> String {
	match url.query() {
		Some(query) => format!("{}?{}", url.path(), query),
		None => url.path().to_string(),
	}
}

/// In-process history stack.
#[derive(Debug)]
pub struct MemoryHistory {
	state: RefCell<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
	entries: Vec<Url>,
	cursor: usize,
}

impl MemoryHistory {
	/// Creates a stack whose single entry is `url`.
	pub fn new(url: Url) -> Self {
		Self {
			state: RefCell::new(MemoryState {
				entries: vec![url],
				cursor: 0,
			}),
		}
	}

	/// Creates a stack from a URL string.
	///
	/// # Errors
	///
	/// Returns [`RouterError::History`] if `url` does not parse.
	pub fn parse(url: &str) -> RouterResult<Self> {
		Ok(Self::new(Url::parse(url)?))
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Returns true if the stack has no entries. Never the case in practice.
	pub fn is_empty(&self) -> bool {
		self.state.borrow().entries.is_empty()
	}

	/// Returns the index of the current entry.
	pub fn cursor(&self) -> usize {
		self.state.borrow().cursor
	}

	fn resolve(&self, path: &str) -> RouterResult<Url> {
		let current = self.location()?;
		let next = current.join(path)?;
		if next.origin() != current.origin() {
			return Err(RouterError::History(format!(
				"cannot move history to another origin: {}",
				next
			)));
		}
		Ok(next)
	}
}

impl HistoryBackend for MemoryHistory {
	fn location(&self) -> RouterResult<Url> {
		let state = self.state.borrow();
		state
			.entries
			.get(state.cursor)
			.cloned()
			.ok_or_else(|| RouterError::History("history stack is empty".to_string()))
	}

	fn push(&self, path: &str) -> RouterResult<()> {
		let url = self.resolve(path)?;
		let mut state = self.state.borrow_mut();
		let keep = state.cursor + 1;
		state.entries.truncate(keep);
		state.entries.push(url);
		state.cursor = keep;
		Ok(())
	}

	fn replace(&self, path: &str) -> RouterResult<()> {
		let url = self.resolve(path)?;
		let mut state = self.state.borrow_mut();
		let cursor = state.cursor;
		state.entries[cursor] = url;
		Ok(())
	}

	fn go(&self, delta: i32) -> RouterResult<PopDelivery> {
		let mut state = self.state.borrow_mut();
		let target = state.cursor as i64 + i64::from(delta);
		if delta == 0 || target < 0 || target >= state.entries.len() as i64 {
			return Ok(PopDelivery::Unchanged);
		}
		state.cursor = target as usize;
		Ok(PopDelivery::Immediate)
	}
}

impl<B: HistoryBackend + ?Sized> HistoryBackend for Rc<B> {
	fn location(&self) -> RouterResult<Url> {
		(**self).location()
	}

	fn push(&self, path: &str) -> RouterResult<()> {
		(**self).push(path)
	}

	fn replace(&self, path: &str) -> RouterResult<()> {
		(**self).replace(path)
	}

	fn go(&self, delta: i32) -> RouterResult<PopDelivery> {
		(**self).go(delta)
	}
}

struct BridgeInner {
	backend: Box<dyn HistoryBackend>,
	listeners: Listeners<NavigationEvent>,
	last_path: RefCell<String>,
}

/// Shared handle to a history stack and its listeners.
///
/// Clones refer to the same stack.
#[derive(Clone)]
pub struct HistoryBridge {
	inner: Rc<BridgeInner>,
}

impl fmt::Debug for HistoryBridge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HistoryBridge")
			.field("last_path", &*self.inner.last_path.borrow())
			.field("listeners", &self.inner.listeners.len())
			.finish()
	}
}

thread_local! {
	static GLOBAL: RefCell<Option<HistoryBridge>> = const { RefCell::new(None) };
}

impl HistoryBridge {
	/// Wraps a backend.
	pub fn new<B: HistoryBackend + 'static>(backend: B) -> Self {
		let last_path = backend.location().map(|url| path_of(&url)).unwrap_or_default();
		Self {
			inner: Rc::new(BridgeInner {
				backend: Box::new(backend),
				listeners: Listeners::new(),
				last_path: RefCell::new(last_path),
			}),
		}
	}

	/// Creates a bridge over a fresh [`MemoryHistory`] at `url`.
	pub fn memory(url: &str) -> RouterResult<Self> {
		MemoryHistory::parse(url).map(Self::new)
	}

	/// Returns this thread's shared bridge, creating it on first use.
	///
	/// Native builds default to a [`MemoryHistory`] at [`DEFAULT_ORIGIN`];
	/// browser builds to the window's history.
	pub fn global() -> RouterResult<Self> {
		if let Some(bridge) = GLOBAL.with(|global| global.borrow().clone()) {
			return Ok(bridge);
		}
		let bridge = Self::platform_default()?;
		GLOBAL.with(|global| *global.borrow_mut() = Some(bridge.clone()));
		Ok(bridge)
	}

	/// Installs `bridge` as this thread's shared bridge.
	pub fn set_global(bridge: HistoryBridge) {
		GLOBAL.with(|global| *global.borrow_mut() = Some(bridge));
	}

	#[cfg(not(target_arch = "wasm32"))]
	fn platform_default() -> RouterResult<Self> {
		Self::memory(DEFAULT_ORIGIN)
	}

	#[cfg(target_arch = "wasm32")]
	fn platform_default() -> RouterResult<Self> {
		crate::platform::browser::BrowserHistory::new().map(Self::new)
	}

	/// Returns the current URL.
	pub fn location(&self) -> RouterResult<Url> {
		self.inner.backend.location()
	}

	/// Returns the current path with its query string.
	pub fn current_path(&self) -> RouterResult<String> {
		self.location().map(|url| path_of(&url))
	}

	/// Mutates the stack and broadcasts the change to every listener.
	///
	/// # Errors
	///
	/// [`NavigationKind::Pop`] cannot be requested; it comes from the
	/// platform through [`Self::notify_pop`]. Listener errors are returned
	/// after every listener ran.
	pub fn navigate(&self, path: &str, kind: NavigationKind) -> RouterResult<()> {
		let from_path = self.current_path()?;
		match kind {
			NavigationKind::Push => self.inner.backend.push(path)?,
			NavigationKind::Replace => self.inner.backend.replace(path)?,
			NavigationKind::Pop => {
				return Err(RouterError::History(
					"pop navigations are triggered by the platform".to_string(),
				));
			}
		}
		let to_path = self.current_path()?;
		self.broadcast(NavigationEvent::new(from_path, to_path, kind))
	}

	/// Pushes `path`.
	pub fn push(&self, path: &str) -> RouterResult<()> {
		self.navigate(path, NavigationKind::Push)
	}

	/// Replaces the current entry with `path`.
	pub fn replace(&self, path: &str) -> RouterResult<()> {
		self.navigate(path, NavigationKind::Replace)
	}

	/// Broadcasts a pop from the last known path to the current one.
	pub fn notify_pop(&self) -> RouterResult<()> {
		let to_path = self.current_path()?;
		let from_path = self.inner.last_path.borrow().clone();
		self.broadcast(NavigationEvent::new(from_path, to_path, NavigationKind::Pop))
	}

	/// Moves `delta` entries through the stack.
	pub fn go(&self, delta: i32) -> RouterResult<()> {
		match self.inner.backend.go(delta)? {
			PopDelivery::Immediate => self.notify_pop(),
			PopDelivery::Deferred | PopDelivery::Unchanged => Ok(()),
		}
	}

	/// Moves one entry back.
	pub fn back(&self) -> RouterResult<()> {
		self.go(-1)
	}

	/// Moves one entry forward.
	pub fn forward(&self) -> RouterResult<()> {
		self.go(1)
	}

	/// Registers a listener for every following navigation.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&NavigationEvent) -> RouterResult<()> + 'static,
	{
		self.inner.listeners.subscribe(listener)
	}

	/// Returns the number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.len()
	}

	/// Returns true if both handles refer to the same stack.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	fn broadcast(&self, event: NavigationEvent) -> RouterResult<()> {
		*self.inner.last_path.borrow_mut() = event.to_path().to_string();
		tracing::debug!(
			kind = %event.kind(),
			from = %event.from_path(),
			to = %event.to_path(),
			listeners = self.inner.listeners.len(),
			"broadcasting navigation"
		);
		self.inner.listeners.emit(&event)
	}
}
