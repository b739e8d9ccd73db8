//! Browser bindings: History API backend, popstate and click listeners,
//! DOM outlet, and a `spawn_local` spawner.

use std::rc::Rc;

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlAnchorElement, MouseEvent, Window};

use crate::anchor::{AnchorHandler, AnchorTarget, ClickEvent, Modifiers};
use crate::component::{ComponentHandle, Outlet};
use crate::config::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::history::{HistoryBackend, HistoryBridge, PopDelivery};
use crate::slot::{RouterContext, RouterSlot};

fn window() -> RouterResult<Window> {
	web_sys::window().ok_or_else(|| RouterError::History("no window available".to_string()))
}

fn document() -> RouterResult<Document> {
	window()?
		.document()
		.ok_or_else(|| RouterError::History("no document available".to_string()))
}

fn js_error(context: &str, err: JsValue) -> RouterError {
	RouterError::History(format!("{}: {:?}", context, err))
}

/// [`HistoryBackend`] over `window.history` and `window.location`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	window: Window,
}

impl BrowserHistory {
	/// Binds to the current window.
	pub fn new() -> RouterResult<Self> {
		Ok(Self { window: window()? })
	}

	fn history(&self) -> RouterResult<web_sys::History> {
		self.window
			.history()
			.map_err(|e| js_error("failed to access history", e))
	}

	fn resolve(&self, path: &str) -> RouterResult<Url> {
		Ok(self.location()?.join(path)?)
	}
}

impl HistoryBackend for BrowserHistory {
	fn location(&self) -> RouterResult<Url> {
		let href = self
			.window
			.location()
			.href()
			.map_err(|e| js_error("failed to read location", e))?;
		Ok(Url::parse(&href)?)
	}

	fn push(&self, path: &str) -> RouterResult<()> {
		let url = self.resolve(path)?;
		self.history()?
			.push_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
			.map_err(|e| js_error("pushState failed", e))
	}

	fn replace(&self, path: &str) -> RouterResult<()> {
		let url = self.resolve(path)?;
		self.history()?
			.replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
			.map_err(|e| js_error("replaceState failed", e))
	}

	fn go(&self, delta: i32) -> RouterResult<PopDelivery> {
		self.history()?
			.go_with_delta(delta)
			.map_err(|e| js_error("history.go failed", e))?;
		Ok(PopDelivery::Deferred)
	}
}

/// Forwards `popstate` events to a bridge. Removes itself on drop.
pub struct PopStateListener {
	window: Window,
	closure: Closure<dyn FnMut(Event)>,
}

impl PopStateListener {
	/// Starts forwarding back/forward moves to `history`.
	pub fn attach(history: &HistoryBridge) -> RouterResult<Self> {
		let window = window()?;
		let bridge = history.clone();
		let closure = Closure::wrap(Box::new(move |_event: Event| {
			if let Err(err) = bridge.notify_pop() {
				tracing::warn!(error = %err, "popstate navigation failed");
			}
		}) as Box<dyn FnMut(Event)>);

		window
			.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			.map_err(|e| js_error("failed to add popstate listener", e))?;
		Ok(Self { window, closure })
	}
}

impl Drop for PopStateListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("popstate", self.closure.as_ref().unchecked_ref());
	}
}

/// A DOM click seen through [`ClickEvent`].
pub struct DomClick {
	event: MouseEvent,
}

impl DomClick {
	/// Wraps a mouse event.
	pub fn new(event: MouseEvent) -> Self {
		Self { event }
	}

	/// Finds the anchor through shadow roots via `composedPath()`, falling
	/// back to the event target.
	fn anchor_element(&self) -> Option<HtmlAnchorElement> {
		self.event
			.composed_path()
			.iter()
			.find_map(|node| node.dyn_into::<HtmlAnchorElement>().ok())
			.or_else(|| {
				self.event
					.target()
					.and_then(|target| target.dyn_into::<HtmlAnchorElement>().ok())
			})
	}
}

impl ClickEvent for DomClick {
	fn anchor(&self) -> Option<AnchorTarget> {
		let anchor = self.anchor_element()?;
		let target = anchor.target();
		Some(AnchorTarget {
			href: anchor.href(),
			target: (!target.is_empty()).then_some(target),
			router_slot: anchor.get_attribute("data-router-slot"),
			download: anchor.has_attribute("download"),
		})
	}

	fn modifiers(&self) -> Modifiers {
		Modifiers {
			meta: self.event.meta_key(),
			ctrl: self.event.ctrl_key(),
			shift: self.event.shift_key(),
			alt: self.event.alt_key(),
		}
	}

	fn button(&self) -> i16 {
		self.event.button()
	}

	fn default_prevented(&self) -> bool {
		self.event.default_prevented()
	}

	fn prevent_default(&self) {
		self.event.prevent_default();
	}
}

/// Runs an [`AnchorHandler`] on every document click. Removes itself on drop.
pub struct DocumentClickListener {
	document: Document,
	closure: Closure<dyn FnMut(MouseEvent)>,
}

impl DocumentClickListener {
	/// Starts intercepting document clicks.
	pub fn attach(handler: Rc<AnchorHandler>) -> RouterResult<Self> {
		let document = document()?;
		let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
			if let Err(err) = handler.handle_event(&DomClick::new(event)) {
				tracing::warn!(error = %err, "anchor navigation failed");
			}
		}) as Box<dyn FnMut(MouseEvent)>);

		document
			.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
			.map_err(|e| js_error("failed to add click listener", e))?;
		Ok(Self { document, closure })
	}
}

impl Drop for DocumentClickListener {
	fn drop(&mut self) {
		let _ = self
			.document
			.remove_event_listener_with_callback("click", self.closure.as_ref().unchecked_ref());
	}
}

/// Spawns component loads with `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
	fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
		wasm_bindgen_futures::spawn_local(future);
		Ok(())
	}
}

/// Mounts each component's DOM node under a host element.
#[derive(Debug, Clone)]
pub struct ElementOutlet {
	host: Element,
}

impl ElementOutlet {
	/// Uses `host` as the mount point.
	pub fn new(host: Element) -> Self {
		Self { host }
	}
}

impl Outlet for ElementOutlet {
	fn mount(&self, component: &ComponentHandle) -> RouterResult<()> {
		if let Some(node) = component.dom_node() {
			self.host
				.append_child(&node)
				.map_err(|e| js_error("failed to mount component", e))?;
		}
		Ok(())
	}

	fn unmount(&self, component: &ComponentHandle) {
		if let Some(node) = component.dom_node()
			&& self.host.contains(Some(&node))
		{
			let _ = self.host.remove_child(&node);
		}
	}
}

/// The browser wiring for a tree of slots.
pub struct BrowserRuntime {
	context: RouterContext,
	_popstate: PopStateListener,
}

impl BrowserRuntime {
	/// Installs a `window.history` bridge as the global bridge and starts
	/// listening for `popstate`.
	pub fn install(config: RouterConfig) -> RouterResult<Self> {
		let history = HistoryBridge::new(BrowserHistory::new()?);
		HistoryBridge::set_global(history.clone());
		let popstate = PopStateListener::attach(&history)?;
		let context = RouterContext::new(history, WasmSpawner, config)?;
		Ok(Self {
			context,
			_popstate: popstate,
		})
	}

	/// Returns the context for root slots.
	pub fn context(&self) -> &RouterContext {
		&self.context
	}

	/// Intercepts document clicks for `slot`.
	pub fn intercept_clicks(&self, slot: &RouterSlot) -> RouterResult<DocumentClickListener> {
		DocumentClickListener::attach(Rc::new(AnchorHandler::new(slot)))
	}
}
