//! Client-side router slots for single-page applications.
//!
//! This crate resolves in-app URLs to components, keeps the history stack in
//! sync with the active view, and turns clicks on in-app links into history
//! pushes instead of page loads.
//!
//! ## Building blocks
//!
//! - [`PathPattern`]: literal, regular expression, and catch-all (`**`) patterns
//! - [`Route`] / [`RouteTable`]: ordered routes, first match wins
//! - [`HistoryBridge`]: the one place the history stack is mutated; broadcasts
//!   a [`NavigationEvent`] to every subscriber
//! - [`RouterSlot`]: the navigation state machine, nestable
//! - [`AnchorHandler`]: decides which link clicks become navigations
//!
//! ## Example
//!
//! ```
//! use futures::executor::LocalPool;
//! use waymark_router::{
//!     Component, HistoryBridge, NullOutlet, Route, RouterConfig, RouterContext, RouterSlot,
//! };
//!
//! struct Home;
//! impl Component for Home {}
//!
//! struct About;
//! impl Component for About {}
//!
//! let pool = LocalPool::new();
//! let history = HistoryBridge::memory("http://localhost/").unwrap();
//! let ctx = RouterContext::new(history.clone(), pool.spawner(), RouterConfig::default()).unwrap();
//!
//! let slot = RouterSlot::new(ctx, NullOutlet);
//! slot.setup(
//!     [
//!         Route::new("about").component(|| About),
//!         Route::new("**").component(|| Home),
//!     ],
//!     None,
//! )
//! .unwrap();
//!
//! history.push("/about").unwrap();
//! assert!(slot.active_component().unwrap().name().ends_with("About"));
//! ```
//!
//! ## Platform
//!
//! Browser bindings (`BrowserHistory`, popstate and click listeners,
//! `ElementOutlet`, `WasmSpawner`) live in [`platform`] and are only
//! compiled for `wasm32`.

pub mod anchor;
pub mod component;
pub mod config;
pub mod error;
pub mod history;
pub mod link;
pub mod listeners;
pub mod pattern;
pub mod platform;
pub mod route;
pub mod slot;
pub mod table;

pub use anchor::{
	AnchorDecision, AnchorHandler, AnchorTarget, ClickEvent, IgnoreReason, Modifiers,
	SyntheticClick,
};
pub use component::{Component, ComponentHandle, NullOutlet, Outlet};
pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use history::{
	HistoryBackend, HistoryBridge, MemoryHistory, NavigationEvent, NavigationKind, PopDelivery,
};
pub use link::RouterLink;
pub use listeners::{Listeners, Subscription};
pub use pattern::{
	CATCH_ALL, LiteralPattern, MatchResult, PathMatch, PathPattern, match_path, normalize_path,
};
pub use route::{
	ComponentFuture, ComponentProvider, Loadable, Resolver, Route, RouteGuard, RouteId,
};
pub use slot::{ResolutionToken, RouterContext, RouterSlot, SlotEvent, SlotState};
pub use table::{RouteMatch, RouteTable};
