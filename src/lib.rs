//! # Waymark
//!
//! Client-side navigation for single-page applications.
//!
//! Waymark resolves in-app URLs to components through nested router slots,
//! keeps one shared history stack in sync with the active views, and turns
//! clicks on in-app links into history pushes.
//!
//! The implementation lives in [`waymark_router`]; this crate re-exports it
//! and offers a [`prelude`].
//!
//! ## Quick Start
//!
//! ```
//! use futures::executor::LocalPool;
//! use waymark::prelude::*;
//!
//! struct Home;
//! impl Component for Home {}
//!
//! let pool = LocalPool::new();
//! let history = HistoryBridge::memory("http://localhost/").unwrap();
//! let ctx = RouterContext::new(history, pool.spawner(), RouterConfig::default()).unwrap();
//!
//! let slot = RouterSlot::new(ctx, NullOutlet);
//! slot.setup([Route::new("**").component(|| Home)], None).unwrap();
//! assert_eq!(slot.state(), SlotState::Active);
//! ```

pub use waymark_router as router;
pub use waymark_router::*;

/// Commonly used types.
pub mod prelude {
	pub use waymark_router::{
		AnchorDecision, AnchorHandler, AnchorTarget, Component, ComponentHandle, HistoryBridge,
		Loadable, NavigationEvent, NavigationKind, NullOutlet, Outlet, Route, RouterConfig,
		RouterContext, RouterError, RouterLink, RouterResult, RouterSlot, SlotEvent, SlotState,
		SyntheticClick,
	};
}
