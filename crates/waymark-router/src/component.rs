//! Collaborator traits for the views a slot activates.
//!
//! The router never renders anything itself. A [`Component`] is an opaque
//! handle produced by a route's provider; an [`Outlet`] puts it on screen and
//! takes it off again.

use std::rc::Rc;

use crate::error::RouterResult;
use crate::slot::RouterSlot;

/// Shared handle to an activated component.
pub type ComponentHandle = Rc<dyn Component>;

/// A view a route resolves to.
///
/// Components that host a nested slot create it in [`Component::activated`]
/// and call [`RouterSlot::setup`] with the hosting slot as parent.
pub trait Component: 'static {
	/// Name used in logs.
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	/// Called once the component is mounted and the slot is `Active`.
	///
	/// # Errors
	///
	/// Errors are returned from the navigation that activated the component.
	fn activated(&self, _slot: &RouterSlot) -> RouterResult<()> {
		Ok(())
	}

	/// Called before the component is unmounted.
	fn deactivated(&self) {}

	/// The DOM node an [`ElementOutlet`](crate::platform::browser::ElementOutlet) attaches.
	#[cfg(target_arch = "wasm32")]
	fn dom_node(&self) -> Option<web_sys::Node> {
		None
	}
}

/// Mounts components into the visible surface.
pub trait Outlet {
	/// Puts `component` on screen.
	///
	/// # Errors
	///
	/// A failed mount aborts the activation.
	fn mount(&self, component: &ComponentHandle) -> RouterResult<()>;

	/// Removes `component` from the screen.
	fn unmount(&self, component: &ComponentHandle);
}

/// An outlet without a visible surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutlet;

impl Outlet for NullOutlet {
	fn mount(&self, _component: &ComponentHandle) -> RouterResult<()> {
		Ok(())
	}

	fn unmount(&self, _component: &ComponentHandle) {}
}

impl<O: Outlet + ?Sized> Outlet for Rc<O> {
	fn mount(&self, component: &ComponentHandle) -> RouterResult<()> {
		(**self).mount(component)
	}

	fn unmount(&self, component: &ComponentHandle) {
		(**self).unmount(component)
	}
}
