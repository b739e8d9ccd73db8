//! Ordered listener lists with RAII unsubscription.
//!
//! Listeners run in subscription order. Emission works on a snapshot, so a
//! listener may subscribe or unsubscribe others while it runs: a listener
//! removed during an emission is skipped if it has not run yet, and one added
//! during an emission first runs on the next one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::RouterResult;

type Callback<E> = Rc<dyn Fn(&E) -> RouterResult<()>>;

struct Entry<E> {
	id: u64,
	active: Rc<Cell<bool>>,
	callback: Callback<E>,
}

impl<E> Clone for Entry<E> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			active: Rc::clone(&self.active),
			callback: Rc::clone(&self.callback),
		}
	}
}

struct Inner<E> {
	entries: Vec<Entry<E>>,
	next_id: u64,
}

/// A list of listeners for events of type `E`.
pub struct Listeners<E> {
	inner: Rc<RefCell<Inner<E>>>,
}

impl<E> Clone for Listeners<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<E> Default for Listeners<E> {
	fn default() -> Self {
		Self {
			inner: Rc::new(RefCell::new(Inner {
				entries: Vec::new(),
				next_id: 0,
			})),
		}
	}
}

impl<E: 'static> fmt::Debug for Listeners<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listeners").field("len", &self.len()).finish()
	}
}

impl<E: 'static> Listeners<E> {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a listener. It stays registered until the returned
	/// [`Subscription`] is dropped or unsubscribed.
	pub fn subscribe<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&E) -> RouterResult<()> + 'static,
	{
		let active = Rc::new(Cell::new(true));
		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = inner.next_id;
			inner.next_id += 1;
			inner.entries.push(Entry {
				id,
				active: Rc::clone(&active),
				callback: Rc::new(callback),
			});
			id
		};

		let weak: Weak<RefCell<Inner<E>>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			active.set(false);
			if let Some(inner) = weak.upgrade() {
				inner.borrow_mut().entries.retain(|entry| entry.id != id);
			}
		})
	}

	/// Calls every listener in order.
	///
	/// All listeners run even if one fails; the first error is returned.
	pub fn emit(&self, event: &E) -> RouterResult<()> {
		let snapshot: Vec<Entry<E>> = self.inner.borrow().entries.clone();
		let mut first_error = None;
		for entry in snapshot {
			if !entry.active.get() {
				continue;
			}
			if let Err(err) = (entry.callback)(event) {
				tracing::warn!(error = %err, "listener failed");
				first_error.get_or_insert(err);
			}
		}
		first_error.map_or(Ok(()), Err)
	}

	/// Returns the number of registered listeners.
	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	/// Returns true if no listener is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
	dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Creates a subscription that runs `dispose` once when released.
	pub fn new<F>(dispose: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			dispose: Some(Box::new(dispose)),
		}
	}

	/// Releases the listener now.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(dispose) = self.dispose.take() {
			dispose();
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.dispose.is_some())
			.finish()
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}
