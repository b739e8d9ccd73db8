//! Anchor click interception.
//!
//! [`AnchorHandler::handle_event`] turns a click on an in-app link into a
//! history push instead of a page load. The click is described by a
//! [`ClickEvent`], so the decision logic runs without a browser; the DOM
//! listener lives in [`platform::browser`](crate::platform).

use std::cell::{Cell, RefCell};
use std::fmt;

use url::Url;

use crate::config::RouterConfig;
use crate::error::RouterResult;
use crate::history::{HistoryBridge, NavigationKind, path_of};
use crate::slot::RouterSlot;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Command on macOS, Windows key elsewhere.
	pub meta: bool,
	/// Control.
	pub ctrl: bool,
	/// Shift.
	pub shift: bool,
	/// Alt/Option.
	pub alt: bool,
}

impl Modifiers {
	/// Returns true if the combination asks the browser for a new tab or window.
	pub fn opens_new_context(&self) -> bool {
		self.meta || self.ctrl || self.shift
	}
}

/// The anchor-like element a click was dispatched through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorTarget {
	/// The `href` attribute, possibly relative.
	pub href: String,
	/// The `target` attribute.
	pub target: Option<String>,
	/// The `data-router-slot` attribute.
	pub router_slot: Option<String>,
	/// Whether the anchor carries a `download` attribute.
	pub download: bool,
}

impl AnchorTarget {
	/// Creates a target for `href` with no other attributes.
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			..Self::default()
		}
	}

	/// Sets the `target` attribute.
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	/// Sets the `data-router-slot` attribute.
	pub fn with_router_slot(mut self, value: impl Into<String>) -> Self {
		self.router_slot = Some(value.into());
		self
	}

	/// Marks the anchor as a download link.
	pub fn with_download(mut self) -> Self {
		self.download = true;
		self
	}

	fn targets_current_frame(&self) -> bool {
		matches!(self.target.as_deref(), None | Some("") | Some("_self"))
	}
}

/// A click as seen by the anchor handler.
pub trait ClickEvent {
	/// The most specific anchor in the dispatch path, if any.
	fn anchor(&self) -> Option<AnchorTarget>;

	/// Modifier keys held during the click.
	fn modifiers(&self) -> Modifiers;

	/// The mouse button; `0` is the primary one.
	fn button(&self) -> i16 {
		0
	}

	/// Whether another handler already prevented the default action.
	fn default_prevented(&self) -> bool;

	/// Prevents the browser's default action.
	fn prevent_default(&self);
}

/// A [`ClickEvent`] built in code.
///
/// ```
/// use waymark_router::{AnchorTarget, ClickEvent, SyntheticClick};
///
/// let click = SyntheticClick::new(AnchorTarget::new("/about"));
/// assert!(!click.default_prevented());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyntheticClick {
	anchor: Option<AnchorTarget>,
	modifiers: Modifiers,
	button: i16,
	prevented: Cell<bool>,
}

impl SyntheticClick {
	/// Creates a primary-button click on `anchor`.
	pub fn new(anchor: AnchorTarget) -> Self {
		Self {
			anchor: Some(anchor),
			..Self::default()
		}
	}

	/// Creates a click that did not hit an anchor.
	pub fn without_anchor() -> Self {
		Self::default()
	}

	/// Sets the held modifiers.
	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}

	/// Sets the mouse button.
	pub fn with_button(mut self, button: i16) -> Self {
		self.button = button;
		self
	}
}

impl ClickEvent for SyntheticClick {
	fn anchor(&self) -> Option<AnchorTarget> {
		self.anchor.clone()
	}

	fn modifiers(&self) -> Modifiers {
		self.modifiers
	}

	fn button(&self) -> i16 {
		self.button
	}

	fn default_prevented(&self) -> bool {
		self.prevented.get()
	}

	fn prevent_default(&self) {
		self.prevented.set(true);
	}
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
	/// No anchor in the dispatch path.
	NoAnchor,
	/// The default action was already prevented.
	AlreadyHandled,
	/// Not the primary mouse button.
	NonPrimaryButton,
	/// The href points to another origin.
	CrossOrigin,
	/// The href does not resolve to a URL.
	InvalidHref,
	/// The anchor targets another frame or window.
	OtherFrame,
	/// The anchor carries the opt-out marker.
	OptedOut,
	/// The anchor is a download link.
	Download,
	/// No slot matches the path.
	NoRouteMatch,
	/// A new-tab or new-window modifier is held.
	ModifierHeld,
}

impl fmt::Display for IgnoreReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let reason = match self {
			Self::NoAnchor => "no anchor",
			Self::AlreadyHandled => "already handled",
			Self::NonPrimaryButton => "non-primary button",
			Self::CrossOrigin => "cross origin",
			Self::InvalidHref => "invalid href",
			Self::OtherFrame => "other frame",
			Self::OptedOut => "opted out",
			Self::Download => "download",
			Self::NoRouteMatch => "no route match",
			Self::ModifierHeld => "modifier held",
		};
		f.write_str(reason)
	}
}

/// Outcome of [`AnchorHandler::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorDecision {
	/// The click was intercepted and `path` pushed.
	Navigated {
		/// Path and query pushed to the history.
		path: String,
	},
	/// The click was left to the browser.
	Ignored(IgnoreReason),
}

impl AnchorDecision {
	/// Returns true if the click was intercepted.
	pub fn is_navigated(&self) -> bool {
		matches!(self, Self::Navigated { .. })
	}
}

/// Decides which clicks become in-app navigations.
#[derive(Debug)]
pub struct AnchorHandler {
	history: HistoryBridge,
	opt_out: String,
	slot: RefCell<Option<RouterSlot>>,
}

impl AnchorHandler {
	/// Creates a handler consulting `slot`.
	pub fn new(slot: &RouterSlot) -> Self {
		let ctx = slot.context();
		Self {
			history: ctx.history().clone(),
			opt_out: ctx.config().anchor_opt_out.clone(),
			slot: RefCell::new(Some(slot.clone())),
		}
	}

	/// Creates a handler without a slot. It ignores every click until
	/// [`Self::set_slot`] is called.
	pub fn detached(history: HistoryBridge, config: &RouterConfig) -> Self {
		Self {
			history,
			opt_out: config.anchor_opt_out.clone(),
			slot: RefCell::new(None),
		}
	}

	/// Replaces the slot consulted for route matches.
	pub fn set_slot(&self, slot: Option<RouterSlot>) {
		*self.slot.borrow_mut() = slot;
	}

	/// Handles a click.
	///
	/// # Errors
	///
	/// Returns errors from the consulted slot or from the push (for example
	/// [`RouterError::NoMatch`](crate::RouterError::NoMatch) raised by a
	/// listener). The default action is already prevented at that point.
	pub fn handle_event(&self, event: &dyn ClickEvent) -> RouterResult<AnchorDecision> {
		let decision = self.decide(event)?;
		let path = match decision {
			Ok(path) => path,
			Err(reason) => {
				tracing::debug!(reason = %reason, "anchor click ignored");
				return Ok(AnchorDecision::Ignored(reason));
			}
		};

		event.prevent_default();
		tracing::debug!(path = %path, "intercepted anchor click");
		self.history.navigate(&path, NavigationKind::Push)?;
		Ok(AnchorDecision::Navigated { path })
	}

	fn decide(&self, event: &dyn ClickEvent) -> RouterResult<Result<String, IgnoreReason>> {
		let Some(anchor) = event.anchor() else {
			return Ok(Err(IgnoreReason::NoAnchor));
		};
		if event.default_prevented() {
			return Ok(Err(IgnoreReason::AlreadyHandled));
		}
		if event.button() != 0 {
			return Ok(Err(IgnoreReason::NonPrimaryButton));
		}

		let location = self.history.location()?;
		let Ok(url) = Url::options().base_url(Some(&location)).parse(&anchor.href) else {
			return Ok(Err(IgnoreReason::InvalidHref));
		};
		if url.origin() != location.origin() {
			return Ok(Err(IgnoreReason::CrossOrigin));
		}
		if !anchor.targets_current_frame() {
			return Ok(Err(IgnoreReason::OtherFrame));
		}
		if anchor.router_slot.as_deref() == Some(self.opt_out.as_str()) {
			return Ok(Err(IgnoreReason::OptedOut));
		}
		if anchor.download {
			return Ok(Err(IgnoreReason::Download));
		}

		let slot = self.slot.borrow().clone();
		let matched = match slot {
			Some(slot) => slot.get_route_match(url.path())?,
			None => false,
		};
		if !matched {
			return Ok(Err(IgnoreReason::NoRouteMatch));
		}
		if event.modifiers().opens_new_context() {
			return Ok(Err(IgnoreReason::ModifierHeld));
		}

		Ok(Ok(path_of(&url)))
	}
}
