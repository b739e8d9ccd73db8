//! Browser tests for the History API backend and DOM outlet
//!
//! Run with `wasm-pack test --headless --chrome crates/waymark-router`.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use waymark_router::platform::browser::{BrowserHistory, BrowserRuntime, ElementOutlet, WasmSpawner};
use waymark_router::{
	Component, HistoryBackend, HistoryBridge, Route, RouterConfig, RouterContext, RouterSlot,
	SlotState,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

struct Page {
	name: &'static str,
	node: web_sys::Element,
}

impl Page {
	fn new(name: &'static str) -> Self {
		let document = web_sys::window().unwrap().document().unwrap();
		let node = document.create_element("section").unwrap();
		node.set_id(name);
		Self { name, node }
	}
}

impl Component for Page {
	fn name(&self) -> &str {
		self.name
	}

	fn dom_node(&self) -> Option<web_sys::Node> {
		Some(self.node.clone().into())
	}
}

fn pathname() -> String {
	web_sys::window().unwrap().location().pathname().unwrap()
}

#[wasm_bindgen_test]
fn test_push_and_replace_update_location() {
	let history = BrowserHistory::new().unwrap();

	history.push("/waymark/pushed?tab=1").unwrap();
	assert_eq!(pathname(), "/waymark/pushed");
	assert_eq!(history.location().unwrap().query(), Some("tab=1"));

	history.replace("replaced").unwrap();
	assert_eq!(pathname(), "/waymark/replaced");
}

#[wasm_bindgen_test]
fn test_bridge_broadcasts_browser_navigation() {
	let bridge = HistoryBridge::new(BrowserHistory::new().unwrap());
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&seen);
	let _sub = bridge.subscribe(move |event| {
		sink.borrow_mut().push(event.to_path().to_string());
		Ok(())
	});

	bridge.push("/waymark/events").unwrap();
	assert_eq!(*seen.borrow(), vec!["/waymark/events"]);
}

#[wasm_bindgen_test]
fn test_slot_mounts_components_into_element() {
	let document = web_sys::window().unwrap().document().unwrap();
	let host = document.create_element("main").unwrap();

	let history = HistoryBridge::new(BrowserHistory::new().unwrap());
	history.replace("/waymark/home").unwrap();
	let ctx = RouterContext::new(history.clone(), WasmSpawner, RouterConfig::default()).unwrap();
	let slot = RouterSlot::new(ctx, ElementOutlet::new(host.clone()));
	slot.setup(
		[
			Route::new("waymark/home").component(|| Page::new("home")),
			Route::new("waymark/about").component(|| Page::new("about")),
		],
		None,
	)
	.unwrap();
	assert_eq!(slot.state(), SlotState::Active);
	assert_eq!(host.first_element_child().unwrap().id(), "home");

	history.push("/waymark/about").unwrap();
	assert_eq!(host.child_element_count(), 1);
	assert_eq!(host.first_element_child().unwrap().id(), "about");
}

#[wasm_bindgen_test]
fn test_runtime_installs_global_bridge() {
	let runtime = BrowserRuntime::install(RouterConfig::default()).unwrap();
	let global = HistoryBridge::global().unwrap();
	assert!(runtime.context().history().ptr_eq(&global));

	let slot = RouterSlot::new(runtime.context().clone(), waymark_router::NullOutlet);
	slot.setup([Route::new("**").component(|| Page::new("any"))], None)
		.unwrap();
	let _clicks = runtime.intercept_clicks(&slot).unwrap();

	global.push("/waymark/anywhere").unwrap();
	assert_eq!(slot.match_result().unwrap().consumed(), "waymark/anywhere");
}
