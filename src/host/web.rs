//! [`Host`] implementation on the browser DOM via [`web_sys`].

use super::{Event, Host, HostId, Listener};
use crate::{
	component::{Component, Handle},
	config::Config,
	runtime::Runtime,
};
use core::cell::{Cell, RefCell};
use hashbrown::HashMap;
use js_sys::Reflect;
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue, UnwrapThrowExt};

/// Browser DOM host.
///
/// Listener closures are owned per node and dropped on [`Host::release`],
/// after which the corresponding DOM listeners throw if they are still reachable from JavaScript.
#[derive(Debug)]
pub struct WebHost {
	document: web_sys::Document,
	nodes: RefCell<HashMap<HostId, web_sys::Node>>,
	closures: RefCell<HashMap<HostId, Vec<Closure<dyn Fn(web_sys::Event)>>>>,
	next: Cell<u64>,
}

impl WebHost {
	/// A host for the current window's document.
	///
	/// # Panics
	///
	/// Iff there is no `window.document`.
	#[must_use]
	pub fn new() -> Self {
		let document = web_sys::window()
			.expect_throw("cambium-dom: No global `window` found.")
			.document()
			.expect_throw("cambium-dom: No document found for `window`.");
		Self::for_document(document)
	}

	#[must_use]
	pub fn for_document(document: web_sys::Document) -> Self {
		Self {
			document,
			nodes: RefCell::default(),
			closures: RefCell::default(),
			next: Cell::new(0),
		}
	}

	/// Registers a pre-existing DOM node, i.e. a mount container.
	pub fn adopt(&self, node: web_sys::Node) -> HostId {
		let id = self.mint();
		self.nodes.borrow_mut().insert(id, node);
		id
	}

	/// Adopts the first element matching `selector`.
	#[must_use]
	pub fn query_selector(&self, selector: &str) -> Option<HostId> {
		match self.document.query_selector(selector) {
			Ok(Some(element)) => Some(self.adopt(element.into())),
			Ok(None) => None,
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				None
			}
		}
	}

	/// The DOM node behind `id`.
	#[must_use]
	pub fn node(&self, id: HostId) -> Option<web_sys::Node> {
		self.nodes.borrow().get(&id).cloned()
	}

	fn mint(&self) -> HostId {
		let next = self.next.get() + 1;
		self.next.set(next);
		HostId::new(next)
	}

	fn get(&self, id: HostId) -> Option<web_sys::Node> {
		let node = self.node(id);
		if node.is_none() {
			warn!("Host call on unknown or released node {:?}", id);
		}
		node
	}
}

impl Default for WebHost {
	fn default() -> Self {
		Self::new()
	}
}

/// Reads `event.target.value` if the target has a string `value` (inputs, selects, text areas).
fn convert_event(event: &web_sys::Event, target: HostId) -> Event {
	let value = event
		.target()
		.and_then(|target| Reflect::get(target.as_ref(), &JsValue::from_str("value")).ok())
		.and_then(|value| value.as_string());
	Event {
		name: event.type_(),
		value,
		target: Some(target),
	}
}

impl Host for WebHost {
	fn create_element(&self, tag: &str) -> HostId {
		let element = self.document.create_element(tag).expect_throw("cambium-dom: Failed to create element.");
		self.adopt(element.into())
	}

	fn create_text_node(&self, text: &str) -> HostId {
		let text = self.document.create_text_node(text);
		self.adopt(text.into())
	}

	fn set_attribute(&self, node: HostId, name: &str, value: &str) {
		if let Some(node) = self.get(node) {
			match node.dyn_ref::<web_sys::Element>() {
				Some(element) => {
					if let Err(error) = element.set_attribute(name, value) {
						error!("Could not set attribute {:?}: {:?}", name, error);
					}
				}
				None => error!("Can't set attribute {:?} on non-element {:?}", name, node),
			}
		}
	}

	#[instrument(skip(self, listener))]
	fn add_event_listener(&self, node: HostId, event: &str, listener: Listener) {
		let target = match self.get(node) {
			Some(target) => target,
			None => return,
		};
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			let event = convert_event(&event, node);
			listener(&event);
		}) as Box<dyn Fn(web_sys::Event)>);
		if let Err(error) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
			return error!("Failed to add event listener {:?}: {:?}", event, error);
		}
		self.closures.borrow_mut().entry(node).or_default().push(closure);
		trace!("Created Closure.");
	}

	fn append_child(&self, parent: HostId, child: HostId) {
		if let (Some(parent), Some(child)) = (self.get(parent), self.get(child)) {
			if let Err(error) = parent.append_child(&child) {
				error!("Failed to append child: {:?}", error);
			}
		}
	}

	fn insert_before(&self, parent: HostId, child: HostId, reference: Option<HostId>) {
		let reference = reference.and_then(|reference| self.get(reference));
		if let (Some(parent), Some(child)) = (self.get(parent), self.get(child)) {
			if let Err(error) = parent.insert_before(&child, reference.as_ref()) {
				error!("Failed to insert node: {:?}", error);
			}
		}
	}

	fn remove(&self, node: HostId) {
		if let Some(node) = self.get(node) {
			if let Some(parent) = node.parent_node() {
				if let Err(error) = parent.remove_child(&node) {
					error!("Failed to remove node: {:?}", error);
				}
			}
		}
	}

	fn replace_with(&self, old: HostId, new: HostId) {
		if let (Some(old), Some(new)) = (self.get(old), self.get(new)) {
			match old.parent_node() {
				Some(parent) => {
					if let Err(error) = parent.replace_child(&new, &old) {
						error!("Failed to replace node: {:?}", error);
					}
				}
				None => warn!("Replaced node has no parent: {:?}", old),
			}
		}
	}

	fn release(&self, node: HostId) {
		self.nodes.borrow_mut().remove(&node);
		if let Some(closures) = self.closures.borrow_mut().remove(&node) {
			trace!("Destroyed {} Closure(s).", closures.len());
		}
	}
}

/// Mounts `root` into the first element matching `selector` on the current document.
///
/// The returned runtime must be kept alive for as long as the page is interactive.
///
/// # Panics
///
/// Iff no element matches `selector`.
pub fn start<C: Component>(selector: &str, root: &Handle<C>) -> Rc<Runtime> {
	let host = Rc::new(WebHost::new());
	let container = host
		.query_selector(selector)
		.unwrap_or_else(|| wasm_bindgen::throw_str(&format!("cambium-dom: Nothing matches {:?}.", selector)));
	let runtime = Runtime::new(host, Config::default());
	runtime.mount(container, root);
	runtime
}
