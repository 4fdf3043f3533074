//! The host document boundary.
//!
//! Virtual nodes only ever see opaque [`HostId`]s; each [`Host`] maps them onto its native nodes.

use std::rc::Rc;

pub mod memory;
pub mod web;

/// Opaque handle to a host-side node, minted by the [`Host`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(u64);
impl HostId {
	#[must_use]
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	#[must_use]
	pub const fn raw(self) -> u64 {
		self.0
	}
}

/// A host event, converted into the shape handlers expect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
	/// The event type, i.e. `"click"`.
	pub name: String,
	/// The target's current `value`, for form controls.
	pub value: Option<String>,
	pub target: Option<HostId>,
}
impl Event {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}
}

/// Callback attached to a host node.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Native document operations the engine depends on.
///
/// All methods take `&self`: listeners may call back into the engine (and through it into the host) while the host is dispatching.
pub trait Host {
	fn create_element(&self, tag: &str) -> HostId;
	fn create_text_node(&self, text: &str) -> HostId;
	fn set_attribute(&self, node: HostId, name: &str, value: &str);
	fn add_event_listener(&self, node: HostId, event: &str, listener: Listener);
	fn append_child(&self, parent: HostId, child: HostId);
	/// Inserts `child` before `reference`, or at the end if `reference` is `None`.
	fn insert_before(&self, parent: HostId, child: HostId, reference: Option<HostId>);
	/// Takes `node` out of the document.
	fn remove(&self, node: HostId);
	fn replace_with(&self, old: HostId, new: HostId);
	/// Drops host-side resources associated with `node` (i.e. its listeners).
	///
	/// Called once for every node of a subtree that was removed or replaced. `node` is never used again afterwards.
	fn release(&self, node: HostId);
}
