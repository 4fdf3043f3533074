//! A host document kept in memory.
//!
//! Records every call it receives, which makes it the host of choice for tests and headless rendering.

use super::{Event, Host, HostId, Listener};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter, Write as _},
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

/// One recorded [`Host`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
	CreateElement(HostId, String),
	CreateText(HostId, String),
	SetAttribute(HostId, String, String),
	AddEventListener(HostId, String),
	AppendChild { parent: HostId, child: HostId },
	InsertBefore { parent: HostId, child: HostId, reference: Option<HostId> },
	Remove(HostId),
	ReplaceWith { old: HostId, new: HostId },
	Release(HostId),
}
impl Op {
	#[must_use]
	pub fn is_creation(&self) -> bool {
		matches!(self, Op::CreateElement(..) | Op::CreateText(..))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNodeKind {
	Element { tag: String, attributes: Vec<(String, String)> },
	Text(String),
}

struct MemoryNode {
	kind: MemoryNodeKind,
	parent: Option<HostId>,
	children: Vec<HostId>,
	listeners: Vec<(String, Listener)>,
}

#[derive(Default)]
struct Inner {
	nodes: HashMap<HostId, MemoryNode>,
	next: u64,
	ops: Vec<Op>,
}
impl Inner {
	fn create(&mut self, kind: MemoryNodeKind) -> HostId {
		self.next += 1;
		let id = HostId::new(self.next);
		self.nodes.insert(
			id,
			MemoryNode {
				kind,
				parent: None,
				children: Vec::new(),
				listeners: Vec::new(),
			},
		);
		id
	}

	fn node_mut(&mut self, id: HostId) -> Option<&mut MemoryNode> {
		let node = self.nodes.get_mut(&id);
		if node.is_none() {
			warn!("Host call on unknown or released node {:?}", id);
		}
		node
	}

	fn unlink(&mut self, child: HostId) -> Option<(HostId, usize)> {
		let parent = self.nodes.get_mut(&child)?.parent.take()?;
		let siblings = &mut self.nodes.get_mut(&parent)?.children;
		let index = siblings.iter().position(|&c| c == child)?;
		siblings.remove(index);
		Some((parent, index))
	}

	fn insert(&mut self, parent: HostId, child: HostId, index: Option<usize>) {
		self.unlink(child);
		if let Some(node) = self.node_mut(parent) {
			match index {
				Some(index) => node.children.insert(index.min(node.children.len()), child),
				None => node.children.push(child),
			}
		}
		if let Some(node) = self.node_mut(child) {
			node.parent = Some(parent);
		}
	}
}

/// In-memory [`Host`].
#[derive(Default)]
pub struct MemoryHost {
	inner: RefCell<Inner>,
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// A copy of all calls so far.
	#[must_use]
	pub fn ops(&self) -> Vec<Op> {
		self.inner.borrow().ops.clone()
	}

	/// Returns and forgets all calls so far.
	pub fn take_ops(&self) -> Vec<Op> {
		core::mem::take(&mut self.inner.borrow_mut().ops)
	}

	/// Whether `node` was created and not released yet.
	#[must_use]
	pub fn is_live(&self, node: HostId) -> bool {
		self.inner.borrow().nodes.contains_key(&node)
	}

	#[must_use]
	pub fn live_count(&self) -> usize {
		self.inner.borrow().nodes.len()
	}

	#[must_use]
	pub fn kind(&self, node: HostId) -> Option<MemoryNodeKind> {
		self.inner.borrow().nodes.get(&node).map(|n| n.kind.clone())
	}

	#[must_use]
	pub fn parent(&self, node: HostId) -> Option<HostId> {
		self.inner.borrow().nodes.get(&node).and_then(|n| n.parent)
	}

	#[must_use]
	pub fn children(&self, node: HostId) -> Vec<HostId> {
		self.inner.borrow().nodes.get(&node).map(|n| n.children.clone()).unwrap_or_default()
	}

	#[must_use]
	pub fn attribute(&self, node: HostId, name: &str) -> Option<String> {
		match &self.inner.borrow().nodes.get(&node)?.kind {
			MemoryNodeKind::Element { attributes, .. } => attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()),
			MemoryNodeKind::Text(_) => None,
		}
	}

	/// Depth-first search below (and including) `root` for an element with the attribute `name="value"`.
	#[must_use]
	pub fn find_by_attribute(&self, root: HostId, name: &str, value: &str) -> Option<HostId> {
		if self.attribute(root, name).as_deref() == Some(value) {
			return Some(root);
		}
		self.children(root).into_iter().find_map(|child| self.find_by_attribute(child, name, value))
	}

	/// Elements named `tag` below (and including) `root`, in document order.
	#[must_use]
	pub fn find_all(&self, root: HostId, tag: &str) -> Vec<HostId> {
		let mut found = Vec::new();
		if let Some(MemoryNodeKind::Element { tag: t, .. }) = self.kind(root) {
			if t == tag {
				found.push(root);
			}
		}
		for child in self.children(root) {
			found.extend(self.find_all(child, tag));
		}
		found
	}

	/// Fires the listeners registered on `node` for `event.name`, in attachment order.
	///
	/// Returns how many listeners ran.
	pub fn dispatch(&self, node: HostId, mut event: Event) -> usize {
		event.target = Some(node);
		let listeners: Vec<Listener> = match self.inner.borrow().nodes.get(&node) {
			Some(n) => n.listeners.iter().filter(|(name, _)| *name == event.name).map(|(_, l)| Rc::clone(l)).collect(),
			None => {
				warn!("Dispatch to unknown or released node {:?}", node);
				return 0;
			}
		};
		trace!("Dispatching {:?} to {} listener(s).", event.name, listeners.len());
		for listener in &listeners {
			listener(&event);
		}
		listeners.len()
	}

	/// Serializes `node` with its subtree. Every element gets an explicit end tag.
	#[must_use]
	pub fn to_html(&self, node: HostId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	/// Serializes only the children of `node`.
	#[must_use]
	pub fn inner_html(&self, node: HostId) -> String {
		let mut html = String::new();
		for child in self.children(node) {
			self.write_html(child, &mut html);
		}
		html
	}

	fn write_html(&self, node: HostId, html: &mut String) {
		match self.kind(node) {
			None => {}
			Some(MemoryNodeKind::Text(text)) => html.push_str(&escape(&text, false)),
			Some(MemoryNodeKind::Element { tag, attributes }) => {
				html.push('<');
				html.push_str(&tag);
				for (name, value) in &attributes {
					let _ = write!(html, " {}=\"{}\"", name, escape(value, true));
				}
				html.push('>');
				for child in self.children(node) {
					self.write_html(child, html);
				}
				let _ = write!(html, "</{}>", tag);
			}
		}
	}
}

fn escape(text: &str, attribute: bool) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' if attribute => escaped.push_str("&quot;"),
			c => escaped.push(c),
		}
	}
	escaped
}

impl Debug for MemoryHost {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("MemoryHost").field("live", &inner.nodes.len()).field("ops", &inner.ops.len()).finish()
	}
}

impl Host for MemoryHost {
	fn create_element(&self, tag: &str) -> HostId {
		let mut inner = self.inner.borrow_mut();
		let id = inner.create(MemoryNodeKind::Element {
			tag: tag.to_owned(),
			attributes: Vec::new(),
		});
		inner.ops.push(Op::CreateElement(id, tag.to_owned()));
		id
	}

	fn create_text_node(&self, text: &str) -> HostId {
		let mut inner = self.inner.borrow_mut();
		let id = inner.create(MemoryNodeKind::Text(text.to_owned()));
		inner.ops.push(Op::CreateText(id, text.to_owned()));
		id
	}

	fn set_attribute(&self, node: HostId, name: &str, value: &str) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::SetAttribute(node, name.to_owned(), value.to_owned()));
		if let Some(MemoryNode {
			kind: MemoryNodeKind::Element { attributes, .. },
			..
		}) = inner.node_mut(node)
		{
			match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, v)) => *v = value.to_owned(),
				None => attributes.push((name.to_owned(), value.to_owned())),
			}
		}
	}

	fn add_event_listener(&self, node: HostId, event: &str, listener: Listener) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::AddEventListener(node, event.to_owned()));
		if let Some(node) = inner.node_mut(node) {
			node.listeners.push((event.to_owned(), listener));
		}
	}

	fn append_child(&self, parent: HostId, child: HostId) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::AppendChild { parent, child });
		inner.insert(parent, child, None);
	}

	fn insert_before(&self, parent: HostId, child: HostId, reference: Option<HostId>) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::InsertBefore { parent, child, reference });
		inner.unlink(child);
		let index = reference.and_then(|reference| inner.nodes.get(&parent)?.children.iter().position(|&c| c == reference));
		if reference.is_some() && index.is_none() {
			warn!("Reference node {:?} is not a child of {:?}; appending instead.", reference, parent);
		}
		inner.insert(parent, child, index);
	}

	fn remove(&self, node: HostId) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::Remove(node));
		inner.unlink(node);
	}

	fn replace_with(&self, old: HostId, new: HostId) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::ReplaceWith { old, new });
		match inner.unlink(old) {
			Some((parent, index)) => inner.insert(parent, new, Some(index)),
			None => warn!("Replaced node {:?} had no parent.", old),
		}
	}

	fn release(&self, node: HostId) {
		let mut inner = self.inner.borrow_mut();
		inner.ops.push(Op::Release(node));
		if let Some(released) = inner.nodes.remove(&node) {
			if let Some(parent) = released.parent {
				if let Some(parent) = inner.nodes.get_mut(&parent) {
					parent.children.retain(|&c| c != node);
				}
			}
		}
	}
}
