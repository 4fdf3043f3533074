//! The virtual node arena and the splicing primitives operating on it.
//!
//! All parent/child/sibling links are [`NodeId`]s into one [`Tree`].
//! Every mutation below keeps the four-pointer invariant intact:
//! if `a.next_sibling == b` then `b.prev_sibling == a`,
//! and a node without previous sibling is its parent's `first_child` (likewise for `last_child`).

use crate::{
	error::{fatal, TreeDefect, Violation},
	host::{HostId, Listener},
};
use core::{
	convert::TryFrom,
	fmt::{self, Debug, Formatter},
	ops::{Index, IndexMut},
};
use hashbrown::HashSet;

/// Index of a [`VirtualNode`] in its [`Tree`].
///
/// The generation makes ids of released nodes permanently invalid, even after their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
	index: u32,
	generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Element { tag: String, attributes: Vec<Attribute> },
	Text(String),
}

/// An event name and the handler that is attached for it on materialization.
#[derive(Clone)]
pub struct EventRecord {
	pub name: String,
	pub handler: Listener,
}
impl EventRecord {
	pub fn new(name: impl Into<String>, handler: Listener) -> Self {
		Self { name: name.into(), handler }
	}
}
impl Debug for EventRecord {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventRecord").field("name", &self.name).finish_non_exhaustive()
	}
}

#[derive(Debug)]
pub struct VirtualNode {
	pub(crate) kind: NodeKind,
	pub(crate) events: Vec<EventRecord>,
	pub(crate) parent: Option<NodeId>,
	pub(crate) first_child: Option<NodeId>,
	pub(crate) last_child: Option<NodeId>,
	pub(crate) prev_sibling: Option<NodeId>,
	pub(crate) next_sibling: Option<NodeId>,
	pub(crate) host: Option<HostId>,
}
impl VirtualNode {
	fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			events: Vec::new(),
			parent: None,
			first_child: None,
			last_child: None,
			prev_sibling: None,
			next_sibling: None,
			host: None,
		}
	}

	#[must_use]
	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	/// The tag name, for elements.
	#[must_use]
	pub fn tag(&self) -> Option<&str> {
		match &self.kind {
			NodeKind::Element { tag, .. } => Some(tag),
			NodeKind::Text(_) => None,
		}
	}

	/// The literal text, for text nodes.
	#[must_use]
	pub fn text(&self) -> Option<&str> {
		match &self.kind {
			NodeKind::Text(text) => Some(text),
			NodeKind::Element { .. } => None,
		}
	}

	/// Attributes in document order. Always empty for text nodes.
	#[must_use]
	pub fn attributes(&self) -> &[Attribute] {
		match &self.kind {
			NodeKind::Element { attributes, .. } => attributes,
			NodeKind::Text(_) => &[],
		}
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes().iter().find(|a| a.name == name).map(|a| a.value.as_str())
	}

	pub(crate) fn take_attribute(&mut self, index: usize) -> Option<Attribute> {
		match &mut self.kind {
			NodeKind::Element { attributes, .. } if index < attributes.len() => Some(attributes.remove(index)),
			_ => None,
		}
	}

	/// Bound events in attachment order.
	#[must_use]
	pub fn events(&self) -> &[EventRecord] {
		&self.events
	}

	#[must_use]
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}
	#[must_use]
	pub fn first_child(&self) -> Option<NodeId> {
		self.first_child
	}
	#[must_use]
	pub fn last_child(&self) -> Option<NodeId> {
		self.last_child
	}
	#[must_use]
	pub fn prev_sibling(&self) -> Option<NodeId> {
		self.prev_sibling
	}
	#[must_use]
	pub fn next_sibling(&self) -> Option<NodeId> {
		self.next_sibling
	}

	/// The materialized counterpart, if any.
	#[must_use]
	pub fn host(&self) -> Option<HostId> {
		self.host
	}
}

#[derive(Debug)]
struct Slot {
	generation: u32,
	node: Option<VirtualNode>,
}

/// Arena owning every [`VirtualNode`] of a runtime.
#[derive(Debug, Default)]
pub struct Tree {
	slots: Vec<Slot>,
	free: Vec<u32>,
	live: usize,
}

impl Tree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of live nodes.
	#[must_use]
	pub fn len(&self) -> usize {
		self.live
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.live == 0
	}

	fn alloc(&mut self, node: VirtualNode) -> NodeId {
		self.live += 1;
		if let Some(index) = self.free.pop() {
			let slot = &mut self.slots[index as usize];
			slot.node = Some(node);
			NodeId { index, generation: slot.generation }
		} else {
			let index = u32::try_from(self.slots.len()).expect("more than u32::MAX virtual nodes");
			self.slots.push(Slot { generation: 0, node: Some(node) });
			NodeId { index, generation: 0 }
		}
	}

	pub fn create_element(&mut self, tag: impl Into<String>, attributes: Vec<Attribute>) -> NodeId {
		self.alloc(VirtualNode::new(NodeKind::Element { tag: tag.into(), attributes }))
	}

	pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
		self.alloc(VirtualNode::new(NodeKind::Text(text.into())))
	}

	#[must_use]
	pub fn get(&self, id: NodeId) -> Option<&VirtualNode> {
		self.slots
			.get(id.index as usize)
			.filter(|slot| slot.generation == id.generation)
			.and_then(|slot| slot.node.as_ref())
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut VirtualNode> {
		self.slots
			.get_mut(id.index as usize)
			.filter(|slot| slot.generation == id.generation)
			.and_then(|slot| slot.node.as_mut())
	}

	#[must_use]
	pub fn contains(&self, id: NodeId) -> bool {
		self.get(id).is_some()
	}

	/// Iterates the direct children of `parent` in order.
	#[must_use]
	pub fn children(&self, parent: NodeId) -> Children<'_> {
		Children { tree: self, next: self[parent].first_child }
	}

	/// `root` and all its descendants, depth-first in document order.
	#[must_use]
	pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
		let mut order = Vec::new();
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			order.push(id);
			let first = stack.len();
			stack.extend(self.children(id));
			stack[first..].reverse();
		}
		order
	}

	pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
		let last = self[parent].last_child;
		self.move_run(Some(parent), last, None, &[child]);
	}

	/// Replaces `anchor` with the sibling run `subtree`, in order.
	///
	/// Covers an anchor with both neighbours (`prev → first(subtree)`, `last(subtree) → next`),
	/// with none (the subtree becomes the parent's whole child list)
	/// and with exactly one (the parent's `first_child` or `last_child` takes over the missing side).
	/// An empty `subtree` simply removes `anchor` and closes the gap.
	///
	/// `anchor` ends up unlinked but still allocated.
	pub fn splice(&mut self, subtree: &[NodeId], anchor: NodeId) {
		let (parent, prev, next) = {
			let anchor = &self[anchor];
			(anchor.parent, anchor.prev_sibling, anchor.next_sibling)
		};
		self.isolate(anchor);
		self.move_run(parent, prev, next, subtree);
	}

	/// Links `nodes` in as the next siblings of `after`.
	pub fn insert_after(&mut self, nodes: &[NodeId], after: NodeId) {
		let (parent, next) = (self[after].parent, self[after].next_sibling);
		self.move_run(parent, Some(after), next, nodes);
	}

	/// Links `nodes` in as the previous siblings of `before`.
	pub fn insert_before(&mut self, nodes: &[NodeId], before: NodeId) {
		let (parent, prev) = (self[before].parent, self[before].prev_sibling);
		self.move_run(parent, prev, Some(before), nodes);
	}

	/// Unlinks `node` from its parent and siblings. Its own subtree stays attached to it.
	pub fn detach(&mut self, node: NodeId) {
		let (parent, prev, next) = {
			let node = &self[node];
			(node.parent, node.prev_sibling, node.next_sibling)
		};
		if parent.is_none() && prev.is_none() && next.is_none() {
			return;
		}
		self.isolate(node);
		self.link(parent, prev, next, &[]);
	}

	/// Detaches and frees `node` with its whole subtree.
	///
	/// Returns the host handles that were bound in the freed subtree, in document order.
	pub fn release(&mut self, node: NodeId) -> Vec<HostId> {
		self.detach(node);
		let mut hosts = Vec::new();
		for id in self.descendants(node) {
			let slot = &mut self.slots[id.index as usize];
			if let Some(host) = slot.node.take().and_then(|node| node.host) {
				hosts.push(host);
			}
			slot.generation = slot.generation.wrapping_add(1);
			self.free.push(id.index);
			self.live -= 1;
		}
		hosts
	}

	/// First element named `tag` in depth-first order below (and including) `root`.
	#[must_use]
	pub fn find_element(&self, root: NodeId, tag: &str) -> Option<NodeId> {
		self.descendants(root).into_iter().find(|&id| self[id].tag() == Some(tag))
	}

	/// First attribute whose name starts with `prefix`, as (element, attribute index).
	#[must_use]
	pub fn find_attribute(&self, root: NodeId, prefix: &str) -> Option<(NodeId, usize)> {
		self.descendants(root).into_iter().find_map(|id| self[id].attributes().iter().position(|a| a.name.starts_with(prefix)).map(|i| (id, i)))
	}

	/// Trimmed data of `node`'s first child, if that is a text node.
	#[must_use]
	pub fn text_content(&self, node: NodeId) -> &str {
		self[node].first_child.and_then(|child| self[child].text()).map_or("", str::trim)
	}

	/// Verifies the four-pointer invariant and acyclicity of the subtree at `root`.
	///
	/// # Errors
	///
	/// The first defect found, depth-first.
	pub fn check(&self, root: NodeId) -> Result<(), TreeDefect> {
		let mut seen = HashSet::new();
		let mut stack = vec![root];
		while let Some(parent) = stack.pop() {
			if !seen.insert(parent) {
				return Err(TreeDefect::Cycle(parent));
			}
			let node = self.get(parent).ok_or(TreeDefect::Dead(parent))?;
			let mut previous = None;
			let mut cursor = node.first_child;
			while let Some(child) = cursor {
				let child_node = self.get(child).ok_or(TreeDefect::Dead(child))?;
				if child_node.parent != Some(parent) {
					return Err(TreeDefect::WrongParent { parent, child, found: child_node.parent });
				}
				if child_node.prev_sibling != previous {
					return Err(TreeDefect::WrongPrevious { node: child, expected: previous, found: child_node.prev_sibling });
				}
				stack.push(child);
				previous = Some(child);
				cursor = child_node.next_sibling;
				if seen.contains(&child) {
					return Err(TreeDefect::Cycle(child));
				}
			}
			if node.last_child != previous {
				return Err(TreeDefect::WrongLast { parent, expected: previous, found: node.last_child });
			}
		}
		Ok(())
	}

	/// Clears `node`'s own links without touching its neighbours.
	fn isolate(&mut self, node: NodeId) {
		let node = &mut self[node];
		node.parent = None;
		node.prev_sibling = None;
		node.next_sibling = None;
	}

	/// Detaches every node of `run` from wherever it is and links the run between `prev` and `next` below `parent`.
	fn move_run(&mut self, parent: Option<NodeId>, prev: Option<NodeId>, next: Option<NodeId>, run: &[NodeId]) {
		for &id in run {
			debug_assert!(Some(id) != prev && Some(id) != next, "node moved next to itself");
			self.detach(id);
		}
		self.link(parent, prev, next, run);
	}

	/// `prev` and `next` must be adjacent children of `parent` (or the respective ends of its child list).
	fn link(&mut self, parent: Option<NodeId>, prev: Option<NodeId>, next: Option<NodeId>, run: &[NodeId]) {
		for pair in run.windows(2) {
			self[pair[0]].next_sibling = Some(pair[1]);
			self[pair[1]].prev_sibling = Some(pair[0]);
		}
		for &id in run {
			self[id].parent = parent;
		}
		if let (Some(&first), Some(&last)) = (run.first(), run.last()) {
			self[first].prev_sibling = prev;
			self[last].next_sibling = next;
		}

		let head = run.first().copied().or(next);
		let tail = run.last().copied().or(prev);
		match prev {
			Some(prev) => self[prev].next_sibling = head,
			None => {
				if let Some(parent) = parent {
					self[parent].first_child = head;
				}
			}
		}
		match next {
			Some(next) => self[next].prev_sibling = tail,
			None => {
				if let Some(parent) = parent {
					self[parent].last_child = tail;
				}
			}
		}
	}
}

impl Index<NodeId> for Tree {
	type Output = VirtualNode;

	#[track_caller]
	fn index(&self, id: NodeId) -> &Self::Output {
		self.get(id).unwrap_or_else(|| fatal(Violation::StaleNode(id)))
	}
}

impl IndexMut<NodeId> for Tree {
	#[track_caller]
	fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
		self.get_mut(id).unwrap_or_else(|| fatal(Violation::StaleNode(id)))
	}
}

/// See [`Tree::children`].
#[derive(Debug, Clone)]
pub struct Children<'a> {
	tree: &'a Tree,
	next: Option<NodeId>,
}
impl<'a> Iterator for Children<'a> {
	type Item = NodeId;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next?;
		self.next = self.tree[current].next_sibling;
		Some(current)
	}
}

/// The result of building or generating a render: a synthetic container `root` and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
	pub root: NodeId,
	pub nodes: Vec<NodeId>,
}
