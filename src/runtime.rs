//! The owner of the virtual tree and the only place where it is mutated after resolution.
//!
//! Every mutation (refresh, append, remove, delete) is a queued request.
//! Requests submitted while another one runs, for example from a listener fired by the host
//! in the middle of an update, are executed afterwards in submission order.
//! Nothing ever observes a half-updated tree.

use crate::{
	component::{with_collection, Component, ComponentRef, Handle, Mount, Request},
	config::Config,
	error::fatal,
	host::{Host, HostId},
	materialize::{materialize, release},
	registry::{IdGenerator, UuidIds},
	tree::{NodeId, Tree},
};
use core::{
	cell::{Cell, Ref, RefCell, RefMut},
	fmt::{self, Debug, Formatter},
};
use std::{
	collections::VecDeque,
	rc::{Rc, Weak},
};
use tracing::{instrument, trace, warn};

/// A mounted root and the virtual node standing in for its host container.
struct Mounted {
	component: ComponentRef,
	container: NodeId,
}

/// Drives rendering for one host.
pub struct Runtime {
	tree: RefCell<Tree>,
	host: Rc<dyn Host>,
	ids: RefCell<Box<dyn IdGenerator>>,
	config: Config,
	queue: RefCell<VecDeque<Request>>,
	flushing: Cell<bool>,
	this: Weak<Runtime>,
	mounts: RefCell<Vec<Mounted>>,
}

impl Debug for Runtime {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Runtime")
			.field("nodes", &self.tree.borrow().len())
			.field("config", &self.config)
			.field("queued", &self.queue.borrow().len())
			.field("mounts", &self.mounts.borrow().len())
			.finish()
	}
}

impl Runtime {
	/// A runtime minting random UUIDs for placeholders.
	#[must_use]
	pub fn new(host: Rc<dyn Host>, config: Config) -> Rc<Self> {
		Self::with_ids(host, config, UuidIds)
	}

	#[must_use]
	pub fn with_ids(host: Rc<dyn Host>, config: Config, ids: impl IdGenerator + 'static) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			tree: RefCell::default(),
			host,
			ids: RefCell::new(Box::new(ids)),
			config,
			queue: RefCell::default(),
			flushing: Cell::new(false),
			this: this.clone(),
			mounts: RefCell::default(),
		})
	}

	/// Initializes `root`, generates its first render and appends every top-level node to `container`.
	///
	/// From here on, updates are driven by host events and by [`Handle`] calls.
	#[instrument(skip(self, root))]
	pub fn mount<C: Component>(&self, container: HostId, root: &Handle<C>) {
		root.0.initialize(None, &self.this);
		let fragment = root.0.generate_tree(self);

		let mut tree = self.tree.borrow_mut();
		tree[fragment.root].host = Some(container);
		for &node in &fragment.nodes {
			let handle = materialize(&mut tree, &*self.host, node);
			self.host.append_child(container, handle);
		}
		drop(tree);

		self.mounts.borrow_mut().push(Mounted {
			component: root.to_ref(),
			container: fragment.root,
		});
		trace!("Mounted {} top-level node(s).", fragment.nodes.len());
	}

	/// Expands `component`'s template without building or resolving anything.
	///
	/// This starts a new render pass for it: placeholder ids from its previous render become unresolvable.
	#[must_use]
	pub fn expand<C: Component>(&self, component: &Handle<C>) -> String {
		component.0.expand(self)
	}

	/// The virtual tree, for inspection.
	///
	/// # Panics
	///
	/// Iff called while the tree is being mutated, i.e. from a [`Host`] method.
	#[must_use]
	pub fn tree(&self) -> Ref<'_, Tree> {
		self.tree.borrow()
	}

	#[must_use]
	pub fn host(&self) -> &Rc<dyn Host> {
		&self.host
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	pub(crate) fn tree_mut(&self) -> RefMut<'_, Tree> {
		self.tree.borrow_mut()
	}

	pub(crate) fn ids_mut(&self) -> RefMut<'_, Box<dyn IdGenerator>> {
		self.ids.borrow_mut()
	}

	pub(crate) fn downgrade(&self) -> Weak<Runtime> {
		self.this.clone()
	}

	/// Queues `requests` and runs the queue unless it is already running further up the stack.
	pub(crate) fn submit(&self, requests: Vec<Request>) {
		self.queue.borrow_mut().extend(requests);
		if self.flushing.replace(true) {
			trace!("Update in progress; {} request(s) queued.", self.queue.borrow().len());
			return;
		}
		loop {
			let next = self.queue.borrow_mut().pop_front();
			match next {
				Some(request) => request(Some(self)),
				None => break,
			}
		}
		self.flushing.set(false);
	}

	/// Live top-level nodes of `component`'s current render.
	fn live_nodes(&self, component: &ComponentRef) -> Vec<NodeId> {
		let tree = self.tree.borrow();
		component.nodes().into_iter().filter(|&node| tree.contains(node)).collect()
	}

	/// Regenerates `component` and swaps its top-level host nodes one by one.
	///
	/// Surplus new nodes are inserted after the last swapped one, surplus old ones are removed.
	/// A component without live nodes has no position of its own, so its parent (or mount container) is refreshed instead.
	#[instrument(skip(self, component), fields(component = component.type_name()))]
	pub(crate) fn refresh(&self, component: &ComponentRef) {
		let old = self.live_nodes(component);
		if old.is_empty() {
			return self.refresh_positionless(component);
		}

		let fragment = component.0.generate_tree(self);
		let host = &*self.host;
		let mut tree = self.tree.borrow_mut();

		let last = old[old.len() - 1];
		let parent_host = tree[old[0]].parent.and_then(|parent| tree[parent].host);
		let next_host = tree[last].next_sibling.and_then(|next| tree[next].host);
		tree.insert_before(&fragment.nodes, old[0]);
		tree.release(fragment.root);

		for (i, &node) in fragment.nodes.iter().enumerate() {
			let handle = materialize(&mut tree, host, node);
			match old.get(i).and_then(|&old| tree[old].host) {
				Some(old_handle) => host.replace_with(old_handle, handle),
				None => match parent_host {
					Some(parent_host) => host.insert_before(parent_host, handle, next_host),
					None => warn!("No host parent to insert {:?} into.", handle),
				},
			}
		}
		for &surplus in old.iter().skip(fragment.nodes.len()) {
			if let Some(handle) = tree[surplus].host {
				host.remove(handle);
			}
		}
		for &node in &old {
			release(&mut tree, host, node);
		}
		drop(tree);

		trace!("Replaced {} with {} top-level node(s).", old.len(), fragment.nodes.len());
		self.patch_ancestors(component.parent(), &old, &fragment.nodes);
	}

	fn refresh_positionless(&self, component: &ComponentRef) {
		if let Some(parent) = component.parent() {
			trace!("Escalating to {}.", parent.type_name());
			return self.refresh(&parent);
		}

		let container = self.mounts.borrow().iter().find(|m| m.component.ptr_eq(component)).map(|m| m.container);
		let container = match container {
			Some(container) => container,
			None => return warn!("{} is neither mounted nor nested; refresh skipped.", component.type_name()),
		};
		let fragment = component.0.generate_tree(self);
		let mut tree = self.tree.borrow_mut();
		let container_host = tree[container].host;
		for &node in &fragment.nodes {
			tree.append_child(container, node);
			let handle = materialize(&mut tree, &*self.host, node);
			if let Some(container_host) = container_host {
				self.host.append_child(container_host, handle);
			}
		}
		tree.release(fragment.root);
		trace!("Re-appended {} top-level node(s) to the mount container.", fragment.nodes.len());
	}

	/// Appends `item` to `owner`'s collection `field`.
	///
	/// If the collection already renders nodes, only the new item is generated and materialized
	/// and its nodes are placed right after those of the previous last item. Otherwise `owner` is refreshed.
	#[instrument(skip(self, owner, item), fields(owner = owner.to_ref().type_name(), item = item.type_name()))]
	pub(crate) fn append<C: Component>(&self, owner: &Handle<C>, field: C::Field, item: ComponentRef) {
		let owner_ref = owner.to_ref();
		item.0.initialize(Some(&owner_ref), &self.this);

		let previous = with_collection(owner, field, |collection| {
			let previous = collection.refs().pop();
			collection.push_ref(item.clone()).map(|()| previous)
		});
		let previous = previous.unwrap_or_else(|violation| fatal(violation));

		let last = previous.and_then(|previous| self.live_nodes(&previous).pop());
		let last = match last {
			Some(last) => last,
			None => {
				trace!("No rendered predecessor; refreshing the owner.");
				return self.refresh(&owner_ref);
			}
		};

		let fragment = item.0.generate_tree(self);
		let host = &*self.host;
		let mut tree = self.tree.borrow_mut();
		tree.insert_after(&fragment.nodes, last);
		tree.release(fragment.root);

		let parent_host = tree[last].parent.and_then(|parent| tree[parent].host);
		let next_host = fragment.nodes.last().and_then(|&node| tree[node].next_sibling).and_then(|next| tree[next].host);
		for &node in &fragment.nodes {
			let handle = materialize(&mut tree, host, node);
			match parent_host {
				Some(parent_host) => host.insert_before(parent_host, handle, next_host),
				None => warn!("Appended item has no host parent; {:?} stays detached.", handle),
			}
		}
		drop(tree);

		let mut patched = vec![last];
		patched.extend(&fragment.nodes);
		self.patch_ancestors(Some(owner_ref), &[last], &patched);
	}

	/// Removes `item` from `owner`'s collection `field` and deletes its host nodes.
	#[instrument(skip(self, owner, item), fields(owner = owner.to_ref().type_name(), item = item.type_name()))]
	pub(crate) fn remove<C: Component>(&self, owner: &Handle<C>, field: C::Field, item: &ComponentRef) {
		if with_collection(owner, field, |collection| collection.remove_ref(item)) {
			self.delete(item);
		} else {
			warn!("Item to remove isn't in the collection.");
		}
	}

	/// Removes every top-level host node of `component` and frees its virtual subtree.
	#[instrument(skip(self, component), fields(component = component.type_name()))]
	pub(crate) fn delete(&self, component: &ComponentRef) {
		let nodes = self.live_nodes(component);
		let host = &*self.host;
		let mut tree = self.tree.borrow_mut();
		for &node in &nodes {
			if let Some(handle) = tree[node].host {
				host.remove(handle);
			}
			release(&mut tree, host, node);
		}
		drop(tree);

		component.0.set_nodes(Vec::new());
		trace!("Deleted {} top-level node(s).", nodes.len());
		self.patch_ancestors(component.parent(), &nodes, &[]);
	}

	/// Replaces the run `old` with `new` in the node lists of `first` and its ancestors, as far up as `old` appears at top level.
	fn patch_ancestors(&self, first: Option<ComponentRef>, old: &[NodeId], new: &[NodeId]) {
		if old.is_empty() {
			return;
		}
		let mut current = first;
		while let Some(component) = current {
			let mut nodes = component.nodes();
			let position = match nodes.iter().position(|node| old.contains(node)) {
				Some(position) => position,
				None => break,
			};
			nodes.retain(|node| !old.contains(node));
			let tail = nodes.split_off(position);
			nodes.extend_from_slice(new);
			nodes.extend(tail);
			component.0.set_nodes(nodes);
			current = component.parent();
		}
	}
}
