//! Creation of host nodes for resolved virtual nodes.

use crate::{
	host::{Host, HostId},
	tree::{NodeId, NodeKind, Tree},
};
use std::rc::Rc;
use tracing::trace_span;

/// Creates host counterparts for `node` and its subtree, depth-first, and binds them to the virtual nodes.
///
/// Each element gets its attributes and then its listeners in attachment order.
/// Children are appended to their already created parent, so nothing is inserted into a host tree before its parent exists.
/// The returned root handle is not attached anywhere yet.
pub(crate) fn materialize(tree: &mut Tree, host: &dyn Host, node: NodeId) -> HostId {
	let span = trace_span!("materialize", ?node);
	let _enter = span.enter();

	let handle = match tree[node].kind() {
		NodeKind::Element { tag, attributes } => {
			let handle = host.create_element(tag);
			for attribute in attributes {
				host.set_attribute(handle, &attribute.name, &attribute.value);
			}
			handle
		}
		NodeKind::Text(text) => host.create_text_node(text),
	};
	for event in tree[node].events() {
		host.add_event_listener(handle, &event.name, Rc::clone(&event.handler));
	}
	tree[node].host = Some(handle);

	let children: Vec<NodeId> = tree.children(node).collect();
	for child in children {
		let child = materialize(tree, host, child);
		host.append_child(handle, child);
	}
	handle
}

/// Frees `node` with its subtree and lets the host drop whatever it kept for the freed handles.
///
/// Doesn't remove anything from the host tree.
pub(crate) fn release(tree: &mut Tree, host: &dyn Host, node: NodeId) {
	for handle in tree.release(node) {
		host.release(handle);
	}
}
