//! Replaces the placeholder markers in a freshly built render with what they stand for.

use crate::{
	component::{Component, Instance},
	error::{fatal, Violation},
	runtime::Runtime,
	tree::{Attribute, NodeId},
};
use core::cell::RefCell;
use tracing::{instrument, trace, trace_span};

/// Resolves binding, event and component markers below `root` against `owner`'s registry until none are left.
///
/// Each scan restarts at `root`. The tree is never borrowed across a nested component's generation.
#[instrument(skip(runtime, owner))]
pub(crate) fn resolve<C: Component>(runtime: &Runtime, owner: &RefCell<Instance<C>>, root: NodeId) {
	let config = runtime.config();

	let binding_prefix = config.binding_prefix();
	while let Some((node, attribute)) = take_marker(runtime, root, &binding_prefix) {
		let span = trace_span!("binding", id = %attribute.value);
		let _enter = span.enter();

		let record = owner.borrow_mut().registry_mut().take_binding(&attribute.value);
		let record = record.unwrap_or_else(|| fatal(Violation::UnknownBinding(attribute.value)));
		trace!(field = ?record.field, "Attaching binding.");
		runtime.tree_mut()[node].events.push(record.into_event(&config.binding_event));
	}

	let event_prefix = config.event_prefix();
	while let Some((node, attribute)) = take_marker(runtime, root, &event_prefix) {
		let span = trace_span!("event", id = %attribute.value);
		let _enter = span.enter();

		let record = owner.borrow_mut().registry_mut().take_event(&attribute.value);
		let record = record.unwrap_or_else(|| fatal(Violation::UnknownEvent(attribute.value)));
		trace!(event = %record.name, "Attaching event.");
		runtime.tree_mut()[node].events.push(record);
	}

	let tag = config.component_tag();
	loop {
		let marker = runtime.tree().find_element(root, &tag);
		let marker = match marker {
			Some(marker) => marker,
			None => break,
		};
		let id = runtime.tree().text_content(marker).to_owned();
		let span = trace_span!("component", id = %id);
		let _enter = span.enter();

		let (nested, this) = {
			let mut instance = owner.borrow_mut();
			(instance.registry_mut().take_component(&id), instance.this_ref())
		};
		let nested = nested.unwrap_or_else(|| fatal(Violation::UnknownComponent(id)));
		nested.0.initialize(this.as_ref(), &runtime.downgrade());
		let fragment = nested.0.generate_tree(runtime);

		let mut tree = runtime.tree_mut();
		tree.splice(&fragment.nodes, marker);
		tree.release(marker);
		tree.release(fragment.root);
		trace!("Spliced in {} node(s) of {}.", fragment.nodes.len(), nested.type_name());
	}

	let pending = owner.borrow_mut().registry_mut().pending();
	if pending > 0 {
		trace!("{} registered record(s) without marker.", pending);
	}
}

/// Finds the first marker attribute starting with `prefix` and strips it from its element.
fn take_marker(runtime: &Runtime, root: NodeId, prefix: &str) -> Option<(NodeId, Attribute)> {
	let (node, index) = runtime.tree().find_attribute(root, prefix)?;
	let attribute = runtime.tree_mut()[node].take_attribute(index)?;
	Some((node, attribute))
}
