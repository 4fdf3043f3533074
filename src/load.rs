//! Builds virtual node trees from expanded markup.

use crate::{
	error::LoadError,
	tree::{Attribute, Fragment, NodeId, Tree},
};
use html5ever::{parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::{instrument, trace};

/// Parses `markup` as a document and wraps the element named `container` and its subtree into `tree`.
///
/// The container becomes [`Fragment::root`], a synthetic root without parent.
/// Its children, in document order, are [`Fragment::nodes`].
///
/// # Errors
///
/// Iff the markup can't be read or contains no `container` element after parsing.
#[instrument(skip(tree, markup), fields(markup_len = markup.len()))]
pub fn build(tree: &mut Tree, markup: &str, container: &str) -> Result<Fragment, LoadError> {
	if cfg!(feature = "dangerous-logging") {
		trace!("Markup: {}", markup);
	}
	let dom = parse_document(RcDom::default(), Default::default()).from_utf8().read_from(&mut markup.as_bytes())?;

	let container_handle = find_element(&dom.document, container).ok_or_else(|| LoadError::MissingContainer(container.to_owned()))?;
	let root = match wrap(tree, &container_handle) {
		Some(root) => root,
		None => return Err(LoadError::MissingContainer(container.to_owned())),
	};
	let nodes: Vec<NodeId> = tree.children(root).collect();
	trace!("Built {} top-level node(s).", nodes.len());
	Ok(Fragment { root, nodes })
}

/// Depth-first search for the first element with local name `tag`.
fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
	if let NodeData::Element { name, .. } = &handle.data {
		if &*name.local == tag {
			return Some(handle.clone());
		}
	}
	handle.children.borrow().iter().find_map(|child| find_element(child, tag))
}

/// Wraps `handle`, then its children in order. Nodes other than elements and text are skipped.
fn wrap(tree: &mut Tree, handle: &Handle) -> Option<NodeId> {
	let id = match &handle.data {
		NodeData::Element { name, attrs, .. } => {
			let attributes = attrs
				.borrow()
				.iter()
				.map(|attribute| Attribute {
					name: attribute.name.local.to_string(),
					value: attribute.value.to_string(),
				})
				.collect();
			tree.create_element(name.local.to_string(), attributes)
		}
		NodeData::Text { contents } => return Some(tree.create_text(contents.borrow().to_string())),
		NodeData::Document | NodeData::Doctype { .. } | NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => return None,
	};
	for child in handle.children.borrow().iter() {
		if let Some(child) = wrap(tree, child) {
			tree.append_child(id, child);
		}
	}
	Some(id)
}
