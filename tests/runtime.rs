mod common;

use cambium_dom::{
	host::memory::{MemoryNodeKind, Op},
	Event, Handle, Host, HostId, Listener, MemoryHost, NodeKind, Runtime,
};
use common::{setup, ListField, Static, TodoItem, TodoList, Wrapper};
use std::{cell::RefCell, rc::Rc};

fn list_items(host: &MemoryHost, container: HostId) -> Vec<HostId> {
	host.find_all(container, "li")
}

fn count(ops: &[Op], f: impl Fn(&Op) -> bool) -> usize {
	ops.iter().filter(|op| f(op)).count()
}

#[test]
fn mount() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a", "b"]);
	runtime.mount(container, &list);

	assert_eq!(
		host.inner_html(container),
		r#"<section class="list"><h1>Chores</h1><input></input><button>add</button><button>pop</button><ul><li class="item">a</li><li class="item">b</li></ul></section>"#
	);
	assert!(list.is_initialized());
	assert!(list.read().items.iter().all(Handle::is_initialized));

	let section = list.nodes();
	assert_eq!(section.len(), 1);
	let tree = runtime.tree();
	tree.check(tree[section[0]].parent().unwrap()).unwrap();
	for node in tree.descendants(section[0]) {
		assert!(tree[node].host().is_some());
	}
}

#[test]
fn mount_creates_parents_before_inserting_children() {
	let (host, runtime, container) = setup();
	runtime.mount(container, &TodoList::new("Chores", &["a"]));

	let ops = host.ops();
	for (i, op) in ops.iter().enumerate() {
		if let Op::AppendChild { parent, child } = op {
			let created = |id: HostId| ops[..i].iter().any(|op| matches!(op, Op::CreateElement(c, _) | Op::CreateText(c, _) if *c == id));
			assert!(*parent == container || created(*parent));
			assert!(created(*child));
		}
	}
}

#[test]
fn expanded_template_uses_distinct_markers() {
	let (_, runtime, _) = setup();
	let list = TodoList::new("Chores", &["a", "b", "c"]);

	let markup = runtime.expand(&list);
	assert!(markup.contains(r#"<input cambium-bind-1="1">"#), "{}", markup);
	assert!(markup.contains(r#"<button cambium-on-1="2">add</button><button cambium-on-2="3">pop</button>"#), "{}", markup);

	let mut tree = cambium_dom::Tree::new();
	let fragment = cambium_dom::load::build(&mut tree, &markup, "body").unwrap();
	let markers: Vec<_> = tree
		.descendants(fragment.root)
		.into_iter()
		.filter(|&node| tree[node].tag() == Some("cambium-component"))
		.map(|node| tree.text_content(node).to_owned())
		.collect();
	assert_eq!(markers, ["4", "5", "6"]);
}

#[test]
fn custom_prefix() {
	common::init_logging();
	let host = Rc::new(MemoryHost::new());
	let config = cambium_dom::Config::default().with_prefix("x");
	let runtime = Runtime::with_ids(host, config, cambium_dom::SequentialIds::new());

	let markup = runtime.expand(&TodoList::new("Chores", &["a"]));
	assert!(markup.contains(r#"x-bind-1="1""#), "{}", markup);
	assert!(markup.contains("<x-component>4</x-component>"), "{}", markup);
}

#[test]
fn append_to_filled_collection_keeps_siblings() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a", "b"]);
	runtime.mount(container, &list);
	let before = list_items(&host, container);
	host.take_ops();

	let item = TodoItem::new("c");
	list.append(ListField::Items, item.clone());

	let ops = host.take_ops();
	assert_eq!(count(&ops, Op::is_creation), 2, "{:#?}", ops);
	assert_eq!(count(&ops, |op| matches!(op, Op::Remove(_) | Op::ReplaceWith { .. } | Op::Release(_))), 0);

	let after = list_items(&host, container);
	assert_eq!(after.len(), 3);
	assert_eq!(after[..2], before[..]);
	assert_eq!(host.to_html(after[2]), r#"<li class="item">c</li>"#);

	assert_eq!(list.read().items.len(), 3);
	assert!(item.is_initialized());
	let tree = runtime.tree();
	tree.check(tree[list.nodes()[0]].parent().unwrap()).unwrap();
	let li = item.nodes()[0];
	assert_eq!(tree[li].host(), Some(after[2]));
	assert_eq!(tree[tree[li].prev_sibling().unwrap()].host(), Some(after[1]));
}

#[test]
fn append_to_empty_collection_refreshes_owner() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &[]);
	runtime.mount(container, &list);
	let old_section = host.children(container)[0];
	host.take_ops();

	list.append(ListField::Items, TodoItem::new("first"));

	let ops = host.take_ops();
	let section = list.nodes()[0];
	let created = runtime.tree().descendants(section).len();
	assert_eq!(count(&ops, Op::is_creation), created);

	let new_section = host.children(container)[0];
	assert!(ops.contains(&Op::ReplaceWith { old: old_section, new: new_section }));
	assert_eq!(host.children(container).len(), 1);
	assert!(!host.is_live(old_section));
	assert_eq!(host.to_html(list_items(&host, container)[0]), r#"<li class="item">first</li>"#);
}

#[test]
fn remove_unlinks_exactly_the_item() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a", "b", "c"]);
	runtime.mount(container, &list);
	let before = list_items(&host, container);
	let second = list.read().items.get(1).unwrap().clone();
	host.take_ops();

	list.remove(ListField::Items, &second);

	let ops = host.take_ops();
	assert_eq!(ops.iter().filter(|op| matches!(op, Op::Remove(_))).collect::<Vec<_>>(), [&Op::Remove(before[1])]);
	assert_eq!(count(&ops, Op::is_creation), 0);
	assert_eq!(list_items(&host, container), [before[0], before[2]]);
	assert_eq!(list.read().items.len(), 2);
	assert!(second.nodes().is_empty());

	let tree = runtime.tree();
	let ul = tree[list.read().items.get(0).unwrap().nodes()[0]].parent().unwrap();
	tree.check(ul).unwrap();
	assert_eq!(tree.children(ul).count(), 2);
}

#[test]
fn binding_writes_back_without_refresh() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &[]);
	runtime.mount(container, &list);
	let input = host.find_all(container, "input")[0];
	host.take_ops();

	assert_eq!(host.dispatch(input, Event::new("change").with_value("milk")), 1);
	assert_eq!(list.read().draft, "milk");
	assert_eq!(list.read().writes, 1);
	assert!(host.take_ops().is_empty());

	assert_eq!(host.dispatch(input, Event::new("input").with_value("ignored")), 0);
	assert_eq!(list.read().draft, "milk");
	assert_eq!(list.read().writes, 1);
}

#[test]
fn handler_refreshes_its_component() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a", "b"]);
	runtime.mount(container, &list);
	let before = list_items(&host, container);
	host.take_ops();

	host.dispatch(before[0], Event::new("click"));

	let after = list_items(&host, container);
	assert_eq!(host.to_html(after[0]), r#"<li class="item done">a</li>"#);
	assert_eq!(after[1], before[1]);
	assert!(host.take_ops().contains(&Op::ReplaceWith { old: before[0], new: after[0] }));
	assert!(list.read().items.get(0).unwrap().read().done);

	// The new node has its own listener.
	host.dispatch(after[0], Event::new("click"));
	assert_eq!(host.to_html(list_items(&host, container)[0]), r#"<li class="item">a</li>"#);
	let tree = runtime.tree();
	tree.check(tree[list.nodes()[0]].parent().unwrap()).unwrap();
}

#[test]
fn add_and_pop_through_handlers() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a"]);
	runtime.mount(container, &list);
	let input = host.find_all(container, "input")[0];
	let buttons = host.find_all(container, "button");

	host.dispatch(input, Event::new("change").with_value("b"));
	host.dispatch(buttons[0], Event::new("click"));
	assert_eq!(host.inner_html(host.find_all(container, "ul")[0]), r#"<li class="item">a</li><li class="item">b</li>"#);
	assert_eq!(list.read().draft, "");

	host.dispatch(buttons[1], Event::new("click"));
	host.dispatch(buttons[1], Event::new("click"));
	assert_eq!(host.inner_html(host.find_all(container, "ul")[0]), "");
	assert!(list.read().items.is_empty());

	host.dispatch(input, Event::new("change").with_value("c"));
	host.dispatch(buttons[0], Event::new("click"));
	// The list was refreshed, so the old buttons are gone.
	assert!(!host.is_live(buttons[0]));
	assert_eq!(host.inner_html(host.find_all(container, "ul")[0]), r#"<li class="item">c</li>"#);
}

#[test]
fn set_field_refreshes() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &[]);
	runtime.mount(container, &list);

	list.set_field(ListField::Title, "Errands");
	assert!(host.inner_html(container).starts_with(r#"<section class="list"><h1>Errands</h1>"#));
}

#[test]
fn nested_component_without_nodes_leaves_no_gap() {
	for template in [
		"<div><p>a</p>{{render .Inner}}<p>b</p></div>",
		"<div>{{render .Inner}}<p>b</p></div>",
		"<div><p>a</p>{{render .Inner}}</div>",
		"<div>{{render .Inner}}</div>",
	] {
		let (host, runtime, container) = setup();
		let wrapper = Wrapper::new(template, Handle::new(Static("")));
		runtime.mount(container, &wrapper);

		let expected = template.replace("{{render .Inner}}", "");
		assert_eq!(host.inner_html(container), expected);
		let tree = runtime.tree();
		let div = wrapper.nodes()[0];
		tree.check(div).unwrap();
		assert!(tree.descendants(div).iter().all(|&node| tree[node].tag() != Some("cambium-component")));
		assert!(wrapper.read().inner.nodes().is_empty());
	}
}

#[test]
fn nested_refresh_escalates_when_empty() {
	let (host, runtime, container) = setup();
	let inner = Handle::new(Static(""));
	let wrapper = Wrapper::new("<div>{{render .Inner}}</div>", inner.clone());
	runtime.mount(container, &wrapper);
	let old_div = host.children(container)[0];
	host.take_ops();

	inner.refresh();
	let new_div = host.children(container)[0];
	assert!(host.take_ops().contains(&Op::ReplaceWith { old: old_div, new: new_div }));
}

#[test]
fn nested_top_level_nodes_stay_current() {
	let (host, runtime, container) = setup();
	let item = TodoItem::new("a");
	let wrapper = Wrapper::new("{{render .Inner}}", item.clone());
	runtime.mount(container, &wrapper);
	assert_eq!(wrapper.nodes(), item.nodes());

	host.dispatch(host.children(container)[0], Event::new("click"));
	assert_eq!(wrapper.nodes(), item.nodes());
	assert_eq!(host.inner_html(container), r#"<li class="item done">a</li>"#);

	wrapper.refresh();
	assert_eq!(host.inner_html(container), r#"<li class="item done">a</li>"#);
	assert_eq!(wrapper.nodes(), item.nodes());
}

#[test]
fn refresh_with_more_and_fewer_nodes() {
	let (host, runtime, container) = setup();
	let wrapper = Wrapper::new("<p>1</p>", Handle::new(Static("")));
	runtime.mount(container, &wrapper);

	wrapper.update(|state, cx| {
		state.template = "<p>1</p><p>2</p><p>3</p>".to_owned();
		cx.refresh();
	});
	assert_eq!(host.inner_html(container), "<p>1</p><p>2</p><p>3</p>");
	assert_eq!(wrapper.nodes().len(), 3);

	wrapper.update(|state, cx| {
		state.template = "<p>x</p>".to_owned();
		cx.refresh();
	});
	assert_eq!(host.inner_html(container), "<p>x</p>");

	wrapper.update(|state, cx| {
		state.template = String::new();
		cx.refresh();
	});
	assert_eq!(host.inner_html(container), "");
	assert!(wrapper.nodes().is_empty());

	// Without nodes, the mount container takes over.
	wrapper.update(|state, cx| {
		state.template = "<p>back</p>".to_owned();
		cx.refresh();
	});
	assert_eq!(host.inner_html(container), "<p>back</p>");
}

#[test]
fn delete_removes_host_nodes() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &["a", "b"]);
	runtime.mount(container, &list);
	let first = list.read().items.get(0).unwrap().clone();

	first.delete();
	assert_eq!(host.inner_html(host.find_all(container, "ul")[0]), r#"<li class="item">b</li>"#);
	// Deleting doesn't touch the collection.
	assert_eq!(list.read().items.len(), 2);

	let released_before = runtime.tree().len();
	list.delete();
	assert_eq!(host.inner_html(container), "");
	assert!(runtime.tree().len() < released_before);
}

#[test]
fn template_errors_keep_partial_output() {
	let (host, runtime, container) = setup();
	let wrapper = Wrapper::new("<p>ok</p>{{.Missing}}<p>never</p>", Handle::new(Static("")));
	runtime.mount(container, &wrapper);
	assert_eq!(host.inner_html(container), "<p>ok</p>");
}

#[test]
fn updates_before_mount_only_touch_state() {
	let (host, runtime, container) = setup();
	let list = TodoList::new("Chores", &[]);
	list.append(ListField::Items, TodoItem::new("early"));
	list.refresh();
	assert!(host.ops().is_empty());

	runtime.mount(container, &list);
	assert_eq!(host.to_html(list_items(&host, container)[0]), r#"<li class="item">early</li>"#);
}

/// Runs a hook from inside the first `replace_with`, like a listener firing mid-update.
struct HookHost {
	inner: MemoryHost,
	hook: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Host for HookHost {
	fn create_element(&self, tag: &str) -> HostId {
		self.inner.create_element(tag)
	}
	fn create_text_node(&self, text: &str) -> HostId {
		self.inner.create_text_node(text)
	}
	fn set_attribute(&self, node: HostId, name: &str, value: &str) {
		self.inner.set_attribute(node, name, value)
	}
	fn add_event_listener(&self, node: HostId, event: &str, listener: Listener) {
		self.inner.add_event_listener(node, event, listener)
	}
	fn append_child(&self, parent: HostId, child: HostId) {
		self.inner.append_child(parent, child)
	}
	fn insert_before(&self, parent: HostId, child: HostId, reference: Option<HostId>) {
		self.inner.insert_before(parent, child, reference)
	}
	fn remove(&self, node: HostId) {
		self.inner.remove(node)
	}
	fn replace_with(&self, old: HostId, new: HostId) {
		self.inner.replace_with(old, new);
		let hook = self.hook.borrow_mut().take();
		if let Some(hook) = hook {
			hook();
		}
	}
	fn release(&self, node: HostId) {
		self.inner.release(node)
	}
}

#[test]
fn reentrant_refresh_is_queued() {
	common::init_logging();
	let host = Rc::new(HookHost {
		inner: MemoryHost::new(),
		hook: RefCell::new(None),
	});
	let container = host.create_element("main");
	let runtime = Runtime::with_ids(host.clone(), cambium_dom::Config::default(), cambium_dom::SequentialIds::new());
	let list = TodoList::new("Chores", &["a"]);
	runtime.mount(container, &list);
	host.inner.take_ops();

	let replaced = Rc::new(RefCell::new(0));
	*host.hook.borrow_mut() = Some(Box::new({
		let list = list.clone();
		let host = Rc::clone(&host);
		let replaced = Rc::clone(&replaced);
		move || {
			list.set_field(ListField::Title, "Second");
			*replaced.borrow_mut() = count(&host.inner.ops(), |op| matches!(op, Op::ReplaceWith { .. }));
		}
	}));

	list.set_field(ListField::Title, "First");

	// The nested request ran only after the first refresh completed.
	assert_eq!(*replaced.borrow(), 1);
	assert_eq!(count(&host.inner.take_ops(), |op| matches!(op, Op::ReplaceWith { .. })), 2);
	assert!(host.inner.inner_html(container).contains("<h1>Second</h1>"));
	let tree = runtime.tree();
	tree.check(tree[list.nodes()[0]].parent().unwrap()).unwrap();
}

#[test]
fn text_nodes_keep_their_content() {
	let (host, runtime, container) = setup();
	let page = Handle::new(Static("<p>a &amp; b</p>tail"));
	runtime.mount(container, &page);

	let nodes = host.children(container);
	assert_eq!(host.kind(nodes[1]), Some(MemoryNodeKind::Text("tail".to_owned())));
	assert_eq!(host.inner_html(container), "<p>a &amp; b</p>tail");

	let tree = runtime.tree();
	let p = page.nodes()[0];
	let text = tree.children(p).next().unwrap();
	assert_eq!(tree[text].kind(), &NodeKind::Text("a & b".to_owned()));
}
