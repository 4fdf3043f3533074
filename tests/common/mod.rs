#![allow(dead_code)]

use cambium_dom::{names, ChildList, Collection, Component, Config, Event, Handle, Host, HostId, MemoryHost, NoNames, Runtime, SequentialIds, Updates, Value};
use std::{borrow::Cow, rc::Rc};

pub fn init_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// A memory host, a runtime with reproducible ids and a `<main>` container to mount into.
pub fn setup() -> (Rc<MemoryHost>, Rc<Runtime>, HostId) {
	init_logging();
	let host = Rc::new(MemoryHost::new());
	let container = host.create_element("main");
	host.take_ops();
	let runtime = Runtime::with_ids(host.clone(), Config::default(), SequentialIds::new());
	(host, runtime, container)
}

names! {
	pub enum ItemField { Text, Done }
}
names! {
	pub enum ItemHandler { Toggle }
}

pub struct TodoItem {
	pub text: String,
	pub done: bool,
}

impl TodoItem {
	pub fn new(text: &str) -> Handle<Self> {
		Handle::new(Self {
			text: text.to_owned(),
			done: false,
		})
	}
}

impl Component for TodoItem {
	type Field = ItemField;
	type Handler = ItemHandler;

	fn template(&self) -> Cow<'_, str> {
		r#"<li class="item{{classIf "done" .Done}}" {{on "click" "Toggle"}}>{{.Text}}</li>"#.into()
	}

	fn field(&self, field: ItemField) -> Value {
		match field {
			ItemField::Text => self.text.as_str().into(),
			ItemField::Done => self.done.into(),
		}
	}

	fn handle(&mut self, handler: ItemHandler, _: &Event, cx: &mut Updates<Self>) {
		match handler {
			ItemHandler::Toggle => {
				self.done = !self.done;
				cx.refresh();
			}
		}
	}
}

names! {
	pub enum ListField { Title, Draft, Items }
}
names! {
	pub enum ListHandler { Add, Pop }
}

pub struct TodoList {
	pub title: String,
	pub draft: String,
	pub items: Collection<TodoItem>,
	/// Number of binding write-backs received.
	pub writes: usize,
}

impl TodoList {
	pub fn new(title: &str, items: &[&str]) -> Handle<Self> {
		Handle::new(Self {
			title: title.to_owned(),
			draft: String::new(),
			items: items.iter().map(|text| TodoItem::new(text)).collect(),
			writes: 0,
		})
	}
}

impl Component for TodoList {
	type Field = ListField;
	type Handler = ListHandler;

	fn template(&self) -> Cow<'_, str> {
		r#"
			<section class="list"><h1>{{.Title}}</h1><input {{bind "Draft"}}><button {{on "click" "Add"}}>add</button><button {{on "click" "Pop"}}>pop</button><ul>{{render .Items}}</ul></section>
		"#
		.into()
	}

	fn field(&self, field: ListField) -> Value {
		match field {
			ListField::Title => self.title.as_str().into(),
			ListField::Draft => self.draft.as_str().into(),
			ListField::Items => (&self.items).into(),
		}
	}

	fn set_field(&mut self, field: ListField, value: String) {
		self.writes += 1;
		match field {
			ListField::Title => self.title = value,
			ListField::Draft => self.draft = value,
			ListField::Items => panic!("Items can't be written as text."),
		}
	}

	fn children_mut(&mut self, field: ListField) -> Option<&mut dyn ChildList> {
		match field {
			ListField::Items => Some(&mut self.items),
			ListField::Title | ListField::Draft => None,
		}
	}

	fn handle(&mut self, handler: ListHandler, _: &Event, cx: &mut Updates<Self>) {
		match handler {
			ListHandler::Add => {
				let text = core::mem::take(&mut self.draft);
				cx.append(ListField::Items, TodoItem::new(&text));
			}
			ListHandler::Pop => {
				if let Some(last) = self.items.last() {
					cx.remove(ListField::Items, last);
				}
			}
		}
	}
}

names! {
	pub enum WrapperField { Inner }
}

/// Renders `template`, which may use `{{render .Inner}}`.
pub struct Wrapper<C: Component> {
	pub template: String,
	pub inner: Handle<C>,
}

impl<C: Component> Wrapper<C> {
	pub fn new(template: &str, inner: Handle<C>) -> Handle<Self> {
		Handle::new(Self {
			template: template.to_owned(),
			inner,
		})
	}
}

impl<C: Component> Component for Wrapper<C> {
	type Field = WrapperField;
	type Handler = NoNames;

	fn template(&self) -> Cow<'_, str> {
		Cow::Borrowed(&self.template)
	}

	fn field(&self, field: WrapperField) -> Value {
		match field {
			WrapperField::Inner => (&self.inner).into(),
		}
	}
}

/// Renders whatever markup it holds, without any actions.
pub struct Static(pub &'static str);

impl Component for Static {
	type Field = NoNames;
	type Handler = NoNames;

	fn template(&self) -> Cow<'_, str> {
		self.0.into()
	}

	fn field(&self, field: NoNames) -> Value {
		match field {}
	}
}
