//! Components, their instances and the handles through which they are owned and mutated.

use crate::{
	config::Config,
	error::{fatal, TemplateError, Violation},
	host::{Event, Listener},
	load,
	registry::{IdGenerator, Registry},
	resolve,
	runtime::Runtime,
	template::{self, Directives},
	tree::{EventRecord, Fragment, NodeId},
};
use core::{
	any::{type_name, Any},
	cell::{Ref, RefCell},
	fmt::{self, Debug, Formatter},
	iter::FromIterator,
};
use std::{
	borrow::Cow,
	rc::{Rc, Weak},
};
use tracing::{error, trace, trace_span, warn};

/// A closed set of names, i.e. a component's fields or its event handlers.
///
/// Usually generated with [`names!`](`crate::names!`).
pub trait Name: Copy + Debug + Eq + 'static {
	fn all() -> &'static [Self];
	fn name(self) -> &'static str;

	#[must_use]
	fn from_name(name: &str) -> Option<Self> {
		Self::all().iter().copied().find(|n| n.name() == name)
	}
}

/// Declares a fieldless enum implementing [`Name`], with each variant named as written.
///
/// ```
/// cambium_dom::names! {
///     pub enum Field { Title, Items }
/// }
/// use cambium_dom::Name as _;
/// assert_eq!(Field::from_name("Items"), Some(Field::Items));
/// ```
#[macro_export]
macro_rules! names {
	($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),* $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		$vis enum $name { $($variant),* }

		impl $crate::Name for $name {
			fn all() -> &'static [Self] {
				&[$(Self::$variant),*]
			}

			fn name(self) -> &'static str {
				match self {
					$(Self::$variant => stringify!($variant)),*
				}
			}
		}
	};
}

names! {
	/// For components without fields or without handlers.
	pub enum NoNames {}
}

/// A field value as seen by templates.
#[derive(Debug, Clone)]
pub enum Value {
	Empty,
	Text(String),
	Bool(bool),
	Int(i64),
	Component(ComponentRef),
	Components(Vec<ComponentRef>),
}

impl Value {
	/// Truthiness for `{{if}}`.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Empty => false,
			Value::Text(text) => !text.is_empty(),
			Value::Bool(b) => *b,
			Value::Int(i) => *i != 0,
			Value::Component(_) => true,
			Value::Components(components) => !components.is_empty(),
		}
	}

	/// The textual form used for interpolation, unless this is a component value.
	#[must_use]
	pub fn to_text(&self) -> Option<String> {
		match self {
			Value::Empty => Some(String::new()),
			Value::Text(text) => Some(text.clone()),
			Value::Bool(b) => Some(b.to_string()),
			Value::Int(i) => Some(i.to_string()),
			Value::Component(_) | Value::Components(_) => None,
		}
	}

	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			Value::Empty => "empty",
			Value::Text(_) => "text",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Component(_) => "component",
			Value::Components(_) => "components",
		}
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Value::Text(text.to_owned())
	}
}
impl From<String> for Value {
	fn from(text: String) -> Self {
		Value::Text(text)
	}
}
impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}
impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}
impl From<ComponentRef> for Value {
	fn from(component: ComponentRef) -> Self {
		Value::Component(component)
	}
}
impl From<Vec<ComponentRef>> for Value {
	fn from(components: Vec<ComponentRef>) -> Self {
		Value::Components(components)
	}
}
impl<C: Component> From<&Handle<C>> for Value {
	fn from(handle: &Handle<C>) -> Self {
		Value::Component(handle.to_ref())
	}
}
impl<C: Component> From<&Collection<C>> for Value {
	fn from(collection: &Collection<C>) -> Self {
		Value::Components(collection.refs())
	}
}
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Empty, Into::into)
	}
}

/// A user-defined, stateful unit of UI.
///
/// Templates refer to fields and handlers by name; those names are resolved through [`Self::Field`] and [`Self::Handler`].
pub trait Component: Sized + 'static {
	type Field: Name;
	type Handler: Name;

	/// Markup with `{{…}}` actions, expanded against this component on every render.
	fn template(&self) -> Cow<'_, str>;

	fn field(&self, field: Self::Field) -> Value;

	/// Receives values written back by `{{bind "Field"}}`.
	///
	/// This does not refresh the component.
	fn set_field(&mut self, field: Self::Field, value: String) {
		warn!("{} doesn't accept values for {:?}; dropped {} byte(s).", type_name::<Self>(), field, value.len());
	}

	/// The collection stored in `field`, for [`Handle::append`] and [`Handle::remove`].
	fn children_mut(&mut self, field: Self::Field) -> Option<&mut dyn ChildList> {
		let _ = field;
		None
	}

	/// Runs the handler named in `{{on "event" "Handler"}}`.
	fn handle(&mut self, handler: Self::Handler, event: &Event, cx: &mut Updates<Self>) {
		let _ = cx;
		warn!("{} has no implementation for handler {:?} ({:?} event).", type_name::<Self>(), handler, event.name);
	}
}

/// A collection field that can be appended to and removed from by identity.
pub trait ChildList {
	fn refs(&self) -> Vec<ComponentRef>;

	/// # Errors
	///
	/// Iff `item` is of the wrong component type.
	fn push_ref(&mut self, item: ComponentRef) -> Result<(), Violation>;

	/// Removes `item` by identity. Returns whether it was present.
	fn remove_ref(&mut self, item: &ComponentRef) -> bool;
}

impl ChildList for Vec<ComponentRef> {
	fn refs(&self) -> Vec<ComponentRef> {
		self.clone()
	}

	fn push_ref(&mut self, item: ComponentRef) -> Result<(), Violation> {
		self.push(item);
		Ok(())
	}

	fn remove_ref(&mut self, item: &ComponentRef) -> bool {
		match self.iter().position(|c| c.ptr_eq(item)) {
			Some(index) => {
				self.remove(index);
				true
			}
			None => false,
		}
	}
}

/// An ordered, typed collection of nested components.
pub struct Collection<C: Component> {
	items: Vec<Handle<C>>,
}

impl<C: Component> Collection<C> {
	#[must_use]
	pub fn new() -> Self {
		Self { items: Vec::new() }
	}

	/// Adds `item` without rendering anything. See [`Handle::append`] for the rendering variant.
	pub fn push(&mut self, item: Handle<C>) {
		self.items.push(item)
	}

	pub fn iter(&self) -> core::slice::Iter<'_, Handle<C>> {
		self.items.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.items.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	#[must_use]
	pub fn get(&self, index: usize) -> Option<&Handle<C>> {
		self.items.get(index)
	}

	#[must_use]
	pub fn last(&self) -> Option<&Handle<C>> {
		self.items.last()
	}

	#[must_use]
	pub fn refs(&self) -> Vec<ComponentRef> {
		self.items.iter().map(Handle::to_ref).collect()
	}
}

impl<C: Component> Default for Collection<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Component> Clone for Collection<C> {
	fn clone(&self) -> Self {
		Self { items: self.items.clone() }
	}
}

impl<C: Component> Debug for Collection<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.items.iter()).finish()
	}
}

impl<C: Component> FromIterator<Handle<C>> for Collection<C> {
	fn from_iter<T: IntoIterator<Item = Handle<C>>>(iter: T) -> Self {
		Self { items: iter.into_iter().collect() }
	}
}

impl<'a, C: Component> IntoIterator for &'a Collection<C> {
	type Item = &'a Handle<C>;
	type IntoIter = core::slice::Iter<'a, Handle<C>>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

impl<C: Component> ChildList for Collection<C> {
	fn refs(&self) -> Vec<ComponentRef> {
		Collection::refs(self)
	}

	fn push_ref(&mut self, item: ComponentRef) -> Result<(), Violation> {
		let found = item.type_name();
		let handle = item.downcast::<C>().ok_or(Violation::ItemType { expected: type_name::<C>(), found })?;
		self.items.push(handle);
		Ok(())
	}

	fn remove_ref(&mut self, item: &ComponentRef) -> bool {
		match self.items.iter().position(|h| h.to_ref().ptr_eq(item)) {
			Some(index) => {
				self.items.remove(index);
				true
			}
			None => false,
		}
	}
}

/// The live state behind a [`Handle`].
pub(crate) struct Instance<C: Component> {
	state: C,
	this: Weak<RefCell<Instance<C>>>,
	/// Set once on initialization.
	parent: Option<WeakRef>,
	runtime: Weak<Runtime>,
	initialized: bool,
	/// Top-level nodes of the most recent render.
	nodes: Vec<NodeId>,
	registry: Registry<C>,
}

impl<C: Component> Instance<C> {
	fn new(state: C, this: Weak<RefCell<Instance<C>>>) -> Self {
		Self {
			state,
			this,
			parent: None,
			runtime: Weak::new(),
			initialized: false,
			nodes: Vec::new(),
			registry: Registry::new(),
		}
	}

	pub(crate) fn state_mut(&mut self) -> &mut C {
		&mut self.state
	}

	pub(crate) fn registry_mut(&mut self) -> &mut Registry<C> {
		&mut self.registry
	}

	pub(crate) fn this_ref(&self) -> Option<ComponentRef> {
		self.this.upgrade().map(|this| ComponentRef(this))
	}

	/// Instances reachable from any declared field.
	fn nested(&self) -> Vec<ComponentRef> {
		C::Field::all()
			.iter()
			.flat_map(|&field| match self.state.field(field) {
				Value::Component(component) => vec![component],
				Value::Components(components) => components,
				_ => Vec::new(),
			})
			.collect()
	}
}

/// Type-erased lifecycle of an instance, as used by owners and the runtime.
pub(crate) trait Mount {
	/// Binds parent and runtime and initializes nested instances. Only the first call has an effect.
	fn initialize(&self, parent: Option<&ComponentRef>, runtime: &Weak<Runtime>);
	fn is_initialized(&self) -> bool;
	fn parent(&self) -> Option<ComponentRef>;
	fn runtime(&self) -> Option<Rc<Runtime>>;
	/// Expands the template, resetting the registry.
	fn expand(&self, runtime: &Runtime) -> String;
	/// Expands, builds and resolves a new render and makes it the current one.
	fn generate_tree(&self, runtime: &Runtime) -> Fragment;
	fn nodes(&self) -> Vec<NodeId>;
	/// Patches the current render's node list after a partial update of the tree.
	fn set_nodes(&self, nodes: Vec<NodeId>);
	fn type_name(&self) -> &'static str;
	fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

fn initialize_nested<C: Component>(cell: &RefCell<Instance<C>>, runtime: &Weak<Runtime>) {
	let (owner, nested) = {
		let instance = cell.borrow();
		(instance.this_ref(), instance.nested())
	};
	for component in nested {
		component.0.initialize(owner.as_ref(), runtime);
	}
}

impl<C: Component> Mount for RefCell<Instance<C>> {
	fn initialize(&self, parent: Option<&ComponentRef>, runtime: &Weak<Runtime>) {
		{
			let mut instance = self.borrow_mut();
			if instance.initialized {
				return;
			}
			trace!("Initializing {}.", type_name::<C>());
			instance.initialized = true;
			instance.parent = parent.map(ComponentRef::downgrade);
			instance.runtime = runtime.clone();
		}
		initialize_nested(self, runtime);
	}

	fn is_initialized(&self) -> bool {
		self.borrow().initialized
	}

	fn parent(&self) -> Option<ComponentRef> {
		self.borrow().parent.as_ref().and_then(WeakRef::upgrade)
	}

	fn runtime(&self) -> Option<Rc<Runtime>> {
		self.borrow().runtime.upgrade()
	}

	fn expand(&self, runtime: &Runtime) -> String {
		let mut instance = self.borrow_mut();
		let instance = &mut *instance;
		instance.registry = Registry::new();

		let config = runtime.config();
		let template = instance.state.template();
		let source = if config.trim_templates { template.trim() } else { &*template };
		let mut ids = runtime.ids_mut();
		let mut scope = Scope {
			state: &instance.state,
			registry: &mut instance.registry,
			this: &instance.this,
			runtime: runtime.downgrade(),
			ids: &mut **ids,
			config,
		};
		match template::expand(source, &mut scope) {
			Ok(markup) => markup,
			Err(error) => {
				error!("Template expansion of {} failed, continuing with partial output: {}", type_name::<C>(), error);
				error.partial
			}
		}
	}

	fn generate_tree(&self, runtime: &Runtime) -> Fragment {
		let span = trace_span!("generate_tree", component = type_name::<C>());
		let _enter = span.enter();

		initialize_nested(self, &runtime.downgrade());
		let markup = self.expand(runtime);
		let built = load::build(&mut runtime.tree_mut(), &markup, &runtime.config().container);
		let fragment = built.unwrap_or_else(|error| fatal(error));

		resolve::resolve(runtime, self, fragment.root);

		let nodes: Vec<NodeId> = runtime.tree().children(fragment.root).collect();
		self.borrow_mut().nodes = nodes.clone();
		trace!("Generated {} top-level node(s).", nodes.len());
		Fragment { root: fragment.root, nodes }
	}

	fn nodes(&self) -> Vec<NodeId> {
		self.borrow().nodes.clone()
	}

	fn set_nodes(&self, nodes: Vec<NodeId>) {
		self.borrow_mut().nodes = nodes;
	}

	fn type_name(&self) -> &'static str {
		type_name::<C>()
	}

	fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

/// The template's view of an instance during expansion.
struct Scope<'a, C: Component> {
	state: &'a C,
	registry: &'a mut Registry<C>,
	this: &'a Weak<RefCell<Instance<C>>>,
	runtime: Weak<Runtime>,
	ids: &'a mut dyn IdGenerator,
	config: &'a Config,
}

impl<'a, C: Component> Directives for Scope<'a, C> {
	fn field(&self, name: &str) -> Result<Value, TemplateError> {
		C::Field::from_name(name).map(|field| self.state.field(field)).ok_or_else(|| TemplateError::UnknownField(name.to_owned()))
	}

	fn render(&mut self, value: Value) -> String {
		match value {
			Value::Component(component) => self.registry.register_component(&mut *self.ids, self.config, component),
			Value::Components(components) => {
				let mut markers = String::new();
				for component in components {
					markers.push_str(&self.registry.register_component(&mut *self.ids, self.config, component));
				}
				markers
			}
			other => fatal(Violation::NotRenderable(other.kind_name())),
		}
	}

	fn bind(&mut self, field: &str) -> Result<String, TemplateError> {
		let field = C::Field::from_name(field).ok_or_else(|| TemplateError::UnknownField(field.to_owned()))?;
		Ok(self.registry.register_binding(&mut *self.ids, self.config, field, self.this.clone()))
	}

	fn on(&mut self, event: &str, handler: &str) -> Result<String, TemplateError> {
		let handler = C::Handler::from_name(handler).ok_or_else(|| TemplateError::UnknownHandler(handler.to_owned()))?;
		let record = EventRecord::new(event, handler_listener::<C>(self.this.clone(), self.runtime.clone(), handler));
		Ok(self.registry.register_event(&mut *self.ids, self.config, record))
	}
}

/// Calls [`Component::handle`] and submits the requested updates once the instance is released again.
fn handler_listener<C: Component>(owner: Weak<RefCell<Instance<C>>>, runtime: Weak<Runtime>, handler: C::Handler) -> Listener {
	Rc::new(move |event: &Event| {
		let span = trace_span!("handler", component = type_name::<C>(), handler = handler.name(), event = %event.name);
		let _enter = span.enter();

		let owner = match owner.upgrade() {
			Some(owner) => owner,
			None => return warn!("Handler outlived its component; {:?} event ignored.", event.name),
		};
		let mut updates = Updates::new(Handle(Rc::clone(&owner)));
		match owner.try_borrow_mut() {
			Ok(mut instance) => instance.state.handle(handler, event, &mut updates),
			Err(_) => return warn!("Component busy; {:?} event dropped.", event.name),
		}
		match runtime.upgrade() {
			Some(runtime) => runtime.submit(updates.requests),
			None => {
				if !updates.requests.is_empty() {
					warn!("Runtime is gone; {} update(s) dropped.", updates.requests.len());
				}
			}
		}
	})
}

/// Deferred mutation. Runs with the runtime if the owner is mounted, without it otherwise.
pub(crate) type Request = Box<dyn FnOnce(Option<&Runtime>)>;

/// Updates requested by a handler (or [`Handle::update`]).
///
/// They are queued and run in order after the component state is released,
/// so that refreshes never observe a half-updated tree.
pub struct Updates<C: Component> {
	owner: Handle<C>,
	requests: Vec<Request>,
}

impl<C: Component> Updates<C> {
	fn new(owner: Handle<C>) -> Self {
		Self { owner, requests: Vec::new() }
	}

	/// The component these updates are scoped to.
	#[must_use]
	pub fn owner(&self) -> &Handle<C> {
		&self.owner
	}

	/// Requests a full refresh of the owner.
	pub fn refresh(&mut self) {
		let owner = self.owner.to_ref();
		self.requests.push(Box::new(move |runtime: Option<&Runtime>| match runtime {
			Some(runtime) => runtime.refresh(&owner),
			None => trace!("Refresh of unmounted {} skipped.", owner.type_name()),
		}));
	}

	/// Requests appending `item` to the collection `field` of the owner.
	pub fn append<I: Component>(&mut self, field: C::Field, item: Handle<I>) {
		let owner = self.owner.clone();
		let item = item.to_ref();
		self.requests.push(Box::new(move |runtime: Option<&Runtime>| match runtime {
			Some(runtime) => runtime.append(&owner, field, item),
			None => with_collection(&owner, field, |collection| collection.push_ref(item)).unwrap_or_else(|violation| fatal(violation)),
		}));
	}

	/// Requests removing `item` from the collection `field` of the owner.
	pub fn remove<I: Component>(&mut self, field: C::Field, item: &Handle<I>) {
		let owner = self.owner.clone();
		let item = item.to_ref();
		self.requests.push(Box::new(move |runtime: Option<&Runtime>| match runtime {
			Some(runtime) => runtime.remove(&owner, field, &item),
			None => {
				with_collection(&owner, field, |collection| collection.remove_ref(&item));
			}
		}));
	}

	/// Requests removing all host nodes of `component`.
	pub fn delete<I: Component>(&mut self, component: &Handle<I>) {
		let component = component.to_ref();
		self.requests.push(Box::new(move |runtime: Option<&Runtime>| {
			if let Some(runtime) = runtime {
				runtime.delete(&component)
			}
		}));
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.requests.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.requests.is_empty()
	}
}

impl<C: Component> Debug for Updates<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Updates").field("owner", &self.owner).field("requests", &self.requests.len()).finish()
	}
}

/// Runs `f` on the collection stored in `field` of `owner`.
pub(crate) fn with_collection<C: Component, R>(owner: &Handle<C>, field: C::Field, f: impl FnOnce(&mut dyn ChildList) -> R) -> R {
	let mut instance = owner.0.borrow_mut();
	match instance.state.children_mut(field) {
		Some(collection) => f(collection),
		None => fatal(Violation::NotACollection {
			component: type_name::<C>(),
			field: field.name(),
		}),
	}
}

/// Shared ownership of a component instance.
pub struct Handle<C: Component>(pub(crate) Rc<RefCell<Instance<C>>>);

impl<C: Component> Handle<C> {
	pub fn new(state: C) -> Self {
		Self(Rc::new_cyclic(|this| RefCell::new(Instance::new(state, this.clone()))))
	}

	/// Borrows the component state.
	///
	/// # Panics
	///
	/// Iff the state is currently borrowed mutably, i.e. from inside one of its handlers.
	#[must_use]
	pub fn read(&self) -> Ref<'_, C> {
		Ref::map(self.0.borrow(), |instance| &instance.state)
	}

	/// Mutates the component state, then runs the updates requested through `cx`.
	///
	/// Without a runtime (before mounting), collection updates only change the collection.
	pub fn update<R>(&self, f: impl FnOnce(&mut C, &mut Updates<C>) -> R) -> R {
		let mut updates = Updates::new(self.clone());
		let result = {
			let mut instance = match self.0.try_borrow_mut() {
				Ok(instance) => instance,
				Err(_) => fatal(Violation::Reentrant(type_name::<C>())),
			};
			f(&mut instance.state, &mut updates)
		};
		self.submit(updates.requests);
		result
	}

	/// Writes `value` into `field` and refreshes.
	pub fn set_field(&self, field: C::Field, value: impl Into<String>) {
		let value = value.into();
		self.update(move |state, cx| {
			state.set_field(field, value);
			cx.refresh();
		})
	}

	/// Regenerates this component's whole tree and swaps its host nodes.
	pub fn refresh(&self) {
		self.update(|_, cx| cx.refresh())
	}

	/// Appends `item` to the collection `field`, rendering only the new item where possible.
	pub fn append<I: Component>(&self, field: C::Field, item: Handle<I>) {
		self.update(move |_, cx| cx.append(field, item))
	}

	/// Removes `item` (by identity) from the collection `field` together with its host nodes.
	pub fn remove<I: Component>(&self, field: C::Field, item: &Handle<I>) {
		self.update(|_, cx| cx.remove(field, item))
	}

	/// Removes all host nodes of this component.
	pub fn delete(&self) {
		let this = self.clone();
		self.update(move |_, cx| cx.delete(&this))
	}

	/// Top-level nodes of the most recent render.
	#[must_use]
	pub fn nodes(&self) -> Vec<NodeId> {
		self.0.borrow().nodes.clone()
	}

	#[must_use]
	pub fn is_initialized(&self) -> bool {
		self.0.borrow().initialized
	}

	#[must_use]
	pub fn to_ref(&self) -> ComponentRef {
		ComponentRef(Rc::clone(&self.0) as Rc<dyn Mount>)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	fn submit(&self, requests: Vec<Request>) {
		if requests.is_empty() {
			return;
		}
		match Mount::runtime(&*self.0) {
			Some(runtime) => runtime.submit(requests),
			None => {
				for request in requests {
					request(None)
				}
			}
		}
	}
}

impl<C: Component> Clone for Handle<C> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<C: Component> Debug for Handle<C> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handle").field(&type_name::<C>()).finish()
	}
}

impl<C: Component> From<Handle<C>> for ComponentRef {
	fn from(handle: Handle<C>) -> Self {
		handle.to_ref()
	}
}

/// A type-erased reference to a component instance.
#[derive(Clone)]
pub struct ComponentRef(pub(crate) Rc<dyn Mount>);

impl ComponentRef {
	/// Identity comparison.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}

	#[must_use]
	pub fn downcast<C: Component>(&self) -> Option<Handle<C>> {
		Rc::clone(&self.0).into_any().downcast::<RefCell<Instance<C>>>().ok().map(Handle)
	}

	#[must_use]
	pub fn type_name(&self) -> &'static str {
		self.0.type_name()
	}

	/// Top-level nodes of the most recent render.
	#[must_use]
	pub fn nodes(&self) -> Vec<NodeId> {
		self.0.nodes()
	}

	#[must_use]
	pub fn is_initialized(&self) -> bool {
		self.0.is_initialized()
	}

	pub(crate) fn parent(&self) -> Option<ComponentRef> {
		self.0.parent()
	}

	fn downgrade(&self) -> WeakRef {
		WeakRef(Rc::downgrade(&self.0))
	}
}

impl Debug for ComponentRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ComponentRef").field(&self.type_name()).finish()
	}
}

#[derive(Clone)]
struct WeakRef(Weak<dyn Mount>);
impl WeakRef {
	fn upgrade(&self) -> Option<ComponentRef> {
		self.0.upgrade().map(ComponentRef)
	}
}
