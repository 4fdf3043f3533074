//! Per-render-pass bookkeeping of everything that placeholders in expanded markup refer to.

use crate::{
	component::{Component, ComponentRef, Instance},
	config::Config,
	host::{Event, Listener},
	tree::EventRecord,
};
use core::{cell::RefCell, fmt::Debug};
use hashbrown::HashMap;
use std::rc::{Rc, Weak};
use tracing::warn;
use uuid::Uuid;

/// Source of placeholder identifiers.
///
/// Identifiers must be unique among those handed out during one render pass
/// and must not contain `<`, `&` or `"`.
pub trait IdGenerator: Debug {
	fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;
impl IdGenerator for UuidIds {
	fn next_id(&mut self) -> String {
		Uuid::new_v4().to_string()
	}
}

/// `1`, `2`, `3`, … Reproducible, which is handy in tests.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
	issued: u64,
}
impl SequentialIds {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}
impl IdGenerator for SequentialIds {
	fn next_id(&mut self) -> String {
		self.issued += 1;
		self.issued.to_string()
	}
}

/// A field of the owning instance that receives values from the host.
pub(crate) struct BindingRecord<C: Component> {
	pub field: C::Field,
	owner: Weak<RefCell<Instance<C>>>,
}
impl<C: Component> BindingRecord<C> {
	/// Writes the event's value into the bound field. Doesn't refresh anything.
	pub fn write(&self, event: &Event) {
		let value = match &event.value {
			Some(value) => value.clone(),
			None => return warn!("{:?} event without value for binding {:?}; ignored.", event.name, self.field),
		};
		let owner = match self.owner.upgrade() {
			Some(owner) => owner,
			None => return warn!("Binding {:?} outlived its component; ignored.", self.field),
		};
		let borrow = owner.try_borrow_mut();
		match borrow {
			Ok(mut instance) => {
				if cfg!(feature = "dangerous-logging") {
					tracing::trace!("Writing {:?} into {:?}", value, self.field);
				}
				instance.state_mut().set_field(self.field, value);
			}
			Err(_) => warn!("Component busy while writing binding {:?}; value dropped.", self.field),
		}
	}

	/// The synthetic event that performs [`write`](`BindingRecord::write`).
	#[must_use]
	pub fn into_event(self, name: &str) -> EventRecord {
		let handler: Listener = Rc::new(move |event: &Event| self.write(event));
		EventRecord::new(name, handler)
	}
}

/// The three id-keyed maps of one render pass.
pub(crate) struct Registry<C: Component> {
	components: HashMap<String, ComponentRef>,
	events: HashMap<String, EventRecord>,
	bindings: HashMap<String, BindingRecord<C>>,
}

impl<C: Component> Default for Registry<C> {
	fn default() -> Self {
		Self {
			components: HashMap::new(),
			events: HashMap::new(),
			bindings: HashMap::new(),
		}
	}
}

impl<C: Component> Registry<C> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `component` and returns its placeholder element.
	pub fn register_component(&mut self, ids: &mut dyn IdGenerator, config: &Config, component: ComponentRef) -> String {
		let id = ids.next_id();
		let tag = config.component_tag();
		let marker = format!("<{tag}>{id}</{tag}>", tag = tag, id = id);
		self.components.insert(id, component);
		marker
	}

	/// Stores `record` and returns its placeholder attribute.
	pub fn register_event(&mut self, ids: &mut dyn IdGenerator, config: &Config, record: EventRecord) -> String {
		let id = ids.next_id();
		self.events.insert(id.clone(), record);
		format!("{}{}=\"{}\"", config.event_prefix(), self.events.len(), id)
	}

	/// Stores a binding of `field` on `owner` and returns its placeholder attribute.
	pub fn register_binding(&mut self, ids: &mut dyn IdGenerator, config: &Config, field: C::Field, owner: Weak<RefCell<Instance<C>>>) -> String {
		let id = ids.next_id();
		self.bindings.insert(id.clone(), BindingRecord { field, owner });
		format!("{}{}=\"{}\"", config.binding_prefix(), self.bindings.len(), id)
	}

	pub fn take_component(&mut self, id: &str) -> Option<ComponentRef> {
		self.components.remove(id)
	}

	pub fn take_event(&mut self, id: &str) -> Option<EventRecord> {
		self.events.remove(id)
	}

	pub fn take_binding(&mut self, id: &str) -> Option<BindingRecord<C>> {
		self.bindings.remove(id)
	}

	/// Records not consumed by resolution yet.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.components.len() + self.events.len() + self.bindings.len()
	}
}
