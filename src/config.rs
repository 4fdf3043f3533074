/// Runtime-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Element whose children form a component's top-level node list after parsing.
	pub container: String,
	/// Prefix of all placeholder markers.
	pub prefix: String,
	/// Event on which bound fields receive the target's value.
	pub binding_event: String,
	/// Whether templates are trimmed before expansion.
	pub trim_templates: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			container: "body".to_owned(),
			prefix: "cambium".to_owned(),
			binding_event: "change".to_owned(),
			trim_templates: true,
		}
	}
}

impl Config {
	#[must_use]
	pub fn with_container(mut self, container: impl Into<String>) -> Self {
		self.container = container.into();
		self
	}

	#[must_use]
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	#[must_use]
	pub fn with_binding_event(mut self, event: impl Into<String>) -> Self {
		self.binding_event = event.into();
		self
	}

	#[must_use]
	pub fn with_trim_templates(mut self, trim: bool) -> Self {
		self.trim_templates = trim;
		self
	}

	/// Tag of component placeholder elements, i.e. `cambium-component`.
	#[must_use]
	pub fn component_tag(&self) -> String {
		format!("{}-component", self.prefix)
	}

	/// Attribute name prefix of binding markers, i.e. `cambium-bind-`.
	#[must_use]
	pub fn binding_prefix(&self) -> String {
		format!("{}-bind-", self.prefix)
	}

	/// Attribute name prefix of event markers, i.e. `cambium-on-`.
	#[must_use]
	pub fn event_prefix(&self) -> String {
		format!("{}-on-", self.prefix)
	}
}
