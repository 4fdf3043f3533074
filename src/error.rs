//! Error taxonomy.
//!
//! Only [`TemplateError`] is recoverable: expansion stops, the partial output is used and the error is logged.
//! Everything else is a programmer error in a component definition and ends up in [`fatal`].

use crate::tree::NodeId;
use thiserror::Error;
use tracing::error;

/// A template could not be expanded completely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
	#[error("unterminated action starting at byte {offset}")]
	Unterminated { offset: usize },
	#[error("empty action at byte {offset}")]
	EmptyAction { offset: usize },
	#[error("unknown function {0:?}")]
	UnknownFunction(String),
	#[error("unknown field {0:?}")]
	UnknownField(String),
	#[error("unknown handler {0:?}")]
	UnknownHandler(String),
	#[error("{function} expects {expected} argument(s) but got {found}")]
	Arity { function: &'static str, expected: usize, found: usize },
	#[error("invalid argument {0:?}")]
	BadArgument(String),
	#[error("{function} expects a string literal as argument {position}")]
	ExpectedString { function: &'static str, position: usize },
	#[error("unexpected {{{{{0}}}}}")]
	Unbalanced(&'static str),
	#[error("{{{{if}}}} without matching {{{{end}}}}")]
	UnclosedIf,
	#[error("field {0:?} can't be interpolated as text")]
	NotText(String),
}

/// Expansion stopped early. `partial` holds the markup produced up to that point.
#[derive(Debug, Clone, Error)]
#[error("{source} (after {} byte(s) of output)", partial.len())]
pub struct ExpandError {
	pub partial: String,
	#[source]
	pub source: TemplateError,
}

/// The expanded markup couldn't be turned into a node tree.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read markup: {0}")]
	Read(#[from] std::io::Error),
	#[error("no <{0}> container element in parsed markup")]
	MissingContainer(String),
}

/// A structural contract was broken. Never recovered from.
#[derive(Debug, Error)]
pub enum Violation {
	#[error("`render` called with a value that isn't a component or a collection of components ({0})")]
	NotRenderable(&'static str),
	#[error("field {field} of {component} is not a collection")]
	NotACollection { component: &'static str, field: &'static str },
	#[error("collection item of type {found} where {expected} was expected")]
	ItemType { expected: &'static str, found: &'static str },
	#[error("no nested component registered under id {0:?}")]
	UnknownComponent(String),
	#[error("no event registered under id {0:?}")]
	UnknownEvent(String),
	#[error("no binding registered under id {0:?}")]
	UnknownBinding(String),
	#[error("{0} was updated from inside one of its own handlers or updates")]
	Reentrant(&'static str),
	#[error("stale or released node {0:?}")]
	StaleNode(NodeId),
	#[error("markup could not be loaded: {0}")]
	Load(#[from] LoadError),
}

/// A defect in the four-pointer linkage found by [`Tree::check`](`crate::tree::Tree::check`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeDefect {
	#[error("{0:?} is not a live node")]
	Dead(NodeId),
	#[error("{child:?} is linked below {parent:?} but points to parent {found:?}")]
	WrongParent { parent: NodeId, child: NodeId, found: Option<NodeId> },
	#[error("{node:?}.prev_sibling is {found:?}, expected {expected:?}")]
	WrongPrevious { node: NodeId, expected: Option<NodeId>, found: Option<NodeId> },
	#[error("{parent:?}.last_child is {found:?}, expected {expected:?}")]
	WrongLast { parent: NodeId, expected: Option<NodeId>, found: Option<NodeId> },
	#[error("{0:?} is reachable twice")]
	Cycle(NodeId),
}

/// Logs `violation` and aborts the current operation by panicking.
#[cold]
#[track_caller]
pub(crate) fn fatal(violation: impl Into<Violation>) -> ! {
	let violation = violation.into();
	error!("Fatal contract violation: {}", violation);
	panic!("cambium-dom: {}", violation)
}
