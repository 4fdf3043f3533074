#![doc(html_root_url = "https://docs.rs/cambium-dom/0.0.1")]
#![warn(clippy::pedantic)]

//! Component instances rendered from markup templates into a spliceable virtual node tree,
//! materialized onto a host document.
//!
//! A [`Component`] expands its template into markup containing placeholder markers.
//! The markup is [built](`load::build`) into the runtime's [`Tree`], the markers are resolved
//! (nested components spliced in, events and bindings attached) and the result is materialized through a [`Host`].
//!
//! Updates never diff: [`Handle::refresh`] regenerates a component wholesale and swaps its top-level host nodes,
//! while [`Handle::append`] and [`Handle::remove`] touch only the affected collection item.
//!
//! # Logging
//!
//! Everything is traced through [`tracing`].
//! Markup, text and bound values only show up in logs with the `"dangerous-logging"` feature enabled.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod component;
pub mod config;
pub mod error;
pub mod host;
pub mod load;
mod materialize;
pub mod registry;
mod resolve;
pub mod runtime;
pub mod template;
pub mod tree;

pub use component::{ChildList, Collection, Component, ComponentRef, Handle, Name, NoNames, Updates, Value};
pub use config::Config;
pub use error::{ExpandError, LoadError, TemplateError, TreeDefect, Violation};
pub use host::{memory::MemoryHost, web::WebHost, Event, Host, HostId, Listener};
pub use registry::{IdGenerator, SequentialIds, UuidIds};
pub use runtime::Runtime;
pub use tree::{Attribute, EventRecord, Fragment, NodeId, NodeKind, Tree, VirtualNode};
