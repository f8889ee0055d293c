//! Elym
//!
//! A fluent element builder over an arena DOM.
//!
//! An [`ElementBuilder`] wraps a root element and a current selection of
//! nodes. Chained calls narrow the selection, read or write node state, move
//! nodes around the tree, and keep per-node listener and data bookkeeping.
//! Every node a builder owns is registered on its [`Dom`], so a node can be
//! mapped back to its builder.
//!
//! # Example
//! ```rust
//! use elym::{Dom, ElementBuilder};
//!
//! let dom = Dom::new();
//! let list = ElementBuilder::new(&dom, "<ul class='menu'></ul>").unwrap();
//! list.append("li").set_text("Home").set_attr("data-route", "/");
//! list.append_to(dom.body());
//!
//! assert_eq!(list.html(), "<li data-route=\"/\">Home</li>");
//! assert!(ElementBuilder::is_instance_by_selector(&dom, "ul.menu"));
//! ```

mod accessors;
mod binding;
mod builder;
mod config;
mod error;
mod host;
mod listeners;
mod mutation;
mod registry;

pub use builder::{ElementBuilder, Target};
pub use config::Config;
pub use error::{ElymError, ElymResult};
pub use host::Dom;

pub use elym_dom::{Event, EventPhase, Listener, ListenerOptions, Namespace, NodeId, PropertyValue};
pub use elym_html::ParseOptions;

// Re-export sub-crates for advanced usage
pub use elym_dom as dom;
pub use elym_html as html;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
