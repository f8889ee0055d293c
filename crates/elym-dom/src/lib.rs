//! Elym DOM - Document Object Model
//!
//! Arena-based DOM tree backing the element builder.
//!
//! Nodes live in a slot arena and are addressed by generational [`NodeId`]
//! handles: freeing a node bumps its slot generation, so handles that outlive
//! their node resolve to nothing instead of aliasing whatever reuses the slot.

mod classlist;
mod document;
mod error;
mod events;
mod interner;
mod node;
mod selector;
mod style;
mod tree;

pub use classlist::TokenList;
pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{dispatch_event, Event, EventPhase, Listener, ListenerOptions, RegisteredListener};
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Namespace, Node, NodeData, PropertyValue, QualName};
pub use selector::{Selector, SelectorList};
pub use style::StyleDeclaration;
pub use tree::{Children, DomTree};

/// Node identifier (generational index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Invalid node ID, used for absent links
    pub const NONE: NodeId = NodeId {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Check if this ID points at a slot at all
    ///
    /// A valid ID may still be stale; use [`DomTree::is_live`] for that.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.index != u32::MAX
    }

    /// Slot index
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}v{}", self.index, self.generation)
        } else {
            f.write_str("#none")
        }
    }
}
