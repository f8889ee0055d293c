//! Instance registry: node → owning builder
//!
//! Entries hold the builder state strongly, so a builder stays reachable
//! from its nodes after the caller drops its handle. Entries are evicted
//! when their node is removed or freed, or when the node is re-wrapped.

use std::collections::HashMap;
use std::rc::Rc;

use elym_dom::NodeId;

use crate::builder::BuilderInner;

#[derive(Default)]
pub(crate) struct InstanceRegistry {
    entries: HashMap<NodeId, Rc<BuilderInner>>,
}

impl InstanceRegistry {
    /// Associate `node` with `owner`, replacing any previous owner
    pub fn register(&mut self, node: NodeId, owner: &Rc<BuilderInner>) {
        if self.entries.insert(node, Rc::clone(owner)).is_some() {
            tracing::trace!("Re-registered node {}", node);
        }
    }

    pub fn unregister(&mut self, node: NodeId) -> Option<Rc<BuilderInner>> {
        self.entries.remove(&node)
    }

    pub fn get(&self, node: NodeId) -> Option<Rc<BuilderInner>> {
        self.entries.get(&node).cloned()
    }

    pub fn is_owned_by(&self, node: NodeId, owner: &Rc<BuilderInner>) -> bool {
        self.entries.get(&node).is_some_and(|entry| Rc::ptr_eq(entry, owner))
    }

    /// Whether the owner of `node` is reachable from outside the registry
    ///
    /// Every entry of an owner holds one strong count; anything above that
    /// is a handle, a listener capture or some other outside reference.
    pub fn is_held(&self, node: NodeId) -> bool {
        let Some(owner) = self.entries.get(&node) else {
            return false;
        };
        let entries = self.entries.values().filter(|entry| Rc::ptr_eq(entry, owner)).count();
        Rc::strong_count(owner) > entries
    }

    /// Drop the entries of `nodes`, returning each evicted owner once
    pub fn evict(&mut self, nodes: &[NodeId]) -> Vec<Rc<BuilderInner>> {
        let mut owners: Vec<Rc<BuilderInner>> = Vec::new();
        for node in nodes {
            if let Some(owner) = self.entries.remove(node) {
                if !owners.iter().any(|seen| Rc::ptr_eq(seen, &owner)) {
                    owners.push(owner);
                }
            }
        }
        owners
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
