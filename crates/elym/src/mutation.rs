//! Tree placement
//!
//! Moves follow DOM semantics: a node attached elsewhere is detached first,
//! so appending one node under several parents leaves it under the last one.

use elym_dom::{Namespace, NodeId};

use crate::{ElementBuilder, Target};

impl ElementBuilder {
    /// Create a `tag` element under every selected node
    ///
    /// Returns a new builder whose selection is the created elements. Under
    /// an SVG parent the element is created in the SVG namespace.
    pub fn append(&self, tag: &str) -> ElementBuilder {
        let mut created = Vec::new();
        {
            let mut document = self.dom().document_mut();
            let tree = &mut document.tree;
            for parent in self.nodes() {
                let ns = match tree.namespace(parent) {
                    Some(Namespace::Svg) => Namespace::Svg,
                    _ => Namespace::Html,
                };
                let child = tree.create_element_ns(ns, tag);
                match tree.append_child(parent, child) {
                    Ok(()) => created.push(child),
                    Err(err) => {
                        tracing::warn!("append('{}') skipped {}: {}", tag, parent, err);
                        tree.remove_subtree(child);
                    }
                }
            }
        }
        let root = created.first().copied().unwrap_or(NodeId::NONE);
        ElementBuilder::wrap(self.dom(), root, created)
    }

    /// Append every item under every selected node
    ///
    /// Builders contribute all of their selected nodes.
    pub fn append_elements<I>(&self, items: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Target>,
    {
        let children: Vec<NodeId> = items
            .into_iter()
            .flat_map(|item| item.into().resolve(self.dom()))
            .collect();
        self.update("append_elements", |tree, parent| {
            children.iter().try_for_each(|&child| tree.append_child(parent, child))
        });
        self
    }

    /// Append `node` under every selected node
    pub fn append_child(&self, node: NodeId) -> &Self {
        self.update("append_child", |tree, parent| tree.append_child(parent, node));
        self
    }

    /// Append a deep copy of `nodes` under every selected node
    pub fn append_children(&self, nodes: &[NodeId]) -> &Self {
        self.update("append_children", |tree, parent| {
            for &node in nodes {
                let copy = tree.deep_clone(node)?;
                tree.append_child(parent, copy)?;
            }
            Ok(())
        });
        self
    }

    /// Move every selected node to the front of each target's children
    pub fn prepend(&self, target: impl Into<Target>) -> &Self {
        let parents = target.into().resolve(self.dom());
        self.update("prepend", |tree, node| {
            parents.iter().try_for_each(|&parent| tree.prepend_child(parent, node))
        });
        self
    }

    /// Move every selected node to the end of each target's children
    pub fn append_to(&self, target: impl Into<Target>) -> &Self {
        let parents = target.into().resolve(self.dom());
        self.update("append_to", |tree, node| {
            parents.iter().try_for_each(|&parent| tree.append_child(parent, node))
        });
        self
    }

    /// Move every selected node right before `reference`
    pub fn insert_before(&self, reference: impl Into<Target>) -> &Self {
        let Some(reference) = reference.into().resolve(self.dom()).first().copied() else {
            return self;
        };
        let Some(parent) = self.dom().parent(reference) else {
            tracing::trace!("insert_before: {} has no parent", reference);
            return self;
        };
        self.update("insert_before", |tree, node| {
            if node == reference {
                return Ok(());
            }
            tree.insert_before(parent, node, Some(reference))
        });
        self
    }

    /// Move every selected node right after `reference`, keeping their order
    pub fn insert_after(&self, reference: impl Into<Target>) -> &Self {
        let Some(reference) = reference.into().resolve(self.dom()).first().copied() else {
            return self;
        };
        let Some(parent) = self.dom().parent(reference) else {
            tracing::trace!("insert_after: {} has no parent", reference);
            return self;
        };
        let mut anchor = reference;
        self.update("insert_after", |tree, node| {
            if node == anchor {
                return Ok(());
            }
            let next = tree.next_sibling(anchor);
            tree.insert_before(parent, node, next)?;
            anchor = node;
            Ok(())
        });
        self
    }

    /// Tear down every selected node
    ///
    /// Listeners recorded by this builder are detached, bound data is
    /// dropped, instance entries this builder owns are removed and the node
    /// is detached from the document. The detached subtree is freed unless a
    /// node in it belongs to another builder that is still held, in which
    /// case it stays allocated for that builder. Stale nodes are skipped.
    pub fn remove(&self) -> &Self {
        let nodes = self.nodes();
        for &node in &nodes {
            self.detach_listeners(node);
            self.inner.data.borrow_mut().remove(&node);
            {
                let mut instances = self.dom().instances();
                if instances.is_owned_by(node, &self.inner) {
                    instances.unregister(node);
                }
            }
            if let Err(err) = self.dom().document_mut().tree.detach(node) {
                tracing::trace!("remove skipped {}: {}", node, err);
            }
        }
        self.dom().discard(nodes);
        self.inner.prune(&self.dom().document().tree);
        tracing::debug!("Removed selection of builder rooted at {}", self.inner.root);
        self
    }
}
