//! DOM Tree (arena-based allocation)
//!
//! Slots are reused after a subtree is freed. Every slot carries a
//! generation that is bumped on free, and a [`NodeId`] only resolves while
//! its generation matches the slot's.

use crate::node::{Namespace, Node, NodeData, QualName};
use crate::{DomError, DomResult, InternedString, NodeId, StringInterner};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::with_capacity(64),
            free: Vec::new(),
            root: NodeId::NONE,
            interner: StringInterner::new(),
        };
        tree.root = tree.alloc(Node::document());
        tree
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index, 0)
    }

    /// Get a node by ID; `None` for stale or foreign handles
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Whether `id` still refers to an allocated node
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes, document node included
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    pub fn intern(&mut self, s: &str) -> InternedString {
        self.interner.intern(s)
    }

    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached HTML element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_ns(Namespace::Html, tag)
    }

    pub fn create_element_ns(&mut self, ns: Namespace, tag: &str) -> NodeId {
        let local = self.interner.intern(tag);
        self.alloc(Node::element(QualName::new(ns, local)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.to_string())))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        parent.is_valid().then_some(parent)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let next = self.get(id)?.next_sibling;
        next.is_valid().then_some(next)
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Descendants of `id` in document (pre-)order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id);
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut kids = self.child_ids(current);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Inclusive containment: `ancestor == node` or an ancestor of it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_live(ancestor) || !self.is_live(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node is connected to the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let first = self.node(parent)?.first_child;
        self.insert_before(parent, child, first.is_valid().then_some(first))
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if matches!(self.node(child)?.data, NodeData::Document) {
            return Err(DomError::InvalidNodeType(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let mut next = match reference {
            Some(reference) => {
                if self.node(reference)?.parent != parent {
                    return Err(DomError::NotAChild {
                        parent,
                        child: reference,
                    });
                }
                reference
            }
            None => NodeId::NONE,
        };
        if next == child {
            next = self.node(child)?.next_sibling;
        }

        self.unlink(child);
        self.link_before(parent, child, next);
        Ok(())
    }

    /// Detach a node from its parent; no-op when already detached
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Replace all children of `parent` with `children`
    ///
    /// Returns the displaced children, detached but still allocated.
    pub fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) -> DomResult<Vec<NodeId>> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::InvalidNodeType(parent));
        }
        // Validate up front so a failed insert never strands the old children
        for &child in children {
            if matches!(self.node(child)?.data, NodeData::Document) {
                return Err(DomError::InvalidNodeType(child));
            }
            if self.contains(child, parent) {
                return Err(DomError::HierarchyRequest { parent, child });
            }
        }
        let old = self.child_ids(parent);
        for &child in &old {
            self.unlink(child);
        }
        for &child in children {
            self.append_child(parent, child)?;
        }
        Ok(old)
    }

    /// Detach a subtree and free every slot in it
    ///
    /// Returns the freed IDs (the subtree root first). Stale IDs free nothing.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.is_live(id) || id == self.root {
            return Vec::new();
        }
        self.unlink(id);

        let mut freed = vec![id];
        freed.extend(self.descendants(id));
        for &node in &freed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
        }
        tracing::trace!("Freed {} nodes under {}", freed.len(), id);
        freed
    }

    /// Deep-clone a subtree into a new detached subtree
    ///
    /// Attributes and properties are copied, event listeners are not.
    pub fn deep_clone(&mut self, id: NodeId) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        let copy = self.alloc(Node::new(data));
        for child in self.child_ids(id) {
            let child_copy = self.deep_clone(child)?;
            self.link_before(copy, child_copy, NodeId::NONE);
        }
        Ok(copy)
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if let Some(prev_node) = self.get_mut(prev) {
            prev_node.next_sibling = next;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.first_child = next;
        }
        if let Some(next_node) = self.get_mut(next) {
            next_node.prev_sibling = prev;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Link a detached `child` under `parent` before `next` (NONE = append)
    pub(crate) fn link_before(&mut self, parent: NodeId, child: NodeId, next: NodeId) {
        let prev = match self.get(next) {
            Some(next_node) => next_node.prev_sibling,
            None => self.get(parent).map_or(NodeId::NONE, |p| p.last_child),
        };

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if let Some(prev_node) = self.get_mut(prev) {
            prev_node.next_sibling = child;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.first_child = child;
        }
        if let Some(next_node) = self.get_mut(next) {
            next_node.prev_sibling = child;
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.last_child = child;
        }
    }

    // ------------------------------------------------------------------
    // Element data
    // ------------------------------------------------------------------

    /// Tag name as stored (lowercase for HTML, case-preserved for SVG)
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name.local))
    }

    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        Some(self.get(id)?.as_element()?.name.ns)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.interner.lookup(name)?;
        self.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = self.interner.intern(name);
        let elem = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        elem.set_attr(name, value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let Some(name) = self.interner.lookup(name) else {
            return Ok(None);
        };
        let elem = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        Ok(elem.remove_attr(name))
    }

    /// Attribute (name, value) pairs in source order
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.get(id)
            .and_then(Node::as_element)
            .map(|elem| {
                elem.attrs
                    .iter()
                    .map(|a| (self.resolve(a.name), a.value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) => text.content.clone(),
            NodeData::Comment(text) => text.clone(),
            NodeData::Doctype { .. } => String::new(),
            NodeData::Element(_) | NodeData::Document => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
        }
    }

    /// Set text content, returning displaced children (detached, still allocated)
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<Vec<NodeId>> {
        if self.node(id)?.is_container() {
            let children = if text.is_empty() {
                Vec::new()
            } else {
                vec![self.create_text(text)]
            };
            return self.replace_children(id, &children);
        }
        match &mut self.node_mut(id)?.data {
            NodeData::Text(data) => data.content = text.to_string(),
            NodeData::Comment(data) => *data = text.to_string(),
            _ => {}
        }
        Ok(Vec::new())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
