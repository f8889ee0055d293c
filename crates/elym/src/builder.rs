//! ElementBuilder - construction, lookup and selection
//!
//! The builder is a shared handle: cloning an `ElementBuilder` yields another
//! handle to the same instance. Use [`ElementBuilder::deep_clone`] to copy the
//! underlying element.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use elym_dom::{DomResult, DomTree, Namespace, Node, NodeId, SelectorList};
use elym_html::FragmentContext;

use crate::listeners::ListenerRegistry;
use crate::{Dom, ElymError, ElymResult};

/// State shared by every handle to one builder
///
/// The instance registry keeps this alive, so it holds no `Dom` of its own.
pub(crate) struct BuilderInner {
    pub(crate) root: NodeId,
    pub(crate) selection: RefCell<Vec<NodeId>>,
    pub(crate) listeners: RefCell<ListenerRegistry>,
    pub(crate) data: RefCell<HashMap<NodeId, Rc<dyn Any>>>,
}

impl BuilderInner {
    /// Forget listener and data records of nodes that no longer exist
    pub(crate) fn prune(&self, tree: &DomTree) {
        self.listeners.borrow_mut().retain_nodes(|node| tree.is_live(node));
        self.data.borrow_mut().retain(|&node, _| tree.is_live(node));
    }
}

/// Fluent wrapper around a root element and a selection of nodes
#[derive(Clone)]
pub struct ElementBuilder {
    pub(crate) inner: Rc<BuilderInner>,
    dom: Dom,
}

/// A node, or every selected node of a builder
#[derive(Clone)]
pub enum Target {
    Node(NodeId),
    Builder(ElementBuilder),
}

impl Target {
    /// Nodes this target stands for in `dom`
    ///
    /// Builders from another `Dom` resolve to nothing.
    pub(crate) fn resolve(&self, dom: &Dom) -> Vec<NodeId> {
        match self {
            Target::Node(node) => vec![*node],
            Target::Builder(builder) if Dom::ptr_eq(builder.dom(), dom) => builder.nodes(),
            Target::Builder(_) => {
                tracing::warn!("Ignoring builder that belongs to another document");
                Vec::new()
            }
        }
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl From<ElementBuilder> for Target {
    fn from(builder: ElementBuilder) -> Self {
        Target::Builder(builder)
    }
}

impl From<&ElementBuilder> for Target {
    fn from(builder: &ElementBuilder) -> Self {
        Target::Builder(builder.clone())
    }
}

impl ElementBuilder {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build an element from markup
    ///
    /// Markup starting with an `<svg` tag must produce an `<svg>` root in the
    /// SVG namespace. Anything else yields its first top-level element; other
    /// top-level nodes are dropped.
    pub fn new(dom: &Dom, markup: &str) -> ElymResult<Self> {
        let markup = markup.trim();
        let svg = is_svg_markup(markup);
        let nodes = dom.parse_fragment(markup, &FragmentContext::Template);

        let first = {
            let document = dom.document();
            nodes
                .iter()
                .copied()
                .find(|&node| document.tree.get(node).is_some_and(Node::is_element))
        };
        let root = first.filter(|&node| {
            !svg || (dom.namespace(node) == Some(Namespace::Svg) && dom.tag_name(node).as_deref() == Some("svg"))
        });

        for &node in nodes.iter().filter(|&&node| Some(node) != root) {
            dom.free_subtree(node);
        }

        let Some(root) = root else {
            let reason = if svg { "no valid SVG element" } else { "no valid element" };
            return Err(ElymError::Parse(reason.to_string()));
        };
        tracing::debug!("Built <{}> from markup", dom.tag_name(root).unwrap_or_default());
        Ok(Self::wrap(dom, root, vec![root]))
    }

    /// Wrap existing nodes; the first becomes the root
    pub fn from_element(dom: &Dom, nodes: &[NodeId]) -> ElymResult<Self> {
        let Some(&root) = nodes.first() else {
            return Err(ElymError::InvalidArgument("at least one node is required".to_string()));
        };
        Ok(Self::wrap(dom, root, nodes.to_vec()))
    }

    pub fn from_node(dom: &Dom, node: NodeId) -> Self {
        Self::wrap(dom, node, vec![node])
    }

    /// Wrap the first element in the document matching `selector`
    pub fn select(dom: &Dom, selector: &str) -> ElymResult<Self> {
        let node = dom
            .query_selector(selector)
            .ok_or_else(|| ElymError::NotFound(format!("no element matches '{selector}'")))?;
        Ok(Self::from_node(dom, node))
    }

    /// Wrap every element in the document matching `selector`
    pub fn select_all(dom: &Dom, selector: &str) -> ElymResult<Self> {
        Self::from_element(dom, &dom.query_selector_all(selector))
    }

    /// Build from the first element inside a `<template>` (or any element)
    pub fn create_from_template(dom: &Dom, selector: &str) -> ElymResult<Self> {
        let template = dom
            .query_selector(selector)
            .ok_or_else(|| ElymError::NotFound(format!("no template matches '{selector}'")))?;
        let copy = {
            let mut document = dom.document_mut();
            let content = document.tree.element_children(template).first().copied();
            let content = content.ok_or_else(|| ElymError::Parse("no valid element".to_string()))?;
            document
                .tree
                .deep_clone(content)
                .map_err(|err| ElymError::NotFound(err.to_string()))?
        };
        Ok(Self::wrap(dom, copy, vec![copy]))
    }

    pub(crate) fn wrap(dom: &Dom, root: NodeId, selection: Vec<NodeId>) -> Self {
        let inner = Rc::new(BuilderInner {
            root,
            selection: RefCell::new(selection),
            listeners: RefCell::new(ListenerRegistry::default()),
            data: RefCell::new(HashMap::new()),
        });
        {
            let mut instances = dom.instances();
            let selection = inner.selection.borrow();
            for &node in std::iter::once(&root).chain(selection.iter()) {
                if node.is_valid() {
                    instances.register(node, &inner);
                }
            }
        }
        tracing::trace!("Registered builder rooted at {}", root);
        Self { inner, dom: dom.clone() }
    }

    // ------------------------------------------------------------------
    // Instance lookup
    // ------------------------------------------------------------------

    /// Builder that owns `node`
    pub fn get_instance(dom: &Dom, node: NodeId) -> Option<Self> {
        let inner = dom.instances().get(node)?;
        Some(Self { inner, dom: dom.clone() })
    }

    pub fn is_instance(dom: &Dom, node: NodeId) -> bool {
        Self::get_instance(dom, node).is_some()
    }

    pub fn get_instance_by_selector(dom: &Dom, selector: &str) -> Option<Self> {
        let node = dom.query_selector(selector)?;
        Self::get_instance(dom, node)
    }

    pub fn is_instance_by_selector(dom: &Dom, selector: &str) -> bool {
        Self::get_instance_by_selector(dom, selector).is_some()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select the first descendant of the root matching `selector`
    ///
    /// The selection is left alone when nothing matches.
    pub fn select_child(&self, selector: &str) -> &Self {
        let found = {
            let document = self.dom().document();
            SelectorList::parse(selector).and_then(|list| list.query_first(&document.tree, self.inner.root))
        };
        match found {
            Some(node) => *self.inner.selection.borrow_mut() = vec![node],
            None => tracing::trace!("select_child('{}') matched nothing", selector),
        }
        self
    }

    /// Select every descendant of the root matching `selector`
    pub fn select_children(&self, selector: &str) -> &Self {
        let found = {
            let document = self.dom().document();
            SelectorList::parse(selector)
                .map(|list| list.query_all(&document.tree, self.inner.root))
                .unwrap_or_default()
        };
        if found.is_empty() {
            tracing::trace!("select_children('{}') matched nothing", selector);
        } else {
            *self.inner.selection.borrow_mut() = found;
        }
        self
    }

    pub fn back_to_root(&self) -> &Self {
        *self.inner.selection.borrow_mut() = vec![self.inner.root];
        self
    }

    // ------------------------------------------------------------------
    // Iteration & accessors
    // ------------------------------------------------------------------

    /// Run `callback` for every selected node with its index
    pub fn each(&self, mut callback: impl FnMut(NodeId, usize)) -> &Self {
        for (index, node) in self.nodes().into_iter().enumerate() {
            callback(node, index);
        }
        self
    }

    /// Run `callback` once with this builder
    pub fn call(&self, callback: impl FnOnce(&Self)) -> &Self {
        callback(self);
        self
    }

    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// First selected node
    pub fn node(&self) -> Option<NodeId> {
        self.inner.selection.borrow().first().copied()
    }

    /// Snapshot of the selection
    pub fn nodes(&self) -> Vec<NodeId> {
        self.inner.selection.borrow().clone()
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Apply a tree operation to every selected node
    ///
    /// Failures are logged and skipped. The document stays borrowed for the
    /// whole pass, so `op` must not call back into the builder.
    pub(crate) fn update(&self, action: &str, mut op: impl FnMut(&mut DomTree, NodeId) -> DomResult<()>) {
        let nodes = self.nodes();
        let mut document = self.dom().document_mut();
        for node in nodes {
            if let Err(err) = op(&mut document.tree, node) {
                tracing::warn!("{} skipped {}: {}", action, node, err);
            }
        }
    }
}

impl PartialEq for ElementBuilder {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ElementBuilder {}

impl fmt::Debug for ElementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBuilder")
            .field("root", &self.inner.root)
            .field("selection", &self.inner.selection.borrow())
            .finish()
    }
}

/// Whether markup opens with an `<svg>` tag
fn is_svg_markup(markup: &str) -> bool {
    let Some(head) = markup.get(..4) else {
        return false;
    };
    head.eq_ignore_ascii_case("<svg")
        && matches!(markup[4..].chars().next(), Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/')
}
