//! Dom host handle
//!
//! A `Dom` owns one [`Document`] plus the instance registry that maps its
//! nodes back to builders. Handles are cheap to clone and all clones share
//! the same document.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use elym_dom::{dispatch_event, Document, Event, Namespace, NodeId};
use elym_html::{FragmentContext, HtmlParser, HtmlSerializer};

use crate::registry::InstanceRegistry;
use crate::Config;

struct DomShared {
    document: RefCell<Document>,
    instances: RefCell<InstanceRegistry>,
    parser: HtmlParser,
    config: Config,
}

/// Shared handle to a document and its instance registry
#[derive(Clone)]
pub struct Dom {
    shared: Rc<DomShared>,
}

impl Dom {
    /// Empty document with an html/head/body skeleton
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let document = Document::with_url(&config.url);
        Self::from_document(document, config)
    }

    /// Parse a full HTML document
    pub fn parse(html: &str) -> Self {
        Self::parse_with_config(html, Config::default())
    }

    pub fn parse_with_config(html: &str, config: Config) -> Self {
        let document = HtmlParser::with_options(config.parse).parse_with_url(html, &config.url);
        Self::from_document(document, config)
    }

    fn from_document(document: Document, config: Config) -> Self {
        Self {
            shared: Rc::new(DomShared {
                document: RefCell::new(document),
                instances: RefCell::new(InstanceRegistry::default()),
                parser: HtmlParser::with_options(config.parse),
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Borrow the document
    ///
    /// Panics if the document is mutably borrowed, which only happens when
    /// called from inside another borrow of the same document.
    pub fn document(&self) -> Ref<'_, Document> {
        self.shared.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.shared.document.borrow_mut()
    }

    pub fn body(&self) -> NodeId {
        self.document().body()
    }

    pub fn head(&self) -> NodeId {
        self.document().head()
    }

    pub fn document_element(&self) -> NodeId {
        self.document().document_element()
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.document().query_selector(selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.document().query_selector_all(selector)
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.document().tree.contains(ancestor, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.document().tree.parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.document().tree.child_ids(node)
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.document().tree.is_live(node)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.document().tree.tag_name(node).map(str::to_string)
    }

    pub fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.document().tree.namespace(node)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        HtmlSerializer::new().serialize_outer(&self.document().tree, node)
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        HtmlSerializer::new().serialize_inner(&self.document().tree, node)
    }

    /// Dispatch a bubbling, cancelable event of `event_type` at `node`
    pub fn dispatch(&self, node: NodeId, event_type: &str) -> bool {
        self.dispatch_event(node, &mut Event::new(event_type))
    }

    /// Dispatch `event` at `node`; returns `false` if the default was prevented
    pub fn dispatch_event(&self, node: NodeId, event: &mut Event) -> bool {
        dispatch_event(&self.shared.document, node, event)
    }

    /// Number of nodes currently mapped to a builder
    pub fn registry_len(&self) -> usize {
        self.shared.instances.borrow().len()
    }

    pub fn ptr_eq(a: &Dom, b: &Dom) -> bool {
        Rc::ptr_eq(&a.shared, &b.shared)
    }

    pub(crate) fn instances(&self) -> RefMut<'_, InstanceRegistry> {
        self.shared.instances.borrow_mut()
    }

    /// Parse markup into detached nodes of this document
    pub(crate) fn parse_fragment(&self, markup: &str, context: &FragmentContext) -> Vec<NodeId> {
        let mut document = self.document_mut();
        self.shared.parser.parse_fragment(&mut document.tree, markup, context)
    }

    /// Remove a subtree from the document and free it
    ///
    /// Registry entries of every freed node are evicted and the evicted
    /// builders forget their records of the freed nodes. Returns the freed IDs.
    pub(crate) fn free_subtree(&self, node: NodeId) -> Vec<NodeId> {
        let freed = self.document_mut().tree.remove_subtree(node);
        let owners = self.instances().evict(&freed);
        let document = self.document();
        for owner in owners {
            owner.prune(&document.tree);
        }
        freed
    }

    /// Free detached subtrees that nothing refers to any more
    ///
    /// A subtree is kept (detached) when it was re-attached elsewhere or
    /// when any node in it belongs to a builder that is still held outside
    /// the registry.
    pub(crate) fn discard(&self, detached: Vec<NodeId>) {
        let mut free = Vec::new();
        {
            let document = self.document();
            let instances = self.shared.instances.borrow();
            for node in detached {
                if !document.tree.is_live(node) || document.tree.parent(node).is_some() {
                    continue;
                }
                let held = instances.is_held(node)
                    || document.tree.descendants(node).into_iter().any(|d| instances.is_held(d));
                if held {
                    tracing::trace!("Keeping detached subtree {}", node);
                } else {
                    free.push(node);
                }
            }
        }
        for node in free {
            self.free_subtree(node);
        }
    }

    /// Context to parse markup for children of `node` in
    ///
    /// Elements parse as their own children; anything else as template contents.
    pub(crate) fn fragment_context(&self, node: NodeId) -> FragmentContext {
        let document = self.document();
        match (document.tree.namespace(node), document.tree.tag_name(node)) {
            (Some(ns), Some(local)) => FragmentContext::element(ns, local),
            _ => FragmentContext::Template,
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("url", &self.shared.config.url)
            .field("instances", &self.shared.instances.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let dom = Dom::parse("<html><head><title>T</title></head><body><main id=m></main></body></html>");
        assert_eq!(dom.document().title(), "T");
        let main = dom.query_selector("#m").unwrap();
        assert_eq!(dom.parent(main), Some(dom.body()));
        assert_eq!(dom.tag_name(main).as_deref(), Some("main"));
    }

    #[test]
    fn test_clones_share_document() {
        let dom = Dom::new();
        let other = dom.clone();
        assert!(Dom::ptr_eq(&dom, &other));
        assert!(!Dom::ptr_eq(&dom, &Dom::new()));
    }

    #[test]
    fn test_discard_frees_unowned_subtrees() {
        let dom = Dom::new();
        let nodes = dom.parse_fragment("<p><b>x</b></p>", &FragmentContext::Template);
        let b = dom.children(nodes[0])[0];
        dom.discard(nodes.clone());
        assert!(!dom.is_live(nodes[0]));
        assert!(!dom.is_live(b));
    }

    #[test]
    fn test_fragment_context() {
        let dom = Dom::new();
        let svg = dom.document_mut().tree.create_element_ns(Namespace::Svg, "svg");
        assert_eq!(dom.fragment_context(svg), FragmentContext::element(Namespace::Svg, "svg"));
        assert_eq!(dom.fragment_context(dom.body()), FragmentContext::element(Namespace::Html, "body"));
        assert_eq!(dom.fragment_context(dom.document().tree.root()), FragmentContext::Template);
    }
}
