//! Document - High-level document API

use crate::{DomTree, NodeId, SelectorList};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new() -> Self {
        Self::with_url("about:blank")
    }

    pub fn with_url(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let root = tree.root();
        tree.link_before(root, html, NodeId::NONE);
        tree.link_before(html, head, NodeId::NONE);
        tree.link_before(html, body, NodeId::NONE);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Wrap a parsed tree, locating html/head/body
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let mut document = Self {
            tree,
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        };
        document.finalize();
        document
    }

    /// Re-locate the cached html/head/body elements
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self.child_named(root, "html").unwrap_or(NodeId::NONE);
        self.head_element = self.child_named(self.html_element, "head").unwrap_or(NodeId::NONE);
        self.body_element = self.child_named(self.html_element, "body").unwrap_or(NodeId::NONE);
    }

    fn child_named(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.tree
            .element_children(parent)
            .into_iter()
            .find(|&id| self.tree.tag_name(id) == Some(tag))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first `<title>` in `<head>`
    pub fn title(&self) -> String {
        self.child_named(self.head_element, "title")
            .map(|title| self.tree.text_content(title))
            .unwrap_or_default()
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        SelectorList::parse(selector)?.query_first(&self.tree, self.tree.root())
    }

    /// All elements in the document matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        SelectorList::parse(selector)
            .map(|list| list.query_all(&self.tree, self.tree.root()))
            .unwrap_or_default()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&node| self.tree.get_attribute(node, "id") == Some(id))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
