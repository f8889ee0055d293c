//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the result into the arena tree.
//! Fragments go through html5ever's fragment algorithm with a context
//! element, so table rows, list items and SVG children land where they
//! would under that element.

use elym_dom::{Document, DomTree, Namespace, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, ns, parse_document, parse_fragment, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use serde::{Deserialize, Serialize};

/// Parser options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes
    pub preserve_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: true,
        }
    }
}

/// Element a fragment is parsed as the children of
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FragmentContext {
    /// Contents of a `<template>`: any element may appear at the top level
    #[default]
    Template,
    /// Children of an element with this namespace and local name
    Element { ns: Namespace, local: String },
}

impl FragmentContext {
    pub fn element(ns: Namespace, local: &str) -> Self {
        Self::Element {
            ns,
            local: local.to_string(),
        }
    }

    fn qual_name(&self) -> QualName {
        match self {
            Self::Template => QualName::new(None, ns!(html), local_name!("template")),
            Self::Element { ns, local } => QualName::new(None, ns.uri().into(), LocalName::from(local.as_str())),
        }
    }
}

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert_children(&dom.document, &mut tree, root);

        let document = Document::from_tree(tree, url);
        tracing::debug!("Parsed {} nodes", document.tree.len());
        document
    }

    /// Parse a markup fragment into detached nodes owned by `tree`
    ///
    /// Returns the fragment's top-level nodes in source order.
    pub fn parse_fragment(&self, tree: &mut DomTree, markup: &str, context: &FragmentContext) -> Vec<NodeId> {
        let dom = parse_fragment(RcDom::default(), Default::default(), context.qual_name(), Vec::new(), false)
            .one(markup);

        // The fragment algorithm parents everything under a synthetic <html>
        let top_level: Vec<Handle> = dom
            .document
            .children
            .borrow()
            .iter()
            .flat_map(|root| root.children.borrow().iter().cloned().collect::<Vec<_>>())
            .collect();

        let nodes: Vec<NodeId> = top_level
            .iter()
            .filter_map(|handle| self.convert_node(handle, tree))
            .collect();
        tracing::trace!("Parsed fragment into {} top-level nodes", nodes.len());
        nodes
    }

    /// Convert an RcDom node (and its subtree) into a detached arena node
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
        let id = match &handle.data {
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
            RcNodeData::Doctype {
                name,
                public_id,
                system_id,
            } => tree.create_doctype(name, public_id, system_id),
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !self.options.preserve_whitespace && text.trim().is_empty() {
                    return None;
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let id = tree.create_element_ns(Namespace::from_uri(&name.ns), &name.local);
                for attr in attrs.borrow().iter() {
                    let qualified = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    if let Err(err) = tree.set_attribute(id, &qualified, &attr.value) {
                        tracing::warn!("Dropping attribute {}: {}", qualified, err);
                    }
                }
                // Template contents are kept as ordinary children
                if let Some(content) = template_contents.borrow().as_ref() {
                    self.convert_children(content, tree, id);
                }
                id
            }
        };
        self.convert_children(handle, tree, id);
        Some(id)
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        for child in handle.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree) {
                if let Err(err) = tree.append_child(parent, id) {
                    tracing::warn!("Dropping parsed node: {}", err);
                }
            }
        }
    }
}
