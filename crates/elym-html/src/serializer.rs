//! HTML Serialization (innerHTML/outerHTML)
//!
//! Serializes arena nodes back to markup:
//! - HTML escaping for text and attribute values
//! - Void elements without end tags (HTML namespace only)
//! - Raw text for `<script>` and `<style>`

use elym_dom::{DomTree, Namespace, NodeData, NodeId};

/// HTML serializer
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Whether to format output with indentation
    pub pretty_print: bool,
    pub indent: String,
}

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, 0);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, 0);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, depth: usize) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                self.serialize_children(tree, node_id, output, depth);
            }
            NodeData::Element(elem) => {
                let tag = tree.resolve(elem.name.local);
                let html = elem.name.ns == Namespace::Html;
                let is_void = html && VOID_ELEMENTS.contains(&tag);
                let is_raw = html && RAW_TEXT_ELEMENTS.contains(&tag);

                self.newline(output, depth);

                output.push('<');
                output.push_str(tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(tree.resolve(attr.name));
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }
                output.push('>');

                if is_void {
                    return;
                }

                if is_raw {
                    self.serialize_children_raw(tree, node_id, output);
                } else {
                    self.serialize_children(tree, node_id, output, depth + 1);
                }

                if self.pretty_print && node.first_child.is_valid() && !is_raw {
                    output.push('\n');
                    for _ in 0..depth {
                        output.push_str(&self.indent);
                    }
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => {
                escape_text(&text.content, output);
            }
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
        }
    }

    fn newline(&self, output: &mut String, depth: usize) {
        if self.pretty_print && depth > 0 {
            output.push('\n');
            for _ in 0..depth {
                output.push_str(&self.indent);
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String, depth: usize) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output, depth);
        }
    }

    fn serialize_children_raw(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (_, child) in tree.children(parent_id) {
            if let Some(text) = child.as_text() {
                output.push_str(text);
            }
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Utility: Get innerHTML of an element
pub fn inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// Utility: Get outerHTML of an element
pub fn outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut output = String::new();
        escape_text("Hello <world> & \"friends\"", &mut output);
        assert_eq!(output, "Hello &lt;world&gt; &amp; \"friends\"");
    }

    #[test]
    fn test_escape_attribute() {
        let mut output = String::new();
        escape_attribute("a <b> & \"c\"", &mut output);
        assert_eq!(output, "a <b> &amp; &quot;c&quot;");
    }

    #[test]
    fn test_outer_and_inner() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "class", "x").unwrap();
        tree.set_attribute(div, "hidden", "").unwrap();
        let br = tree.create_element("br");
        let text = tree.create_text("a<b");
        tree.append_child(div, text).unwrap();
        tree.append_child(div, br).unwrap();

        assert_eq!(outer_html(&tree, div), "<div class=\"x\" hidden>a&lt;b<br></div>");
        assert_eq!(inner_html(&tree, div), "a&lt;b<br>");
    }

    #[test]
    fn test_svg_elements_get_end_tags() {
        let mut tree = DomTree::new();
        let svg = tree.create_element_ns(Namespace::Svg, "svg");
        let path = tree.create_element_ns(Namespace::Svg, "path");
        tree.append_child(svg, path).unwrap();

        assert_eq!(outer_html(&tree, svg), "<svg><path></path></svg>");
    }

    #[test]
    fn test_raw_text() {
        let mut tree = DomTree::new();
        let style = tree.create_element("style");
        let css = tree.create_text("a > b { color: red }");
        tree.append_child(style, css).unwrap();
        assert_eq!(outer_html(&tree, style), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn test_pretty_print() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        tree.append_child(ul, li).unwrap();
        assert_eq!(HtmlSerializer::pretty().serialize_outer(&tree, ul), "<ul>\n  <li></li>\n</ul>");
    }
}
