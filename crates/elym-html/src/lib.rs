//! Elym HTML
//!
//! Markup parsing built on html5ever, and serialization back to markup,
//! for the Elym arena DOM.

mod parser;
mod serializer;

pub use elym_dom::{Document, DomTree, Node, NodeId};
pub use parser::{FragmentContext, HtmlParser, ParseOptions};
pub use serializer::{inner_html, outer_html, HtmlSerializer};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML string with a base URL
pub fn parse_with_url(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
