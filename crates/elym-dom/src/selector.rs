//! CSS Selectors
//!
//! querySelector / querySelectorAll / matches over the arena tree.
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `=`, `~=`, `|=`, `^=`, `$=`, `*=`), the pseudo-classes
//! `:first-child`, `:last-child`, `:only-child`, `:empty`, `:root` and
//! `:not(<compound>)`, the four combinators, and comma-separated groups.
//! Matching runs right to left.

use crate::node::{ElementData, Namespace};
use crate::{DomTree, NodeId};

/// Comma-separated group of selectors
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<Selector>);

/// Complex selector: compounds joined by combinators
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// (combinator to the previous compound, compound); the first combinator is unused
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq)]
enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(Box<Compound>),
}

impl SelectorList {
    /// Parse a selector group; `None` on any syntax error
    pub fn parse(input: &str) -> Option<Self> {
        let mut selectors = Vec::new();
        for part in split_top_level(input)? {
            let mut parser = Parser::new(part);
            let selector = parser.complex()?;
            if !parser.at_end() {
                return None;
            }
            selectors.push(selector);
        }
        (!selectors.is_empty()).then_some(Self(selectors))
    }

    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(tree, id))
    }

    /// First matching descendant of `scope`, in document order
    pub fn query_first(&self, tree: &DomTree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .find(|&id| self.matches(tree, id))
    }

    /// All matching descendants of `scope`, in document order
    pub fn query_all(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|&id| self.matches(tree, id))
            .collect()
    }
}

impl Selector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        !self.parts.is_empty() && self.matches_at(tree, id, self.parts.len() - 1)
    }

    fn matches_at(&self, tree: &DomTree, id: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => parent_element(tree, id)
                .is_some_and(|parent| self.matches_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = parent_element(tree, id);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = parent_element(tree, ancestor);
                }
                false
            }
            Combinator::NextSibling => prev_element(tree, id)
                .is_some_and(|sibling| self.matches_at(tree, sibling, index - 1)),
            Combinator::SubsequentSibling => {
                let mut current = prev_element(tree, id);
                while let Some(sibling) = current {
                    if self.matches_at(tree, sibling, index - 1) {
                        return true;
                    }
                    current = prev_element(tree, sibling);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }

    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        let html = elem.name.ns == Namespace::Html;

        if let Some(tag) = &self.tag {
            let local = tree.resolve(elem.name.local);
            let same = if html { local.eq_ignore_ascii_case(tag) } else { local == tag };
            if !same {
                return false;
            }
        }

        let attr = |name: &str| attr_value(tree, elem, html, name);

        if !self.ids.iter().all(|id| attr("id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.is_empty() {
            let class = attr("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|wanted| class.split_ascii_whitespace().any(|c| c == wanted))
            {
                return false;
            }
        }
        for selector in &self.attrs {
            let Some(value) = attr(&selector.name) else {
                return false;
            };
            if let Some((op, expected)) = &selector.test {
                if !op.test(value, expected) {
                    return false;
                }
            }
        }
        self.pseudos.iter().all(|pseudo| pseudo.matches(tree, id))
    }
}

impl AttrOp {
    fn test(self, value: &str, expected: &str) -> bool {
        match self {
            Self::Equals => value == expected,
            Self::Includes => value.split_ascii_whitespace().any(|v| v == expected),
            Self::DashMatch => {
                value == expected
                    || value
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && value.starts_with(expected),
            Self::Suffix => !expected.is_empty() && value.ends_with(expected),
            Self::Substring => !expected.is_empty() && value.contains(expected),
        }
    }
}

impl Pseudo {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Self::FirstChild => prev_element(tree, id).is_none(),
            Self::LastChild => next_element(tree, id).is_none(),
            Self::OnlyChild => prev_element(tree, id).is_none() && next_element(tree, id).is_none(),
            Self::Empty => tree
                .children(id)
                .all(|(_, child)| !child.is_element() && child.as_text().is_none_or(str::is_empty)),
            Self::Root => tree.parent(id) == Some(tree.root()),
            Self::Not(inner) => !inner.matches(tree, id),
        }
    }
}

fn attr_value<'t>(tree: &DomTree, elem: &'t ElementData, html: bool, name: &str) -> Option<&'t str> {
    elem.attrs
        .iter()
        .find(|a| {
            let attr_name = tree.resolve(a.name);
            if html {
                attr_name.eq_ignore_ascii_case(name)
            } else {
                attr_name == name
            }
        })
        .map(|a| a.value.as_str())
}

fn parent_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.get(p).is_some_and(|n| n.is_element()))
}

fn prev_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.get(id)?.prev_sibling;
    while let Some(node) = tree.get(current) {
        if node.is_element() {
            return Some(current);
        }
        current = node.prev_sibling;
    }
    None
}

fn next_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.get(id)?.next_sibling;
    while let Some(node) = tree.get(current) {
        if node.is_element() {
            return Some(current);
        }
        current = node.next_sibling;
    }
    None
}

/// Split on commas outside brackets, parentheses and quotes
fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    if quote.is_some() || depth != 0 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn complex(&mut self) -> Option<Selector> {
        let mut parts = Vec::new();
        self.skip_whitespace();
        loop {
            let had_space = self.skip_whitespace();
            if self.at_end() {
                break;
            }
            let combinator = match self.peek() {
                Some('>') => Some(Combinator::Child),
                Some('+') => Some(Combinator::NextSibling),
                Some('~') => Some(Combinator::SubsequentSibling),
                _ => None,
            };
            let combinator = match combinator {
                Some(c) => {
                    if parts.is_empty() {
                        return None;
                    }
                    self.pos += 1;
                    self.skip_whitespace();
                    c
                }
                None if had_space || parts.is_empty() => Combinator::Descendant,
                None => return None,
            };
            let compound = self.compound()?;
            parts.push((combinator, compound));
        }
        (!parts.is_empty()).then_some(Selector { parts })
    }

    fn compound(&mut self) -> Option<Compound> {
        let mut compound = Compound::default();
        let universal = self.eat('*');
        if !universal && self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?);
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return None;
        }
        Some(compound)
    }

    fn ident(&mut self) -> Option<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                out.push(self.peek()?);
                self.pos += 1;
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        (!out.is_empty()).then_some(out)
    }

    fn attribute(&mut self) -> Option<AttrSelector> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        if self.eat(']') {
            return Some(AttrSelector { name, test: None });
        }

        let op = match self.peek()? {
            '=' => AttrOp::Equals,
            '~' => AttrOp::Includes,
            '|' => AttrOp::DashMatch,
            '^' => AttrOp::Prefix,
            '$' => AttrOp::Suffix,
            '*' => AttrOp::Substring,
            _ => return None,
        };
        self.pos += 1;
        if op != AttrOp::Equals && !self.eat('=') {
            return None;
        }
        self.skip_whitespace();

        let value = match self.peek()? {
            q @ ('"' | '\'') => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    let c = self.peek()?;
                    self.pos += 1;
                    if c == q {
                        break;
                    }
                    value.push(c);
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        // Case-sensitivity flags are accepted and ignored
        if self.peek().is_some_and(|c| c == 'i' || c == 's') {
            self.pos += 1;
            self.skip_whitespace();
        }
        self.eat(']').then_some(AttrSelector {
            name,
            test: Some((op, value)),
        })
    }

    fn pseudo(&mut self) -> Option<Pseudo> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Some(Pseudo::FirstChild),
            "last-child" => Some(Pseudo::LastChild),
            "only-child" => Some(Pseudo::OnlyChild),
            "empty" => Some(Pseudo::Empty),
            "root" => Some(Pseudo::Root),
            "not" => {
                if !self.eat('(') {
                    return None;
                }
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                self.eat(')').then(|| Pseudo::Not(Box::new(inner)))
            }
            _ => None,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}
