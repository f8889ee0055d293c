//! Inline style declarations
//!
//! The `style` attribute viewed as an ordered list of `property: value`
//! declarations. Property names are case-insensitive and stored lowercase;
//! custom properties (`--x`) keep their case.

use crate::{DomResult, DomTree, NodeId};

/// Parsed inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a: b; c: d` text; malformed declarations are skipped
    pub fn parse(css: &str) -> Self {
        let mut style = Self::new();
        for declaration in split_declarations(css) {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if !name.is_empty() && !value.is_empty() {
                style.set(name, value);
            }
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = normalize(name);
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration; an empty value removes it
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize(name);
        let value = value.trim();
        if value.is_empty() {
            self.remove(&name);
            return;
        }
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = normalize(name);
        let pos = self.declarations.iter().position(|(n, _)| *n == name)?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Serialize as `a: b; c: d;`
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn normalize(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Split on `;` outside quotes and parentheses (`url(a;b)` stays whole)
fn split_declarations(css: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, ';') if depth <= 0 => {
                out.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&css[start..]);
    out
}

impl DomTree {
    /// Inline style of an element
    pub fn inline_style(&self, id: NodeId) -> StyleDeclaration {
        StyleDeclaration::parse(self.get_attribute(id, "style").unwrap_or(""))
    }

    /// Write an inline style back; an empty style removes the attribute
    pub fn set_inline_style(&mut self, id: NodeId, style: &StyleDeclaration) -> DomResult<()> {
        if style.is_empty() {
            self.remove_attribute(id, "style").map(|_| ())
        } else {
            self.set_attribute(id, "style", &style.css_text())
        }
    }
}
