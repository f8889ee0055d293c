//! Token lists (classList)
//!
//! Space-separated token sets backed by an attribute such as `class`.

use crate::{DomResult, DomTree, NodeId};

/// Ordered set of space-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<String>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a space-separated string, dropping duplicates
    pub fn parse(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_ascii_whitespace() {
            list.add(token);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add a token; returns `false` if it was already present
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Remove a token; returns whether it was present
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }

    /// Toggle token, returns new state
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let present = self.contains(token);
        let wanted = force.unwrap_or(!present);
        if wanted {
            self.add(token);
        } else {
            self.remove(token);
        }
        wanted
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Serialized form
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }
}

impl std::fmt::Display for TokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value())
    }
}

impl DomTree {
    /// Class list of an element (empty for non-elements)
    pub fn class_list(&self, id: NodeId) -> TokenList {
        TokenList::parse(self.get_attribute(id, "class").unwrap_or(""))
    }

    /// Write a class list back to the `class` attribute
    pub fn set_class_list(&mut self, id: NodeId, list: &TokenList) -> DomResult<()> {
        self.set_attribute(id, "class", &list.value())
    }
}
