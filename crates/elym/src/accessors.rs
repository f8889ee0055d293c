//! Per-node accessors
//!
//! Getters read the first selected node and fall back to an empty value;
//! setters write every selected node and return the builder.

use elym_dom::{Namespace, NodeId, PropertyValue};

use crate::ElementBuilder;

impl ElementBuilder {
    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attr(&self, name: &str) -> Option<String> {
        let node = self.node()?;
        self.dom().document().tree.get_attribute(node, name).map(str::to_string)
    }

    pub fn set_attr(&self, name: &str, value: impl ToString) -> &Self {
        let value = value.to_string();
        self.update("set_attr", |tree, node| tree.set_attribute(node, name, &value));
        self
    }

    pub fn remove_attr(&self, name: &str) -> &Self {
        self.update("remove_attr", |tree, node| tree.remove_attribute(node, name).map(|_| ()));
        self
    }

    // ------------------------------------------------------------------
    // Text & markup
    // ------------------------------------------------------------------

    /// Text content of the first selected node
    pub fn text(&self) -> String {
        self.node()
            .map(|node| self.dom().document().tree.text_content(node))
            .unwrap_or_default()
    }

    /// Replace the content of every selected node with one text node
    pub fn set_text(&self, value: impl ToString) -> &Self {
        let value = value.to_string();
        let mut displaced = Vec::new();
        self.update("set_text", |tree, node| {
            displaced.extend(tree.set_text_content(node, &value)?);
            Ok(())
        });
        self.dom().discard(displaced);
        self
    }

    /// Inner markup of the first selected node
    pub fn html(&self) -> String {
        self.node()
            .map(|node| self.dom().inner_html(node))
            .unwrap_or_default()
    }

    /// Replace the children of every selected node with parsed markup
    ///
    /// Markup is parsed per node as the children of that node, so table
    /// rows stay rows under a `<table>` and SVG elements stay SVG.
    pub fn set_html(&self, markup: &str) -> &Self {
        let mut displaced = Vec::new();
        for node in self.nodes() {
            let context = self.dom().fragment_context(node);
            let children = self.dom().parse_fragment(markup, &context);
            let result = self.dom().document_mut().tree.replace_children(node, &children);
            match result {
                Ok(old) => displaced.extend(old),
                Err(err) => {
                    tracing::warn!("set_html skipped {}: {}", node, err);
                    displaced.extend(children);
                }
            }
        }
        self.dom().discard(displaced);
        self
    }

    /// Replace the children of every selected node with `content`
    ///
    /// The node is moved, not copied, so with several selected nodes it ends
    /// up under the last one.
    pub fn set_html_node(&self, content: NodeId) -> &Self {
        let mut displaced = Vec::new();
        self.update("set_html_node", |tree, node| {
            displaced.extend(tree.replace_children(node, &[content])?);
            Ok(())
        });
        self.dom().discard(displaced);
        self
    }

    // ------------------------------------------------------------------
    // Inline style
    // ------------------------------------------------------------------

    pub fn style(&self, name: &str) -> Option<String> {
        let node = self.node()?;
        self.dom().document().tree.inline_style(node).get(name).map(str::to_string)
    }

    /// Set one declaration; an empty value removes it
    pub fn set_style(&self, name: &str, value: impl ToString) -> &Self {
        self.set_styles([(name, value)])
    }

    pub fn set_styles<K, V>(&self, declarations: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: AsRef<str>,
        V: ToString,
    {
        let declarations: Vec<(K, String)> = declarations
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        self.update("set_style", |tree, node| {
            let mut style = tree.inline_style(node);
            for (name, value) in &declarations {
                style.set(name.as_ref(), value);
            }
            tree.set_inline_style(node, &style)
        });
        self
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Read a live property of the first selected element
    ///
    /// `id`, `className`, `textContent`, `innerHTML`, `outerHTML` and
    /// `tagName` reflect the element; other names read its property bag.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        let node = self.node()?;
        match name {
            "textContent" => return Some(PropertyValue::Text(self.text())),
            "innerHTML" => return Some(PropertyValue::Text(self.html())),
            "outerHTML" => return Some(PropertyValue::Text(self.dom().outer_html(node))),
            _ => {}
        }

        let document = self.dom().document();
        let tree = &document.tree;
        let element = tree.get(node)?.as_element()?;
        let value = match name {
            "id" => PropertyValue::Text(tree.get_attribute(node, "id").unwrap_or_default().to_string()),
            "className" => PropertyValue::Text(tree.get_attribute(node, "class").unwrap_or_default().to_string()),
            "tagName" => {
                let tag = tree.resolve(element.name.local);
                PropertyValue::Text(match element.name.ns {
                    Namespace::Html => tag.to_ascii_uppercase(),
                    _ => tag.to_string(),
                })
            }
            _ => element.properties.get(name)?.clone(),
        };
        Some(value)
    }

    /// Write a live property on every selected element
    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> &Self {
        let value = value.into();
        match name {
            "id" => return self.set_attr("id", &value),
            "className" => return self.set_attr("class", &value),
            "textContent" => return self.set_text(&value),
            "innerHTML" => return self.set_html(&value.to_string()),
            "tagName" | "outerHTML" => {
                tracing::warn!("Property '{}' is read-only", name);
                return self;
            }
            _ => {}
        }
        self.update("set_property", |tree, node| {
            if let Some(element) = tree.get_mut(node).and_then(|n| n.as_element_mut()) {
                element.properties.insert(name.to_string(), value.clone());
            }
            Ok(())
        });
        self
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Whether the first selected node has every whitespace-separated class
    pub fn classed(&self, names: &str) -> bool {
        let Some(node) = self.node() else {
            return false;
        };
        let classes = self.dom().document().tree.class_list(node);
        let mut names = names.split_whitespace().peekable();
        names.peek().is_some() && names.all(|name| classes.contains(name))
    }

    /// Add or remove each whitespace-separated class on every selected node
    pub fn set_classed(&self, names: &str, enabled: bool) -> &Self {
        self.update("set_classed", |tree, node| {
            let mut classes = tree.class_list(node);
            for name in names.split_whitespace() {
                classes.toggle(name, Some(enabled));
            }
            if classes.is_empty() && !tree.has_attribute(node, "class") {
                return Ok(());
            }
            tree.set_class_list(node, &classes)
        });
        self
    }
}
