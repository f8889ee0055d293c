//! Namespaced event listeners
//!
//! Every callback a builder attaches is recorded under its event key,
//! either `"type"` or `"type.namespace"`. The native listener stays attached
//! exactly as long as some key of the node still records it.

use std::collections::{BTreeMap, HashMap};

use elym_dom::{Event, Listener, ListenerOptions, NodeId};

use crate::ElementBuilder;

#[derive(Debug, Clone)]
pub(crate) struct ListenerEntry {
    pub listener: Listener,
    pub options: ListenerOptions,
}

/// Per-builder record: node → event key → callbacks in registration order
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    nodes: HashMap<NodeId, BTreeMap<String, Vec<ListenerEntry>>>,
}

impl ListenerRegistry {
    pub fn record(&mut self, node: NodeId, key: &str, entry: ListenerEntry) {
        self.nodes
            .entry(node)
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(entry);
    }

    /// Remove every key of `node` that `event` selects
    pub fn take_matching(&mut self, node: NodeId, event: &str) -> Vec<(String, ListenerEntry)> {
        let Some(keys) = self.nodes.get_mut(&node) else {
            return Vec::new();
        };
        let matching: Vec<String> = keys.keys().filter(|key| key_matches(key, event)).cloned().collect();
        let mut taken = Vec::new();
        for key in matching {
            if let Some(entries) = keys.remove(&key) {
                taken.extend(entries.into_iter().map(|entry| (key.clone(), entry)));
            }
        }
        if keys.is_empty() {
            self.nodes.remove(&node);
        }
        taken
    }

    pub fn take_all(&mut self, node: NodeId) -> Vec<(String, ListenerEntry)> {
        self.nodes
            .remove(&node)
            .into_iter()
            .flatten()
            .flat_map(|(key, entries)| entries.into_iter().map(move |entry| (key.clone(), entry)))
            .collect()
    }

    /// Whether any remaining key of `node` still holds `listener` for
    /// `event_type` with the same capture flag
    pub fn references(&self, node: NodeId, event_type: &str, listener: &Listener, capture: bool) -> bool {
        self.nodes.get(&node).is_some_and(|keys| {
            keys.iter()
                .filter(|(key, _)| event_type_of(key) == event_type)
                .flat_map(|(_, entries)| entries)
                .any(|entry| &entry.listener == listener && entry.options.capture == capture)
        })
    }

    pub fn entries(&self, node: NodeId) -> Vec<(String, ListenerEntry)> {
        self.nodes
            .get(&node)
            .into_iter()
            .flatten()
            .flat_map(|(key, entries)| entries.iter().map(move |entry| (key.clone(), entry.clone())))
            .collect()
    }

    pub fn retain_nodes(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.nodes.retain(|&node, _| keep(node));
    }

    pub fn keys(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(&node)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Event type part of a key: `"click.menu"` → `"click"`
pub(crate) fn event_type_of(key: &str) -> &str {
    key.split_once('.').map_or(key, |(event_type, _)| event_type)
}

/// A bare type selects its exact key; `"type.ns"` selects every key that
/// starts with `"type."` and ends with `".ns"`
fn key_matches(key: &str, event: &str) -> bool {
    match event.split_once('.') {
        None => key == event,
        Some((event_type, namespace)) => {
            key.strip_prefix(event_type)
                .is_some_and(|rest| rest.starts_with('.'))
                && key.ends_with(&format!(".{namespace}"))
        }
    }
}

impl ElementBuilder {
    /// Attach `callback` for its event type on every selected node
    pub fn on(&self, event: &str, callback: impl Fn(&mut Event) + 'static) -> &Self {
        self.on_with(event, Listener::new(callback), ListenerOptions::default())
    }

    /// Attach a listener with options
    ///
    /// Pass a [`Listener`] handle to attach the same callback in several
    /// places; closures need an annotated `&mut Event` parameter here.
    pub fn on_with(&self, event: &str, listener: impl Into<Listener>, options: ListenerOptions) -> &Self {
        let event_type = event_type_of(event);
        if event_type.is_empty() {
            tracing::warn!("Ignoring listener with empty event type: '{}'", event);
            return self;
        }
        let listener = listener.into();
        let nodes = self.nodes();
        let mut document = self.dom().document_mut();
        let mut registry = self.inner.listeners.borrow_mut();
        for node in nodes {
            match document.tree.add_event_listener(node, event_type, listener.clone(), options) {
                Ok(_) => {
                    registry.record(node, event, ListenerEntry {
                        listener: listener.clone(),
                        options,
                    });
                    tracing::trace!("Listening for '{}' on {}", event, node);
                }
                Err(err) => tracing::warn!("Cannot listen for '{}' on {}: {}", event, node, err),
            }
        }
        self
    }

    /// Detach the callbacks `event` selects from every selected node
    ///
    /// `"click"` only touches callbacks registered as plain `"click"`;
    /// `"click.menu"` touches every `"click.*.menu"` style key.
    pub fn off(&self, event: &str) -> &Self {
        let nodes = self.nodes();
        let mut document = self.dom().document_mut();
        let mut registry = self.inner.listeners.borrow_mut();
        for node in nodes {
            for (key, entry) in registry.take_matching(node, event) {
                let event_type = event_type_of(&key);
                if !registry.references(node, event_type, &entry.listener, entry.options.capture) {
                    document
                        .tree
                        .remove_event_listener(node, event_type, &entry.listener, entry.options.capture);
                }
                tracing::trace!("Removed '{}' listener from {}", key, node);
            }
        }
        self
    }

    /// Event keys recorded for `node`, sorted
    pub fn listener_keys(&self, node: NodeId) -> Vec<String> {
        self.inner.listeners.borrow().keys(node)
    }

    /// Callbacks recorded for `node` under exactly `key`
    pub fn listeners(&self, node: NodeId, key: &str) -> Vec<Listener> {
        self.inner
            .listeners
            .borrow()
            .entries(node)
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, entry)| entry.listener)
            .collect()
    }

    /// Detach and forget every listener this builder recorded on `node`
    pub(crate) fn detach_listeners(&self, node: NodeId) {
        let taken = self.inner.listeners.borrow_mut().take_all(node);
        if taken.is_empty() {
            return;
        }
        let mut document = self.dom().document_mut();
        for (key, entry) in taken {
            document
                .tree
                .remove_event_listener(node, event_type_of(&key), &entry.listener, entry.options.capture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elym_dom::DomTree;

    fn entry(listener: &Listener) -> ListenerEntry {
        ListenerEntry {
            listener: listener.clone(),
            options: ListenerOptions::default(),
        }
    }

    #[test]
    fn test_key_matching() {
        assert!(key_matches("click", "click"));
        assert!(!key_matches("click.ns", "click"));
        assert!(key_matches("click.ns", "click.ns"));
        assert!(key_matches("click.a.ns", "click.ns"));
        assert!(!key_matches("click.nsx", "click.ns"));
        assert!(!key_matches("clicked.ns", "click.ns"));
        assert!(!key_matches("click", "click.ns"));
    }

    #[test]
    fn test_event_type_of() {
        assert_eq!(event_type_of("click"), "click");
        assert_eq!(event_type_of("click.menu"), "click");
        assert_eq!(event_type_of("click.a.b"), "click");
    }

    #[test]
    fn test_registry_take_matching() {
        let node = DomTree::new().create_element("div");
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});
        let mut registry = ListenerRegistry::default();
        registry.record(node, "click", entry(&a));
        registry.record(node, "click.ns", entry(&b));
        registry.record(node, "click.ns", entry(&a));

        let taken = registry.take_matching(node, "click");
        assert_eq!(taken.len(), 1);
        assert_eq!(registry.keys(node), vec!["click.ns".to_string()]);
        assert!(registry.references(node, "click", &a, false));
        assert!(!registry.references(node, "click", &a, true));

        let taken = registry.take_matching(node, "click.ns");
        assert_eq!(taken.len(), 2);
        assert!(registry.keys(node).is_empty());
        assert!(registry.take_matching(node, "click.ns").is_empty());
    }

    #[test]
    fn test_registry_take_all() {
        let node = DomTree::new().create_element("div");
        let a = Listener::new(|_| {});
        let mut registry = ListenerRegistry::default();
        registry.record(node, "focus", entry(&a));
        registry.record(node, "blur.x", entry(&a));
        assert_eq!(registry.entries(node).len(), 2);
        assert_eq!(registry.take_all(node).len(), 2);
        assert!(registry.entries(node).is_empty());
    }

    #[test]
    fn test_registry_retain_nodes() {
        let mut tree = DomTree::new();
        let kept = tree.create_element("div");
        let freed = tree.create_element("div");
        let a = Listener::new(|_| {});
        let mut registry = ListenerRegistry::default();
        registry.record(kept, "click", entry(&a));
        registry.record(freed, "click", entry(&a));

        tree.remove_subtree(freed);
        registry.retain_nodes(|node| tree.is_live(node));
        assert_eq!(registry.keys(kept), ["click"]);
        assert!(registry.keys(freed).is_empty());
    }
}
