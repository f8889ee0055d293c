//! Data binding and cloning

use std::any::Any;
use std::rc::Rc;

use elym_dom::NodeId;

use crate::listeners::event_type_of;
use crate::{ElementBuilder, ElymError, ElymResult};

impl ElementBuilder {
    /// Bind `dataset[i]` to the i-th selected node
    ///
    /// Pairs stop at the shorter of the two; extra nodes keep their data.
    pub fn data<T: Clone + 'static>(&self, dataset: &[T]) -> &Self {
        self.data_with(dataset, |_, _, _| {})
    }

    /// Like [`data`](Self::data), calling `callback(node, value, index)`
    /// after each binding
    pub fn data_with<T: Clone + 'static>(
        &self,
        dataset: &[T],
        mut callback: impl FnMut(NodeId, &T, usize),
    ) -> &Self {
        for (index, (node, value)) in self.nodes().into_iter().zip(dataset).enumerate() {
            let bound: Rc<dyn Any> = Rc::new(value.clone());
            self.inner.data.borrow_mut().insert(node, bound);
            callback(node, value, index);
        }
        self
    }

    /// Value bound to `node`, if it has the requested type
    pub fn get_data<T: 'static>(&self, node: NodeId) -> Option<Rc<T>> {
        let value = self.inner.data.borrow().get(&node).cloned()?;
        value.downcast::<T>().ok()
    }

    pub fn has_data(&self, node: NodeId) -> bool {
        self.inner.data.borrow().contains_key(&node)
    }

    /// Copy the root subtree into a new builder
    ///
    /// Selected nodes are matched to their copies by position in the root's
    /// pre-order node list. Their recorded listeners are attached to the
    /// copies under the same keys, and bound data is shared with them.
    pub fn deep_clone(&self) -> ElymResult<ElementBuilder> {
        let dom = self.dom();
        let root = self.root();
        let (originals, copies) = {
            let mut document = dom.document_mut();
            let tree = &mut document.tree;
            let copy = tree
                .deep_clone(root)
                .map_err(|err| ElymError::NotFound(err.to_string()))?;
            let originals: Vec<NodeId> = std::iter::once(root).chain(tree.descendants(root)).collect();
            let copies: Vec<NodeId> = std::iter::once(copy).chain(tree.descendants(copy)).collect();
            (originals, copies)
        };

        let mut pairs = Vec::new();
        for node in self.nodes() {
            match originals.iter().position(|&n| n == node) {
                Some(index) => pairs.push((node, copies[index])),
                None => tracing::trace!("deep_clone: {} is outside the root subtree", node),
            }
        }
        let mut selection: Vec<NodeId> = pairs.iter().map(|&(_, copy)| copy).collect();
        if selection.is_empty() {
            selection.push(copies[0]);
        }

        let clone = ElementBuilder::wrap(dom, copies[0], selection);
        {
            let source = self.inner.listeners.borrow();
            let mut target = clone.inner.listeners.borrow_mut();
            let mut document = dom.document_mut();
            for &(original, copy) in &pairs {
                for (key, entry) in source.entries(original) {
                    let attached = document.tree.add_event_listener(
                        copy,
                        event_type_of(&key),
                        entry.listener.clone(),
                        entry.options,
                    );
                    match attached {
                        Ok(_) => target.record(copy, &key, entry),
                        Err(err) => tracing::warn!("deep_clone dropped '{}' listener: {}", key, err),
                    }
                }
            }
        }
        {
            let source = self.inner.data.borrow();
            let mut target = clone.inner.data.borrow_mut();
            for &(original, copy) in &pairs {
                if let Some(value) = source.get(&original) {
                    target.insert(copy, Rc::clone(value));
                }
            }
        }
        tracing::debug!("Cloned builder rooted at {} into {}", root, copies[0]);
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::{Dom, ElementBuilder};

    #[test]
    fn test_get_data_type_mismatch() {
        let dom = Dom::new();
        let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
        div.data(&[42u32]);
        assert_eq!(div.get_data::<u32>(div.root()).as_deref(), Some(&42));
        assert!(div.get_data::<String>(div.root()).is_none());
        assert!(div.has_data(div.root()));
    }

    #[test]
    fn test_last_write_wins() {
        let dom = Dom::new();
        let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
        div.data(&["first"]).data(&["second"]);
        assert_eq!(div.get_data::<&str>(div.root()).as_deref(), Some(&"second"));
    }

    #[test]
    fn test_callback_may_reenter() {
        let dom = Dom::new();
        let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        let handle = div.clone();
        div.data_with(&[1], move |node, _, _| {
            flag.set(handle.has_data(node));
            handle.set_attr("data-bound", "yes");
        });
        assert!(seen.get());
        assert_eq!(div.attr("data-bound").as_deref(), Some("yes"));
    }

    #[test]
    fn test_clone_keeps_selection_positions() {
        let dom = Dom::new();
        let ul = ElementBuilder::new(&dom, "<ul><li>a</li><li>b</li></ul>").unwrap();
        ul.select_children("li").data(&["x", "y"]);
        let copy = ul.deep_clone().unwrap();

        assert_eq!(copy.nodes().len(), 2);
        assert_ne!(copy.root(), ul.root());
        let texts: Vec<String> = copy
            .nodes()
            .into_iter()
            .map(|n| dom.document().tree.text_content(n))
            .collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(copy.get_data::<&str>(copy.nodes()[1]).as_deref(), Some(&"y"));
    }

    #[test]
    fn test_clone_of_removed_root_fails() {
        let dom = Dom::new();
        let div = ElementBuilder::new(&dom, "<div></div>").unwrap();
        div.remove();
        assert!(div.deep_clone().is_err());
    }
}
