//! Document - High-level document API

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    ClassList, DomError, DomTree, ElementData, EventListenerRegistry, EventType, ListenerId,
    MutationObserverRegistry, MutationRecord, Node, NodeId,
};

/// Document handle shared between the page and the components observing it.
/// The portal is single-threaded, so `Rc<RefCell<_>>` is enough.
pub type SharedDocument = Rc<RefCell<Document>>;

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    active_element: Option<NodeId>,
    observers: MutationObserverRegistry,
    listeners: EventListenerRegistry,
}

impl Document {
    /// Create a document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under a fresh root cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: None,
            observers: MutationObserverRegistry::new(),
            listeners: EventListenerRegistry::new(),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.element(id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.tree.create_text(content)
    }

    /// Append a child and notify mutation observers
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if child == NodeId::ROOT || parent == child || self.tree.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(old_parent) = self.tree.parent(child) {
            self.remove_child(old_parent, child)?;
        }
        self.tree.append_child(parent, child)?;
        self.notify(MutationRecord::child_added(parent, child));
        Ok(())
    }

    /// Remove a child and notify mutation observers
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.remove_child(parent, child)?;
        if self.active_element == Some(child) {
            self.active_element = None;
        }
        self.notify(MutationRecord::child_removed(parent, child));
        Ok(())
    }

    /// Replace all children of `node` with a single text node. A lone text
    /// child is rewritten in place instead of reallocated.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.tree.get(node).ok_or(DomError::MissingNode(node))?;
        let children: Vec<NodeId> = self.tree.children(node).map(|(id, _)| id).collect();
        if let [only] = children[..] {
            if !text.is_empty() {
                if let Some(content) = self.tree.get_mut(only).and_then(Node::as_text_mut) {
                    text.clone_into(content);
                    self.notify(MutationRecord::character_data(only));
                    return Ok(());
                }
            }
        }
        for child in children {
            self.remove_child(node, child)?;
        }
        if !text.is_empty() {
            let text_node = self.tree.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node)?.get_attr(name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.tree
            .element_mut(node)
            .ok_or(DomError::NotAnElement(node))?
            .set_attr(name, value);
        self.notify(MutationRecord::attribute(node, name));
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let old = self
            .tree
            .element_mut(node)
            .ok_or(DomError::NotAnElement(node))?
            .remove_attr(name);
        if old.is_some() {
            self.notify(MutationRecord::attribute(node, name));
        }
        Ok(old)
    }

    pub fn class_list(&self, node: NodeId) -> Option<&ClassList> {
        self.tree.element(node).map(|e| &e.classes)
    }

    /// Mutable class list. Class edits made here are not reported to observers.
    pub fn class_list_mut(&mut self, node: NodeId) -> Option<&mut ClassList> {
        self.tree.element_mut(node).map(|e| &mut e.classes)
    }

    /// Find the first connected element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(ElementData::id) == Some(id))
    }

    /// All connected elements matching `pred`, in document order
    pub fn query_all(&self, pred: impl Fn(&ElementData) -> bool) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&n| self.tree.element(n).is_some_and(&pred))
            .collect()
    }

    /// The node itself or its nearest ancestor element matching `pred`
    pub fn closest(&self, node: NodeId, pred: impl Fn(&ElementData) -> bool) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .find(|&n| self.tree.element(n).is_some_and(&pred))
    }

    /// Text of the `<label for="...">` pointing at `id`
    pub fn label_text_for(&self, id: &str) -> Option<String> {
        let label = self
            .query_all(|e| e.is("label") && e.get_attr("for") == Some(id))
            .into_iter()
            .next()?;
        Some(self.tree.text_content(label))
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Move focus to `node` and return the focus listeners to invoke
    pub fn focus(&mut self, node: NodeId) -> Vec<ListenerId> {
        if !self.tree.is_connected(node) {
            tracing::debug!(?node, "ignoring focus on disconnected node");
            return Vec::new();
        }
        self.active_element = Some(node);
        self.listeners.listeners(node, EventType::Focus).to_vec()
    }

    pub fn observers(&self) -> &MutationObserverRegistry {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut MutationObserverRegistry {
        &mut self.observers
    }

    pub fn listeners(&self) -> &EventListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut EventListenerRegistry {
        &mut self.listeners
    }

    fn notify(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let ancestors: Vec<NodeId> = self.tree.ancestors(record.target).collect();
        self.observers.notify(&record, &ancestors);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
