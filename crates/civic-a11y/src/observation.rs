//! Focus and content observation
//!
//! While active, every interactive element carries one focus listener and
//! `<body>` carries one child-list observer. Both are tracked in explicit
//! registries so `stop` removes exactly what `start` added.

use std::collections::HashMap;

use civic_dom::{
    Document, EventType, ListenerId, MutationObserverInit, NodeId, ObserverId, SharedDocument,
};

use crate::config::CoordinatorConfig;
use crate::describe::{describe_focus, is_interactive};
use crate::A11yError;

/// Classes marking content that must never be announced
const SILENT_CLASSES: [&str; 3] = ["sr-only", "screen-reader-announcement", "visually-hidden"];

/// Observation sub-component of the announcement coordinator
#[derive(Debug)]
pub struct Observation {
    document: Option<SharedDocument>,
    announcer_id: String,
    min_text_len: usize,
    focus_listeners: HashMap<NodeId, ListenerId>,
    observer: Option<ObserverId>,
    active: bool,
}

impl Observation {
    pub fn new(document: Option<SharedDocument>, config: &CoordinatorConfig) -> Self {
        Self {
            document,
            announcer_id: config.announcer_id.clone(),
            min_text_len: config.min_inserted_text_len,
            focus_listeners: HashMap::new(),
            observer: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Number of elements currently carrying our focus listener
    pub fn listener_count(&self) -> usize {
        self.focus_listeners.len()
    }

    /// Attach focus listeners and the insertion observer. Idempotent; returns
    /// the number of listeners added by this call.
    pub fn start(&mut self) -> Result<usize, A11yError> {
        let document = self
            .document
            .clone()
            .ok_or_else(|| A11yError::ListenerAttachment("no document available".into()))?;
        let mut doc = document
            .try_borrow_mut()
            .map_err(|_| A11yError::ListenerAttachment("document is already borrowed".into()))?;

        let targets = doc.query_all(is_interactive);
        let added = self.attach_focus(&mut doc, targets);

        if self.observer.is_none() {
            let body = doc.body();
            let observers = doc.observers_mut();
            let id = observers.create();
            observers.observe(id, body, MutationObserverInit::child_list_subtree());
            self.observer = Some(id);
        }

        self.active = true;
        tracing::debug!(added, total = self.focus_listeners.len(), "observation started");
        Ok(added)
    }

    /// Remove every listener and observer this component registered
    pub fn stop(&mut self) -> usize {
        let removed = self.focus_listeners.len();
        self.active = false;

        let observer = self.observer.take();
        let listeners = std::mem::take(&mut self.focus_listeners);

        let Some(document) = &self.document else {
            return removed;
        };
        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::warn!("document busy during teardown; dropping listener registry");
            return removed;
        };

        for (node, listener) in listeners {
            doc.listeners_mut().remove(node, EventType::Focus, listener);
        }
        if let Some(id) = observer {
            doc.observers_mut().remove(id);
        }
        if removed > 0 {
            tracing::debug!(removed, "observation stopped");
        }
        removed
    }

    /// Whether `listeners` (as returned by `Document::focus`) include ours
    pub fn owns_listener(&self, node: NodeId, listeners: &[ListenerId]) -> bool {
        self.active
            && self
                .focus_listeners
                .get(&node)
                .is_some_and(|ours| listeners.contains(ours))
    }

    /// Focus `node` in the document and describe it if our listener fired
    pub fn focus(&self, node: NodeId) -> Option<String> {
        let document = self.document.as_ref()?;
        let mut doc = document.try_borrow_mut().ok()?;
        let fired = doc.focus(node);
        if !self.owns_listener(node, &fired) {
            return None;
        }
        describe_focus(&doc, node)
    }

    /// Drain pending insertion records. Returns the text of the first
    /// qualifying inserted element (at most one per batch) and attaches focus
    /// listeners to inserted interactive elements.
    pub fn take_inserted_announcement(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        let observer = self.observer?;
        let document = self.document.clone()?;
        let mut doc = document.try_borrow_mut().ok()?;

        let records = doc.observers_mut().take_records(observer);
        let inserted: Vec<NodeId> = records
            .into_iter()
            .flat_map(|r| r.added_nodes)
            .filter(|&n| doc.element(n).is_some())
            .collect();

        let announcement = inserted
            .iter()
            .find_map(|&n| self.announceable_text(&doc, n));

        let new_targets: Vec<NodeId> = inserted
            .iter()
            .flat_map(|&n| std::iter::once(n).chain(doc.tree().descendants(n)))
            .filter(|&n| doc.is_connected(n) && doc.element(n).is_some_and(is_interactive))
            .collect();
        self.attach_focus(&mut doc, new_targets);

        announcement
    }

    fn attach_focus(&mut self, doc: &mut Document, targets: Vec<NodeId>) -> usize {
        let mut added = 0;
        for node in targets {
            if self.focus_listeners.contains_key(&node) {
                continue;
            }
            let id = doc.listeners_mut().add(node, EventType::Focus);
            self.focus_listeners.insert(node, id);
            added += 1;
        }
        added
    }

    fn announceable_text(&self, doc: &Document, node: NodeId) -> Option<String> {
        let el = doc.element(node)?;
        if !doc.is_connected(node)
            || el.has_attr("hidden")
            || el.get_attr("aria-hidden") == Some("true")
            || SILENT_CLASSES.iter().any(|c| el.has_class(c))
        {
            return None;
        }
        if doc
            .closest(node, |e| e.id() == Some(self.announcer_id.as_str()))
            .is_some()
        {
            return None;
        }

        let text = doc.text_content(node);
        let text = text.trim();
        (text.chars().count() > self.min_text_len).then(|| text.to_string())
    }
}
