//! DOM event listeners
//!
//! Listeners are identified by `ListenerId` rather than closure identity, so
//! the owner can always remove exactly what it added.

use std::collections::HashMap;

use crate::NodeId;

/// Event types the portal listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Focus,
}

/// Listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-document registry of (node, event type) -> listeners
#[derive(Debug, Default)]
pub struct EventListenerRegistry {
    next_id: u64,
    listeners: HashMap<(NodeId, EventType), Vec<ListenerId>>,
}

impl EventListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, node: NodeId, event: EventType) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry((node, event)).or_default().push(id);
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn remove(&mut self, node: NodeId, event: EventType, id: ListenerId) -> bool {
        let key = (node, event);
        let Some(list) = self.listeners.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|&l| l != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&key);
        }
        removed
    }

    pub fn listeners(&self, node: NodeId, event: EventType) -> &[ListenerId] {
        self.listeners.get(&(node, event)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, node: NodeId, event: EventType, id: ListenerId) -> bool {
        self.listeners(node, event).contains(&id)
    }

    /// Total number of registered listeners
    pub fn count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut registry = EventListenerRegistry::new();
        let a = registry.add(NodeId(1), EventType::Focus);
        let b = registry.add(NodeId(1), EventType::Focus);
        assert_ne!(a, b);
        assert_eq!(registry.listeners(NodeId(1), EventType::Focus), &[a, b]);

        assert!(registry.remove(NodeId(1), EventType::Focus, a));
        assert!(!registry.remove(NodeId(1), EventType::Focus, a));
        assert!(!registry.remove(NodeId(2), EventType::Focus, b));
        assert_eq!(registry.count(), 1);
    }
}
