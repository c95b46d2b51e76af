//! Mutation observers
//!
//! Observers are plain records in a registry owned by the document. The
//! document pushes a `MutationRecord` for every structural change and each
//! observer whose targets match queues it until `take_records` is called.

use std::collections::HashMap;

use crate::NodeId;

/// Observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        Self { child_list: true, subtree: true, ..Default::default() }
    }
}

/// Mutation record
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    pub fn child_added(target: NodeId, child: NodeId) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
            attribute_name: None,
        }
    }

    pub fn child_removed(target: NodeId, child: NodeId) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: Vec::new(),
            removed_nodes: vec![child],
            attribute_name: None,
        }
    }

    /// Text node content replaced in place
    pub fn character_data(target: NodeId) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
        }
    }

    pub fn attribute(target: NodeId, name: &str) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct ObserverEntry {
    targets: HashMap<NodeId, MutationObserverInit>,
    records: Vec<MutationRecord>,
}

impl ObserverEntry {
    fn wants(&self, record: &MutationRecord, ancestors: &[NodeId]) -> bool {
        self.targets.iter().any(|(&target, options)| {
            let matches_type = match record.mutation_type {
                MutationType::Attributes => options.attributes,
                MutationType::CharacterData => options.character_data,
                MutationType::ChildList => options.child_list,
            };
            let matches_target =
                target == record.target || (options.subtree && ancestors.contains(&target));
            matches_type && matches_target
        })
    }
}

/// Registry of mutation observers for one document
#[derive(Debug, Default)]
pub struct MutationObserverRegistry {
    next_id: u64,
    observers: HashMap<ObserverId, ObserverEntry>,
}

impl MutationObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an observer with no targets
    pub fn create(&mut self) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.insert(id, ObserverEntry::default());
        id
    }

    /// Start observing `target`. Returns false for an unknown observer.
    pub fn observe(&mut self, id: ObserverId, target: NodeId, options: MutationObserverInit) -> bool {
        match self.observers.get_mut(&id) {
            Some(entry) => {
                entry.targets.insert(target, options);
                true
            }
            None => false,
        }
    }

    /// Stop observing everything and drop queued records
    pub fn disconnect(&mut self, id: ObserverId) {
        if let Some(entry) = self.observers.get_mut(&id) {
            entry.targets.clear();
            entry.records.clear();
        }
    }

    /// Disconnect and forget the observer
    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&id)
            .map(|entry| std::mem::take(&mut entry.records))
            .unwrap_or_default()
    }

    pub fn has_pending(&self, id: ObserverId) -> bool {
        self.observers.get(&id).is_some_and(|e| !e.records.is_empty())
    }

    pub fn is_observing(&self, id: ObserverId, node: NodeId) -> bool {
        self.observers.get(&id).is_some_and(|e| e.targets.contains_key(&node))
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Queue a record for every interested observer.
    /// `ancestors` is the ancestor chain of `record.target`, nearest first.
    pub fn notify(&mut self, record: &MutationRecord, ancestors: &[NodeId]) {
        for entry in self.observers.values_mut() {
            if entry.wants(record, ancestors) {
                entry.records.push(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtree_matching() {
        let mut registry = MutationObserverRegistry::new();
        let direct = registry.create();
        let deep = registry.create();
        registry.observe(direct, NodeId(1), MutationObserverInit { child_list: true, ..Default::default() });
        registry.observe(deep, NodeId(1), MutationObserverInit::child_list_subtree());

        // Insertion under NodeId(5), whose ancestors are 3 then 1
        registry.notify(&MutationRecord::child_added(NodeId(5), NodeId(9)), &[NodeId(3), NodeId(1)]);

        assert!(!registry.has_pending(direct));
        assert_eq!(registry.take_records(deep).len(), 1);
        assert!(!registry.has_pending(deep));
    }

    #[test]
    fn test_disconnect_drops_records() {
        let mut registry = MutationObserverRegistry::new();
        let id = registry.create();
        registry.observe(id, NodeId(1), MutationObserverInit::child_list_subtree());
        registry.notify(&MutationRecord::child_added(NodeId(1), NodeId(2)), &[]);
        assert!(registry.has_pending(id));

        registry.disconnect(id);
        assert!(!registry.has_pending(id));
        assert!(!registry.is_observing(id, NodeId(1)));

        registry.notify(&MutationRecord::child_added(NodeId(1), NodeId(3)), &[]);
        assert!(!registry.has_pending(id));
    }

    #[test]
    fn test_attribute_records_need_attribute_option() {
        let mut registry = MutationObserverRegistry::new();
        let id = registry.create();
        registry.observe(id, NodeId(1), MutationObserverInit::child_list_subtree());
        registry.notify(&MutationRecord::attribute(NodeId(1), "class"), &[]);
        assert!(!registry.has_pending(id));
    }
}
