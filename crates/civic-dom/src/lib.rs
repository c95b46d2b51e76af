//! Civic DOM - Document Object Model
//!
//! Arena-backed document used by the portal's accessibility layer.
//! Covers what the announcement coordinator needs from a page: elements,
//! attributes, class lists, text, child-list mutation records and
//! per-element event listener registration.

mod classlist;
mod document;
mod events;
mod node;
mod observer;
mod tree;

pub use classlist::ClassList;
pub use document::{Document, SharedDocument};
pub use events::{EventListenerRegistry, EventType, ListenerId};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{
    MutationObserverInit, MutationObserverRegistry, MutationRecord, MutationType, ObserverId,
};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    MissingNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("cannot insert {child:?} under {parent:?}: hierarchy request error")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
