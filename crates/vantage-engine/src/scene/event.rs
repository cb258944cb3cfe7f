use super::{NodeId, NodeKind};

/// The node a scene event is about, already resolved to its class.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EventTarget {
    SceneView(NodeId),
    Hierarchy(NodeId),
    Other(NodeId),
}

impl EventTarget {
    pub fn new(kind: NodeKind, id: NodeId) -> Self {
        match kind {
            NodeKind::SceneView => EventTarget::SceneView(id),
            NodeKind::Hierarchy => EventTarget::Hierarchy(id),
            NodeKind::Generic => EventTarget::Other(id),
        }
    }

    pub fn id(&self) -> &NodeId {
        match self {
            EventTarget::SceneView(id) | EventTarget::Hierarchy(id) | EventTarget::Other(id) => id,
        }
    }
}

/// Scene mutation notifications.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SceneEvent {
    NodeAdded(EventTarget),
    NodeRemoved(EventTarget),
    Modified(EventTarget),
    /// The document was closed; every node is gone.
    SceneClosed,
    /// A bulk load finished.
    SceneImported,
}

/// A queued scene event plus the store state at the time it was emitted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SceneNotification {
    pub event: SceneEvent,
    /// `true` when the store was inside a bulk update (e.g. an import).
    pub during_update: bool,
}
