use thiserror::Error;

use super::{
    HierarchyNode, Node, NodeId, NodeKind, SceneEvent, SceneNotification, SceneSnapshot,
    SceneViewNode,
};

/// Result type for scene store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Reasons a scene store refuses a request.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum StoreError {
    /// No node with this id is in the scene.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The node exists but is not a hierarchy node.
    #[error("node {id} is not a hierarchy node")]
    NotAHierarchyNode { id: NodeId },

    /// The node already carries an id, so it belongs to a scene.
    #[error("node {id} is already part of a scene")]
    AlreadyInScene { id: NodeId },

    /// The store is full.
    #[error("scene is full ({limit} nodes)")]
    CapacityExceeded { limit: usize },
}

/// The document a scene-views session works against.
///
/// Mutations do not call back into observers. They queue
/// [`SceneNotification`]s that the owner drains with [`drain_events`]
/// and dispatches in emission order.
///
/// [`drain_events`]: SceneStore::drain_events
pub trait SceneStore {
    /// Appends `node` at the end of the document and assigns its id.
    fn add_node(&mut self, node: Node) -> Result<NodeId>;

    /// Inserts `node` immediately before `reference` in document order.
    fn insert_before(&mut self, reference: &NodeId, node: Node) -> Result<NodeId>;

    /// Removes a node; `None` when it was not in the scene.
    fn remove_node(&mut self, id: &NodeId) -> Option<Node>;

    fn node(&self, id: &NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node>;

    /// Ids of every node of `kind`, in document order.
    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId>;

    /// A node name starting with `base` that no node currently uses.
    fn unique_name(&self, base: &str) -> String;

    /// `true` while a bulk update (import, batch load) is in progress.
    fn is_updating(&self) -> bool;

    /// Records an undo checkpoint of the current document state.
    fn save_undo_checkpoint(&mut self);

    /// Requests a new sibling position for hierarchy node `id`.
    ///
    /// The store decides whether the move is legal; out-of-range requests
    /// leave the node where it is. Returns the index after the request.
    fn set_index_in_parent(&mut self, id: &NodeId, index: i64) -> Result<usize>;

    /// Queues a [`SceneEvent::Modified`] for the node, if it exists.
    fn mark_modified(&mut self, id: &NodeId);

    /// Queues an arbitrary scene-level event.
    fn emit(&mut self, event: SceneEvent);

    /// Snapshot of the state scene views capture.
    fn capture_state(&self) -> SceneSnapshot;

    /// Puts a snapshot taken by [`capture_state`](SceneStore::capture_state) back.
    fn restore_state(&mut self, snapshot: &SceneSnapshot);

    /// Takes every queued notification, oldest first.
    fn drain_events(&mut self) -> Vec<SceneNotification>;

    // ── provided ──────────────────────────────────────────────────────────

    fn scene_view(&self, id: &NodeId) -> Option<&SceneViewNode> {
        self.node(id).and_then(Node::as_scene_view)
    }

    fn scene_view_mut(&mut self, id: &NodeId) -> Option<&mut SceneViewNode> {
        self.node_mut(id).and_then(Node::as_scene_view_mut)
    }

    fn hierarchy(&self, id: &NodeId) -> Option<&HierarchyNode> {
        self.node(id).and_then(Node::as_hierarchy)
    }

    fn hierarchy_mut(&mut self, id: &NodeId) -> Option<&mut HierarchyNode> {
        self.node_mut(id).and_then(Node::as_hierarchy_mut)
    }

    /// The hierarchy node associated with `id` (its proxy), if any.
    fn associated_hierarchy_node(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes_of_kind(NodeKind::Hierarchy).into_iter().find(|candidate| {
            self.hierarchy(candidate)
                .is_some_and(|h| h.associated_node_id.as_ref() == Some(id))
        })
    }

    /// Hierarchy children of `parent` (`None` = scene root), in sibling order.
    fn children(&self, parent: Option<&NodeId>) -> Vec<NodeId> {
        let mut children: Vec<(usize, NodeId)> = self
            .nodes_of_kind(NodeKind::Hierarchy)
            .into_iter()
            .filter_map(|id| {
                let h = self.hierarchy(&id)?;
                (h.parent_id() == parent).then(|| (h.index_in_parent(), id))
            })
            .collect();
        children.sort_by_key(|(index, _)| *index);
        children.into_iter().map(|(_, id)| id).collect()
    }
}
