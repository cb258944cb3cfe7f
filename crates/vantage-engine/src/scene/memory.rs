use std::collections::HashMap;

use log::{debug, warn};

use super::{
    EventTarget, Node, NodeId, NodeKind, Result, SceneEvent, SceneNotification, SceneSnapshot,
    SceneStore, StoreError,
};

/// In-memory scene document.
///
/// Nodes are kept in document order (insertion order, with
/// [`insert_before`](SceneStore::insert_before) splicing ahead of a
/// reference node). Hierarchy sibling indices are kept dense per parent:
/// appended on insert, compacted on removal.
///
/// Performance characteristics:
/// - id lookups are O(n); scenes handled here hold tens to hundreds of nodes
/// - notifications are buffered until [`drain_events`](SceneStore::drain_events)
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<Node>,
    next_serial: HashMap<NodeKind, u64>,

    updating: bool,
    undo_checkpoints: usize,
    node_limit: Option<usize>,

    pending: Vec<SceneNotification>,
}

impl MemoryScene {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene that refuses new nodes once it holds `limit` of them.
    pub fn with_node_limit(limit: usize) -> Self {
        Self { node_limit: Some(limit), ..Self::default() }
    }

    pub fn set_node_limit(&mut self, limit: Option<usize>) {
        self.node_limit = limit;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in document order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Document-order position of `id`.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == Some(id))
    }

    /// Number of undo checkpoints requested so far.
    #[inline]
    pub fn undo_checkpoints(&self) -> usize {
        self.undo_checkpoints
    }

    pub fn begin_update(&mut self) {
        self.updating = true;
    }

    pub fn end_update(&mut self) {
        self.updating = false;
    }

    /// Bulk-loads `nodes`.
    ///
    /// Every `NodeAdded` emitted here is flagged as happening during an
    /// update. A single [`SceneEvent::SceneImported`] follows once the load
    /// is over, whether or not it succeeded.
    pub fn import(&mut self, nodes: impl IntoIterator<Item = Node>) -> Result<Vec<NodeId>> {
        self.begin_update();
        let result = nodes
            .into_iter()
            .map(|node| self.add_node(node))
            .collect::<Result<Vec<_>>>();
        self.end_update();

        self.emit(SceneEvent::SceneImported);
        debug!("import finished: {} nodes in scene", self.nodes.len());
        result
    }

    /// Drops every node and announces the document teardown.
    pub fn close(&mut self) {
        self.nodes.clear();
        self.updating = false;
        self.emit(SceneEvent::SceneClosed);
    }

    fn allocate_id(&mut self, kind: NodeKind) -> NodeId {
        let serial = self.next_serial.entry(kind).or_insert(0);
        *serial += 1;
        NodeId::new(format!("{}{}", kind.id_prefix(), serial))
    }

    /// Validates an incoming node, assigns its id and its sibling index.
    fn prepare(&mut self, mut node: Node) -> Result<(NodeId, Node)> {
        if let Some(id) = node.id() {
            return Err(StoreError::AlreadyInScene { id: id.clone() });
        }
        if let Some(limit) = self.node_limit {
            if self.nodes.len() >= limit {
                return Err(StoreError::CapacityExceeded { limit });
            }
        }

        let id = self.allocate_id(node.kind());
        let sibling_count = match &node {
            Node::Hierarchy(h) => self.children(h.parent_id()).len(),
            _ => 0,
        };
        if let Node::Hierarchy(h) = &mut node {
            h.index_in_parent = sibling_count;
        }
        node.set_id(id.clone());
        Ok((id, node))
    }

    fn reindex_siblings(&mut self, parent: Option<&NodeId>) {
        for (index, id) in self.children(parent).into_iter().enumerate() {
            if let Some(h) = self.hierarchy_mut(&id) {
                h.index_in_parent = index;
            }
        }
    }

    fn push_event(&mut self, event: SceneEvent) {
        self.pending.push(SceneNotification { event, during_update: self.updating });
    }
}

impl SceneStore for MemoryScene {
    fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let (id, node) = self.prepare(node)?;
        let kind = node.kind();
        self.nodes.push(node);
        debug!("added {id} at the end of the scene");
        self.push_event(SceneEvent::NodeAdded(EventTarget::new(kind, id.clone())));
        Ok(id)
    }

    fn insert_before(&mut self, reference: &NodeId, node: Node) -> Result<NodeId> {
        let position = self
            .position(reference)
            .ok_or_else(|| StoreError::NodeNotFound { id: reference.clone() })?;
        let (id, node) = self.prepare(node)?;
        let kind = node.kind();
        self.nodes.insert(position, node);
        debug!("inserted {id} before {reference}");
        self.push_event(SceneEvent::NodeAdded(EventTarget::new(kind, id.clone())));
        Ok(id)
    }

    fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let position = self.position(id)?;
        let node = self.nodes.remove(position);
        if let Node::Hierarchy(h) = &node {
            let parent = h.parent_id().cloned();
            self.reindex_siblings(parent.as_ref());
        }
        debug!("removed {id}");
        self.push_event(SceneEvent::NodeRemoved(EventTarget::new(node.kind(), id.clone())));
        Some(node)
    }

    fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == Some(id))
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == Some(id))
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == kind)
            .filter_map(|n| n.id().cloned())
            .collect()
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |candidate: &str| self.nodes.iter().any(|n| n.name() == candidate);
        if !taken(base) {
            return base.to_owned();
        }
        let mut serial = 1u64;
        loop {
            let candidate = format!("{base}_{serial}");
            if !taken(&candidate) {
                return candidate;
            }
            serial += 1;
        }
    }

    fn is_updating(&self) -> bool {
        self.updating
    }

    fn save_undo_checkpoint(&mut self) {
        self.undo_checkpoints += 1;
    }

    fn set_index_in_parent(&mut self, id: &NodeId, index: i64) -> Result<usize> {
        let node = self.node(id).ok_or_else(|| StoreError::NodeNotFound { id: id.clone() })?;
        let h = node
            .as_hierarchy()
            .ok_or_else(|| StoreError::NotAHierarchyNode { id: id.clone() })?;
        let parent = h.parent_id().cloned();
        let current = h.index_in_parent();

        let mut siblings = self.children(parent.as_ref());
        let Some(target) = usize::try_from(index).ok().filter(|i| *i < siblings.len()) else {
            debug!("{id}: index {index} outside 0..{}, staying at {current}", siblings.len());
            return Ok(current);
        };
        let Some(from) = siblings.iter().position(|s| s == id) else {
            return Ok(current);
        };
        if from == target {
            return Ok(current);
        }

        let moved = siblings.remove(from);
        siblings.insert(target, moved);
        for (i, sibling) in siblings.iter().enumerate() {
            if let Some(h) = self.hierarchy_mut(sibling) {
                h.index_in_parent = i;
            }
        }
        self.push_event(SceneEvent::Modified(EventTarget::Hierarchy(id.clone())));
        Ok(target)
    }

    fn mark_modified(&mut self, id: &NodeId) {
        let Some(kind) = self.node(id).map(Node::kind) else {
            return;
        };
        self.push_event(SceneEvent::Modified(EventTarget::new(kind, id.clone())));
    }

    fn emit(&mut self, event: SceneEvent) {
        self.push_event(event);
    }

    fn capture_state(&self) -> SceneSnapshot {
        SceneSnapshot::new(self.nodes.iter().filter_map(Node::as_generic).cloned().collect())
    }

    fn restore_state(&mut self, snapshot: &SceneSnapshot) {
        for saved in snapshot.nodes() {
            let Some(id) = saved.id().cloned() else {
                continue;
            };
            match self.node_mut(&id) {
                Some(Node::Generic(current)) => {
                    current.name = saved.name.clone();
                    current.properties = saved.properties.clone();
                    self.push_event(SceneEvent::Modified(EventTarget::Other(id)));
                }
                Some(_) => warn!("restore: {id} is no longer a generic node, skipping"),
                None => {
                    // Node was removed after the capture; bring it back as it was.
                    self.nodes.push(Node::Generic(saved.clone()));
                    self.push_event(SceneEvent::NodeAdded(EventTarget::Other(id)));
                }
            }
        }
    }

    fn drain_events(&mut self) -> Vec<SceneNotification> {
        std::mem::take(&mut self.pending)
    }
}
