use std::collections::BTreeMap;

use image::RgbaImage;

use super::{NodeId, SceneStore};

/// Screenshot buffer attached to a scene view.
///
/// A plain value type: whether an operation copies it or takes it over is
/// decided by the operation, never by shared ownership.
pub type Screenshot = RgbaImage;

// ── NodeKind ──────────────────────────────────────────────────────────────

/// Node classes known to a scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A scene-view snapshot (content node).
    SceneView,
    /// An organizational node providing parent/child/sibling structure.
    Hierarchy,
    /// Any other scene content (cameras, models, …).
    Generic,
}

impl NodeKind {
    /// Prefix used by stores when allocating ids for this kind.
    #[inline]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            NodeKind::SceneView => "SceneViewNode",
            NodeKind::Hierarchy => "HierarchyNode",
            NodeKind::Generic => "Node",
        }
    }
}

// ── GenericNode ───────────────────────────────────────────────────────────

/// A scene node that carries the state captured by scene views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericNode {
    pub(crate) id: Option<NodeId>,
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl GenericNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into(), properties: BTreeMap::new() }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}

// ── HierarchyNode ─────────────────────────────────────────────────────────

/// Organizational record: a pure grouping node, or a hidden one-to-one proxy
/// giving a content node its place in the tree.
///
/// `parent_id` and `index_in_parent` are owned by the store once the node is
/// inserted; sibling indices stay dense and zero-based per parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyNode {
    pub(crate) id: Option<NodeId>,
    pub name: String,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) index_in_parent: usize,
    /// Set for proxies, `None` for grouping nodes.
    pub associated_node_id: Option<NodeId>,
    pub hide_from_editors: bool,
}

impl HierarchyNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Parent to attach under when the node is inserted.
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn associated_with(mut self, node: NodeId) -> Self {
        self.associated_node_id = Some(node);
        self
    }

    pub fn hidden(mut self, hide: bool) -> Self {
        self.hide_from_editors = hide;
        self
    }

    #[inline]
    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    #[inline]
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    #[inline]
    pub fn index_in_parent(&self) -> usize {
        self.index_in_parent
    }

    #[inline]
    pub fn is_proxy(&self) -> bool {
        self.associated_node_id.is_some()
    }
}

// ── SceneViewNode ─────────────────────────────────────────────────────────

/// Captured state of the generic nodes of a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    nodes: Vec<GenericNode>,
}

impl SceneSnapshot {
    pub fn new(nodes: Vec<GenericNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[GenericNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A named, described, screenshot-tagged capture of a scene's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneViewNode {
    pub(crate) id: Option<NodeId>,
    pub name: String,
    pub description: String,
    pub screenshot_type: i32,
    screenshot: Option<Screenshot>,
    stored_state: Option<SceneSnapshot>,
}

impl SceneViewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_screenshot_type(mut self, screenshot_type: i32) -> Self {
        self.screenshot_type = screenshot_type;
        self
    }

    #[inline]
    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    #[inline]
    pub fn screenshot(&self) -> Option<&Screenshot> {
        self.screenshot.as_ref()
    }

    /// Takes over `screenshot` as-is. Callers wanting an independent copy
    /// clone before handing it in.
    #[inline]
    pub fn set_screenshot(&mut self, screenshot: Screenshot) {
        self.screenshot = Some(screenshot);
    }

    #[inline]
    pub fn stored_state(&self) -> Option<&SceneSnapshot> {
        self.stored_state.as_ref()
    }

    /// Captures the current state of `scene` into this view.
    pub fn store_scene<S: SceneStore + ?Sized>(&mut self, scene: &S) {
        self.stored_state = Some(scene.capture_state());
    }
}

// ── Node ──────────────────────────────────────────────────────────────────

/// Any node a scene store can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    SceneView(SceneViewNode),
    Hierarchy(HierarchyNode),
    Generic(GenericNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::SceneView(_) => NodeKind::SceneView,
            Node::Hierarchy(_) => NodeKind::Hierarchy,
            Node::Generic(_) => NodeKind::Generic,
        }
    }

    pub fn id(&self) -> Option<&NodeId> {
        match self {
            Node::SceneView(n) => n.id(),
            Node::Hierarchy(n) => n.id(),
            Node::Generic(n) => n.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::SceneView(n) => &n.name,
            Node::Hierarchy(n) => &n.name,
            Node::Generic(n) => &n.name,
        }
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        let slot = match self {
            Node::SceneView(n) => &mut n.id,
            Node::Hierarchy(n) => &mut n.id,
            Node::Generic(n) => &mut n.id,
        };
        *slot = Some(id);
    }

    pub fn as_scene_view(&self) -> Option<&SceneViewNode> {
        match self {
            Node::SceneView(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_scene_view_mut(&mut self) -> Option<&mut SceneViewNode> {
        match self {
            Node::SceneView(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_hierarchy(&self) -> Option<&HierarchyNode> {
        match self {
            Node::Hierarchy(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_hierarchy_mut(&mut self) -> Option<&mut HierarchyNode> {
        match self {
            Node::Hierarchy(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericNode> {
        match self {
            Node::Generic(n) => Some(n),
            _ => None,
        }
    }
}

impl From<SceneViewNode> for Node {
    fn from(node: SceneViewNode) -> Self {
        Node::SceneView(node)
    }
}

impl From<HierarchyNode> for Node {
    fn from(node: HierarchyNode) -> Self {
        Node::Hierarchy(node)
    }
}

impl From<GenericNode> for Node {
    fn from(node: GenericNode) -> Self {
        Node::Generic(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Node::from(SceneViewNode::new("a")).kind(), NodeKind::SceneView);
        assert_eq!(Node::from(HierarchyNode::new("h")).kind(), NodeKind::Hierarchy);
        assert_eq!(Node::from(GenericNode::new("g")).kind(), NodeKind::Generic);
    }

    #[test]
    fn new_nodes_have_no_id() {
        let node = Node::from(HierarchyNode::new("h"));
        assert!(node.id().is_none());
        assert_eq!(node.name(), "h");
    }

    #[test]
    fn hierarchy_builder_sets_proxy_fields() {
        let h = HierarchyNode::new("proxy")
            .with_parent(NodeId::from("HierarchyNode1"))
            .associated_with(NodeId::from("SceneViewNode1"))
            .hidden(true);
        assert!(h.is_proxy());
        assert!(h.hide_from_editors);
        assert_eq!(h.parent_id().map(NodeId::as_str), Some("HierarchyNode1"));
    }

    #[test]
    fn set_screenshot_keeps_the_buffer() {
        let shot = Screenshot::new(4, 4);
        let ptr = shot.as_raw().as_ptr();
        let mut view = SceneViewNode::new("v");
        view.set_screenshot(shot);
        assert_eq!(view.screenshot().map(|s| s.as_raw().as_ptr()), Some(ptr));
    }

    #[test]
    fn generic_properties() {
        let mut camera = GenericNode::new("Camera").with_property("position", "0,0,10");
        assert_eq!(camera.property("position"), Some("0,0,10"));
        camera.set_property("position", "1,2,3");
        assert_eq!(camera.property("position"), Some("1,2,3"));
        assert_eq!(camera.property("missing"), None);
    }
}
