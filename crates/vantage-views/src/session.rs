use vantage_engine::scene::NodeId;

/// Per-document state of the scene-views layer.
///
/// One session belongs to one open document and is reset when that document
/// closes. Nothing here is persisted.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SceneViewSession {
    /// Default parent for new proxy and grouping nodes.
    active_hierarchy: Option<NodeId>,
    /// Most recently completed scene-view addition.
    last_added: Option<NodeId>,
}

impl SceneViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn active_hierarchy(&self) -> Option<&NodeId> {
        self.active_hierarchy.as_ref()
    }

    #[inline]
    pub fn set_active_hierarchy(&mut self, node: Option<NodeId>) {
        self.active_hierarchy = node;
    }

    #[inline]
    pub fn last_added(&self) -> Option<&NodeId> {
        self.last_added.as_ref()
    }

    #[inline]
    pub fn set_last_added(&mut self, node: Option<NodeId>) {
        self.last_added = node;
    }

    /// Forgets everything tied to the current document.
    pub fn reset(&mut self) {
        self.active_hierarchy = None;
        self.last_added = None;
    }
}
