//! Proxy hierarchy maintenance.
//!
//! Every scene view gets at most one hidden hierarchy node (its proxy) that
//! gives it a position in the tree. Proxies hang below the session's active
//! hierarchy node, which defaults to a single visible top-level node that is
//! created on first need.
//!
//! # Invariants
//!
//! - a content node has at most one proxy; lookups always precede creation
//! - one node carries the top-level name prefix once any hierarchy exists
//! - proxies are hidden from editors, grouping and top-level nodes are not
//! - a proxy is removed before the content node it stands for

use log::{debug, warn};
use vantage_engine::scene::{HierarchyNode, Node, NodeId, NodeKind, SceneStore};

use crate::config::SceneViewsConfig;
use crate::error::{Result, SceneViewError};
use crate::session::SceneViewSession;

/// Sibling move direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    const fn offset(self) -> i64 {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// Hierarchy operations over one scene and its session.
///
/// Borrowed for the duration of a single operation; all state that outlives
/// the call lives in the store or the [`SceneViewSession`].
pub struct HierarchyManager<'a, S: SceneStore + ?Sized> {
    scene: &'a mut S,
    session: &'a mut SceneViewSession,
    config: &'a SceneViewsConfig,
}

impl<'a, S: SceneStore + ?Sized> HierarchyManager<'a, S> {
    pub fn new(
        scene: &'a mut S,
        session: &'a mut SceneViewSession,
        config: &'a SceneViewsConfig,
    ) -> Self {
        Self { scene, session, config }
    }

    /// The proxy of `content_id`, if one exists.
    #[inline]
    pub fn proxy_for(&self, content_id: &NodeId) -> Option<NodeId> {
        self.scene.associated_hierarchy_node(content_id)
    }

    /// Returns the proxy of `content_id`, creating it on first need.
    ///
    /// A new proxy is hidden, parented under the active hierarchy and placed
    /// right before the content node in document order.
    pub fn ensure_proxy(&mut self, content_id: &NodeId) -> Result<NodeId> {
        if let Some(existing) = self.proxy_for(content_id) {
            debug!("{content_id} already has hierarchy node {existing}");
            return Ok(existing);
        }

        let parent = self.active_or_top_level(Some(content_id))?;
        let proxy = HierarchyNode::new(self.scene.unique_name(&self.config.hierarchy_base_name))
            .with_parent(parent)
            .associated_with(content_id.clone())
            .hidden(true);

        let id = self
            .scene
            .insert_before(content_id, proxy.into())
            .map_err(SceneViewError::hierarchy_creation)?;
        debug!("added hierarchy node {id} for {content_id}");
        Ok(id)
    }

    /// Creates a visible grouping node under the active hierarchy and makes
    /// it the active hierarchy.
    pub fn create_grouping_node(&mut self) -> Result<NodeId> {
        let parent = self.active_or_top_level(None)?;
        let node = HierarchyNode::new(self.scene.unique_name(&self.config.hierarchy_base_name))
            .with_parent(parent);

        let id = self
            .scene
            .add_node(node.into())
            .map_err(SceneViewError::hierarchy_creation)?;
        debug!("added grouping node {id}, now active");
        self.session.set_active_hierarchy(Some(id.clone()));
        Ok(id)
    }

    /// Finds the top-level node or creates it.
    ///
    /// The first hierarchy node in document order whose name carries the
    /// top-level prefix wins; duplicates are not reconciled. A new node is
    /// visible and is appended, or inserted before `insert_before`.
    pub fn resolve_top_level_node(&mut self, insert_before: Option<&NodeId>) -> Result<NodeId> {
        let found = self
            .scene
            .nodes_of_kind(NodeKind::Hierarchy)
            .into_iter()
            .find(|id| {
                self.scene
                    .node(id)
                    .is_some_and(|n| self.config.is_top_level_name(n.name()))
            });
        if let Some(found) = found {
            return Ok(found);
        }

        let node: Node = HierarchyNode::new(self.scene.unique_name(&self.config.top_level_name)).into();
        let created = match insert_before {
            Some(reference) => self.scene.insert_before(reference, node),
            None => self.scene.add_node(node),
        };
        let id = created.map_err(SceneViewError::hierarchy_creation)?;
        debug!("no top-level hierarchy node, created {id}");
        Ok(id)
    }

    /// Makes `node` the active hierarchy, or the top-level node when `None`.
    ///
    /// A given node is taken as-is; the caller vouches for it.
    pub fn set_active_hierarchy(&mut self, node: Option<&NodeId>) -> Result<()> {
        let active = match node {
            Some(id) => id.clone(),
            None => self.resolve_top_level_node(None)?,
        };
        self.session.set_active_hierarchy(Some(active));
        Ok(())
    }

    /// Moves the proxy of `content_id` one sibling slot up or down.
    ///
    /// Without a proxy this is a no-op. The store decides whether the move is
    /// legal; the content node is marked modified only when the index really
    /// changed. Always returns `content_id`.
    pub fn move_sibling(&mut self, content_id: &NodeId, direction: Direction) -> NodeId {
        let Some(proxy) = self.proxy_for(content_id) else {
            warn!("did not find a hierarchy node for {content_id}, nothing to move");
            return content_id.clone();
        };
        let Some(current) = self.scene.hierarchy(&proxy).map(HierarchyNode::index_in_parent) else {
            return content_id.clone();
        };

        let requested = current as i64 + direction.offset();
        match self.scene.set_index_in_parent(&proxy, requested) {
            Ok(index) if index != current => {
                debug!("moved {content_id} {direction:?}: {current} -> {index}");
                self.scene.mark_modified(content_id);
            }
            Ok(_) => debug!("{content_id} stays at {current}"),
            Err(err) => warn!("could not move {content_id}: {err}"),
        }
        content_id.clone()
    }

    /// Removes `content_id` together with its proxy, proxy first.
    ///
    /// Returns the removed content node.
    pub fn remove_content_node(&mut self, content_id: &NodeId) -> Option<Node> {
        if let Some(proxy) = self.proxy_for(content_id) {
            self.scene.remove_node(&proxy);
        }
        self.scene.remove_node(content_id)
    }

    /// Creates proxies for every scene view that lacks one.
    ///
    /// Bulk imports skip proxy creation, so hosts call this once an import is
    /// over. Returns the proxies created.
    pub fn backfill_proxies(&mut self) -> Result<Vec<NodeId>> {
        let mut created = Vec::new();
        for content_id in self.scene.nodes_of_kind(NodeKind::SceneView) {
            if self.proxy_for(&content_id).is_some() {
                continue;
            }
            created.push(self.ensure_proxy(&content_id)?);
        }
        Ok(created)
    }

    /// The active hierarchy, or the top-level node when none is set.
    ///
    /// An active id is used as-is, whether or not the store still holds it.
    fn active_or_top_level(&mut self, insert_before: Option<&NodeId>) -> Result<NodeId> {
        if let Some(active) = self.session.active_hierarchy() {
            return Ok(active.clone());
        }

        debug!("no active hierarchy, using the top-level node");
        let top_level = self.resolve_top_level_node(insert_before)?;
        self.session.set_active_hierarchy(Some(top_level.clone()));
        Ok(top_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_engine::scene::{EventTarget, MemoryScene, SceneEvent, SceneViewNode};

    struct Fixture {
        scene: MemoryScene,
        session: SceneViewSession,
        config: SceneViewsConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_scene(MemoryScene::new())
        }

        fn with_scene(scene: MemoryScene) -> Self {
            Self { scene, session: SceneViewSession::new(), config: SceneViewsConfig::default() }
        }

        fn manager(&mut self) -> HierarchyManager<'_, MemoryScene> {
            HierarchyManager::new(&mut self.scene, &mut self.session, &self.config)
        }

        fn view(&mut self, name: &str) -> NodeId {
            self.scene.add_node(SceneViewNode::new(name).into()).unwrap()
        }

        fn view_with_proxy(&mut self, name: &str) -> NodeId {
            let id = self.view(name);
            self.manager().ensure_proxy(&id).unwrap();
            id
        }

        fn top_level_nodes(&self) -> Vec<NodeId> {
            self.scene
                .nodes_of_kind(NodeKind::Hierarchy)
                .into_iter()
                .filter(|id| self.config.is_top_level_name(self.scene.node(id).unwrap().name()))
                .collect()
        }

        /// Content ids in sibling order under `parent`.
        fn order(&self, parent: &NodeId) -> Vec<NodeId> {
            self.scene
                .children(Some(parent))
                .iter()
                .filter_map(|h| self.scene.hierarchy(h)?.associated_node_id.clone())
                .collect()
        }
    }

    // ── ensure_proxy ──────────────────────────────────────────────────────

    #[test]
    fn ensure_proxy_is_idempotent() {
        let mut fx = Fixture::new();
        let view = fx.view("v");
        let first = fx.manager().ensure_proxy(&view).unwrap();
        let second = fx.manager().ensure_proxy(&view).unwrap();
        assert_eq!(first, second);
        assert_eq!(fx.scene.nodes_of_kind(NodeKind::Hierarchy).len(), 2); // top level + proxy
    }

    #[test]
    fn proxy_is_hidden_and_placed_before_content() {
        let mut fx = Fixture::new();
        let view = fx.view("v");
        let proxy = fx.manager().ensure_proxy(&view).unwrap();

        let h = fx.scene.hierarchy(&proxy).unwrap();
        assert!(h.hide_from_editors);
        assert_eq!(h.associated_node_id.as_ref(), Some(&view));
        assert_eq!(h.parent_id(), fx.session.active_hierarchy());
        assert_eq!(fx.scene.position(&proxy).unwrap() + 1, fx.scene.position(&view).unwrap());
    }

    #[test]
    fn first_proxy_creates_top_level_before_content() {
        let mut fx = Fixture::new();
        let view = fx.view("v");
        fx.manager().ensure_proxy(&view).unwrap();

        let top = fx.top_level_nodes();
        assert_eq!(top.len(), 1);
        let node = fx.scene.hierarchy(&top[0]).unwrap();
        assert!(!node.hide_from_editors);
        assert_eq!(node.parent_id(), None);
        assert!(fx.scene.position(&top[0]).unwrap() < fx.scene.position(&view).unwrap());
        assert_eq!(fx.session.active_hierarchy(), Some(&top[0]));
    }

    #[test]
    fn single_top_level_across_many_proxies() {
        let mut fx = Fixture::new();
        for name in ["a", "b", "c"] {
            fx.view_with_proxy(name);
        }
        fx.manager().create_grouping_node().unwrap();
        fx.view_with_proxy("d");
        assert_eq!(fx.top_level_nodes().len(), 1);
    }

    #[test]
    fn proxy_creation_refused_by_store() {
        let mut fx = Fixture::with_scene(MemoryScene::with_node_limit(1));
        let view = fx.view("v");
        let err = fx.manager().ensure_proxy(&view).unwrap_err();
        assert!(err.breaks_hierarchy());
        assert!(fx.manager().proxy_for(&view).is_none());
    }

    #[test]
    fn removed_active_hierarchy_is_still_used_as_parent() {
        // No revalidation: the session keeps pointing at the removed group.
        let mut fx = Fixture::new();
        let group = fx.manager().create_grouping_node().unwrap();
        fx.scene.remove_node(&group);

        let view = fx.view_with_proxy("v");
        let proxy = fx.manager().proxy_for(&view).unwrap();
        assert_eq!(fx.scene.hierarchy(&proxy).unwrap().parent_id(), Some(&group));
        assert_eq!(fx.session.active_hierarchy(), Some(&group));
    }

    // ── grouping nodes ────────────────────────────────────────────────────

    #[test]
    fn grouping_node_is_visible_and_becomes_active() {
        let mut fx = Fixture::new();
        let group = fx.manager().create_grouping_node().unwrap();

        let h = fx.scene.hierarchy(&group).unwrap();
        assert!(!h.hide_from_editors);
        assert!(!h.is_proxy());
        assert_eq!(h.parent_id(), Some(&fx.top_level_nodes()[0]));
        assert_eq!(fx.session.active_hierarchy(), Some(&group));

        let view = fx.view_with_proxy("nested");
        let proxy = fx.manager().proxy_for(&view).unwrap();
        assert_eq!(fx.scene.hierarchy(&proxy).unwrap().parent_id(), Some(&group));
    }

    #[test]
    fn grouping_nodes_nest() {
        let mut fx = Fixture::new();
        let outer = fx.manager().create_grouping_node().unwrap();
        let inner = fx.manager().create_grouping_node().unwrap();
        assert_eq!(fx.scene.hierarchy(&inner).unwrap().parent_id(), Some(&outer));
        assert_ne!(fx.scene.node(&outer).unwrap().name(), fx.scene.node(&inner).unwrap().name());
    }

    // ── top level ─────────────────────────────────────────────────────────

    #[test]
    fn resolve_top_level_reuses_existing() {
        let mut fx = Fixture::new();
        let first = fx.manager().resolve_top_level_node(None).unwrap();
        let again = fx.manager().resolve_top_level_node(None).unwrap();
        assert_eq!(first, again);
        assert_eq!(fx.scene.position(&first), Some(0));
    }

    #[test]
    fn resolve_top_level_with_duplicates_takes_first_in_document_order() {
        // Duplicates are tolerated, not merged.
        let mut fx = Fixture::new();
        let later = fx.scene.add_node(HierarchyNode::new("SceneViewToplevelHierarchyNode").into()).unwrap();
        let earlier = fx
            .scene
            .insert_before(&later, HierarchyNode::new("SceneViewToplevelHierarchyNode_1").into())
            .unwrap();

        assert_eq!(fx.manager().resolve_top_level_node(None).unwrap(), earlier);
        assert_eq!(fx.top_level_nodes().len(), 2);
    }

    #[test]
    fn set_active_hierarchy_none_uses_top_level() {
        let mut fx = Fixture::new();
        let group = fx.manager().create_grouping_node().unwrap();
        fx.manager().set_active_hierarchy(None).unwrap();
        assert_ne!(fx.session.active_hierarchy(), Some(&group));
        assert_eq!(fx.session.active_hierarchy(), fx.top_level_nodes().first());
    }

    #[test]
    fn set_active_hierarchy_takes_given_node() {
        let mut fx = Fixture::new();
        let unchecked = NodeId::from("HierarchyNode77");
        fx.manager().set_active_hierarchy(Some(&unchecked)).unwrap();
        assert_eq!(fx.session.active_hierarchy(), Some(&unchecked));

        let view = fx.view("v");
        let proxy = fx.manager().ensure_proxy(&view).unwrap();
        assert_eq!(fx.scene.hierarchy(&proxy).unwrap().parent_id(), Some(&unchecked));
        assert_eq!(fx.session.active_hierarchy(), Some(&unchecked));
        assert!(fx.top_level_nodes().is_empty());
    }

    // ── move_sibling ──────────────────────────────────────────────────────

    #[test]
    fn move_up_swaps_with_previous_sibling() {
        let mut fx = Fixture::new();
        let a = fx.view_with_proxy("a");
        let b = fx.view_with_proxy("b");
        let c = fx.view_with_proxy("c");
        let top = fx.top_level_nodes()[0].clone();
        fx.scene.drain_events();

        assert_eq!(fx.manager().move_sibling(&b, Direction::Up), b);
        assert_eq!(fx.order(&top), [b.clone(), a, c]);
        let events: Vec<_> = fx.scene.drain_events().into_iter().map(|n| n.event).collect();
        assert!(events.contains(&SceneEvent::Modified(EventTarget::SceneView(b))));
    }

    #[test]
    fn move_down_swaps_with_next_sibling() {
        let mut fx = Fixture::new();
        let a = fx.view_with_proxy("a");
        let b = fx.view_with_proxy("b");
        let top = fx.top_level_nodes()[0].clone();

        fx.manager().move_sibling(&a, Direction::Down);
        assert_eq!(fx.order(&top), [b, a]);
    }

    #[test]
    fn moves_at_boundaries_change_nothing() {
        let mut fx = Fixture::new();
        let a = fx.view_with_proxy("a");
        let b = fx.view_with_proxy("b");
        let top = fx.top_level_nodes()[0].clone();
        fx.scene.drain_events();

        assert_eq!(fx.manager().move_sibling(&a, Direction::Up), a);
        assert_eq!(fx.manager().move_sibling(&b, Direction::Down), b);
        assert_eq!(fx.order(&top), [a, b]);
        assert!(fx.scene.drain_events().is_empty());
    }

    #[test]
    fn move_without_proxy_returns_input() {
        let mut fx = Fixture::new();
        let loose = fx.view("loose");
        fx.scene.drain_events();
        assert_eq!(fx.manager().move_sibling(&loose, Direction::Up), loose);
        assert!(fx.scene.drain_events().is_empty());
    }

    // ── removal ───────────────────────────────────────────────────────────

    #[test]
    fn remove_takes_proxy_out_before_content() {
        let mut fx = Fixture::new();
        let view = fx.view_with_proxy("v");
        let proxy = fx.manager().proxy_for(&view).unwrap();
        fx.scene.drain_events();

        let removed = fx.manager().remove_content_node(&view).unwrap();
        assert_eq!(removed.id(), Some(&view));
        assert!(fx.scene.node(&view).is_none());
        assert!(fx.manager().proxy_for(&view).is_none());

        let events: Vec<_> = fx.scene.drain_events().into_iter().map(|n| n.event).collect();
        assert_eq!(
            events,
            [
                SceneEvent::NodeRemoved(EventTarget::Hierarchy(proxy)),
                SceneEvent::NodeRemoved(EventTarget::SceneView(view)),
            ]
        );
    }

    #[test]
    fn remove_without_proxy_removes_content_only() {
        let mut fx = Fixture::new();
        let view = fx.view("v");
        assert!(fx.manager().remove_content_node(&view).is_some());
        assert!(fx.scene.is_empty());
    }

    // ── backfill ──────────────────────────────────────────────────────────

    #[test]
    fn backfill_creates_missing_proxies_only() {
        let mut fx = Fixture::new();
        let with_proxy = fx.view_with_proxy("a");
        fx.view("b");
        fx.view("c");

        let created = fx.manager().backfill_proxies().unwrap();
        assert_eq!(created.len(), 2);
        assert!(fx.manager().backfill_proxies().unwrap().is_empty());
        assert!(fx.manager().proxy_for(&with_proxy).is_some());
    }
}
