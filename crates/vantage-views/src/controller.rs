//! Scene-view lifecycle control.
//!
//! [`SceneViewsController`] owns the attached scene store, the per-document
//! [`SceneViewSession`] and the tree-view observer. It exposes the synchronous
//! scene-view API and reacts to the store's notifications.
//!
//! # Notifications
//!
//! Stores queue notifications instead of calling back. Every mutating call
//! on the controller pumps the queue before returning; hosts that mutate the
//! store directly call [`SceneViewsController::process_scene_events`].
//! Handlers may mutate the store again; their notifications are delivered in
//! the same pump, in emission order.
//!
//! # Errors
//!
//! Errors are logged where they are detected and then returned. The move
//! operations never fail: bad input yields the input id back.

use log::{debug, error, warn};
use vantage_engine::scene::{
    EventTarget, NodeId, NodeKind, SceneEvent, SceneNotification, SceneStore, SceneViewNode,
    Screenshot,
};

use crate::config::SceneViewsConfig;
use crate::error::{Result, SceneViewError};
use crate::hierarchy::{Direction, HierarchyManager};
use crate::observer::TreeViewObserver;
use crate::session::SceneViewSession;

/// Scene-view API over one attached scene store.
pub struct SceneViewsController<S: SceneStore> {
    scene: Option<S>,
    session: SceneViewSession,
    config: SceneViewsConfig,
    observer: Option<Box<dyn TreeViewObserver>>,
}

impl<S: SceneStore> SceneViewsController<S> {
    /// Controller with no scene attached.
    ///
    /// `config` is expected to pass [`SceneViewsConfig::validate`]; use
    /// [`try_new`](Self::try_new) for configs from outside the program.
    pub fn new(config: SceneViewsConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid scene-view config: {config:?}");
        Self { scene: None, session: SceneViewSession::new(), config, observer: None }
    }

    pub fn try_new(config: SceneViewsConfig) -> Result<Self> {
        config.validate().inspect_err(|err| error!("{err}"))?;
        Ok(Self::new(config))
    }

    /// Controller already attached to `scene`, with default naming.
    pub fn with_scene(scene: S) -> Self {
        let mut controller = Self::new(SceneViewsConfig::default());
        controller.attach_scene(scene);
        controller
    }

    // ── wiring ────────────────────────────────────────────────────────────

    /// Attaches a document. The session starts fresh; a previously attached
    /// store is handed back.
    pub fn attach_scene(&mut self, scene: S) -> Option<S> {
        self.session.reset();
        self.scene.replace(scene)
    }

    pub fn detach_scene(&mut self) -> Option<S> {
        self.session.reset();
        self.scene.take()
    }

    #[inline]
    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    /// Direct store access for hosts. Follow up with
    /// [`process_scene_events`](Self::process_scene_events).
    #[inline]
    pub fn scene_mut(&mut self) -> Option<&mut S> {
        self.scene.as_mut()
    }

    pub fn set_observer(&mut self, observer: impl TreeViewObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    #[inline]
    pub fn config(&self) -> &SceneViewsConfig {
        &self.config
    }

    #[inline]
    pub fn session(&self) -> &SceneViewSession {
        &self.session
    }

    #[inline]
    pub fn active_hierarchy_id(&self) -> Option<&NodeId> {
        self.session.active_hierarchy()
    }

    #[inline]
    pub fn last_added_scene_view(&self) -> Option<&NodeId> {
        self.session.last_added()
    }

    /// Hierarchy operations on the attached scene.
    pub fn hierarchy(&mut self) -> Result<HierarchyManager<'_, S>> {
        let scene = attached_mut(&mut self.scene, "hierarchy")?;
        Ok(HierarchyManager::new(scene, &mut self.session, &self.config))
    }

    // ── notifications ─────────────────────────────────────────────────────

    /// Drains the store's queue and dispatches every notification, including
    /// the ones raised while handling earlier ones. Returns how many were
    /// dispatched.
    pub fn process_scene_events(&mut self) -> usize {
        let mut dispatched = 0;
        loop {
            let Some(scene) = self.scene.as_mut() else {
                return dispatched;
            };
            let batch = scene.drain_events();
            if batch.is_empty() {
                return dispatched;
            }
            for notification in batch {
                self.dispatch(notification);
                dispatched += 1;
            }
        }
    }

    fn dispatch(&mut self, notification: SceneNotification) {
        let updating = notification.during_update
            || self.scene.as_ref().is_some_and(|s| s.is_updating());
        match notification.event {
            SceneEvent::SceneClosed => self.on_scene_closed(),
            SceneEvent::SceneImported => self.on_scene_imported(),
            SceneEvent::NodeAdded(EventTarget::SceneView(id)) => self.on_node_added(&id, updating),
            SceneEvent::Modified(EventTarget::SceneView(id)) => self.on_node_modified(&id, updating),
            _ => {}
        }
    }

    fn on_node_added(&mut self, id: &NodeId, updating: bool) {
        if updating {
            debug!("node added {id}: scene is updating, skipping");
            return;
        }
        if self.scene.as_ref().is_none_or(|s| s.scene_view(id).is_none()) {
            debug!("node added {id}: gone before the notification arrived");
            return;
        }

        let proxy = match self.hierarchy().and_then(|mut h| h.ensure_proxy(id)) {
            Ok(proxy) => proxy,
            Err(err) => {
                error!("error adding a hierarchy node for scene view {id}: {err}");
                return;
            }
        };
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let Some(hierarchy_node) = scene.hierarchy_mut(&proxy) else {
            error!("no hierarchy node found for scene view {id}");
            return;
        };
        hierarchy_node.associated_node_id = Some(id.clone());
        scene.mark_modified(id);

        self.add_node_completed(id);
    }

    fn add_node_completed(&mut self, id: &NodeId) {
        self.session.set_last_added(Some(id.clone()));
        self.refresh();
    }

    fn on_node_modified(&mut self, id: &NodeId, updating: bool) {
        if updating {
            debug!("scene view {id} modified: scene is updating, skipping");
            return;
        }
        self.refresh();
    }

    fn on_scene_imported(&mut self) {
        debug!("scene imported, refreshing");
        self.refresh();
    }

    fn on_scene_closed(&mut self) {
        debug!("scene closed, dropping session state");
        self.session.reset();
        self.refresh();
    }

    fn refresh(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.refresh();
        }
    }

    // ── scene-view operations ─────────────────────────────────────────────

    /// Creates a scene view capturing the current scene state.
    ///
    /// An empty `name` gets a unique generated one. The screenshot is copied.
    /// If the proxy cannot be created the scene view stays in the scene
    /// without one; that is logged, not undone.
    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        screenshot_type: i32,
        screenshot: Option<&Screenshot>,
    ) -> Result<NodeId> {
        let scene = attached_mut(&mut self.scene, "create")?;
        let Some(screenshot) = screenshot else {
            error!("create: no screenshot was set");
            return Err(SceneViewError::MissingScreenshot { operation: "create" });
        };

        let name = if name.is_empty() {
            scene.unique_name(&self.config.scene_view_base_name)
        } else {
            name.to_owned()
        };
        let mut node = SceneViewNode::new(name)
            .with_description(description)
            .with_screenshot_type(screenshot_type);
        node.set_screenshot(screenshot.clone());
        node.store_scene(&*scene);

        let id = scene.add_node(node.into()).inspect_err(|err| {
            error!("create: could not add scene view: {err}");
        })?;

        match self.hierarchy().and_then(|mut h| h.ensure_proxy(&id)) {
            Ok(proxy) => debug!("created scene view {id} with hierarchy node {proxy}"),
            Err(err) => error!("create: error adding a hierarchy node for new scene view {id}: {err}"),
        }

        self.process_scene_events();
        Ok(id)
    }

    /// Updates a scene view in place.
    ///
    /// The screenshot is taken over without copying. An empty `name` gets a
    /// fresh unique one.
    pub fn modify(
        &mut self,
        id: &NodeId,
        name: &str,
        description: &str,
        screenshot_type: i32,
        screenshot: Option<Screenshot>,
    ) -> Result<()> {
        let scene = attached_mut(&mut self.scene, "modify")?;
        let Some(screenshot) = screenshot else {
            error!("modify: no screenshot was set");
            return Err(SceneViewError::MissingScreenshot { operation: "modify" });
        };
        if scene.scene_view(id).is_none() {
            error!("modify: could not get scene view {id}");
            return Err(SceneViewError::not_found(id));
        }

        let name = if name.is_empty() {
            scene.unique_name(&self.config.scene_view_base_name)
        } else {
            name.to_owned()
        };
        let Some(view) = scene.scene_view_mut(id) else {
            return Err(SceneViewError::not_found(id));
        };
        view.name = name;
        view.description = description.to_owned();
        view.screenshot_type = screenshot_type;
        view.set_screenshot(screenshot);

        // Observers listen on both the node and the scene.
        scene.mark_modified(id);
        scene.emit(SceneEvent::Modified(EventTarget::SceneView(id.clone())));

        self.process_scene_events();
        Ok(())
    }

    /// Puts the scene back into the state captured by scene view `id`,
    /// after recording an undo checkpoint.
    pub fn restore(&mut self, id: &NodeId) -> Result<()> {
        let scene = attached_mut(&mut self.scene, "restore")?;
        let Some(view) = scene.scene_view(id) else {
            error!("restore: could not get scene view {id}");
            return Err(SceneViewError::not_found(id));
        };
        let snapshot = view.stored_state().cloned();

        scene.save_undo_checkpoint();
        match snapshot {
            Some(snapshot) => scene.restore_state(&snapshot),
            None => warn!("restore: scene view {id} holds no captured state"),
        }

        self.process_scene_events();
        Ok(())
    }

    /// Removes scene view `id` and its proxy.
    pub fn remove(&mut self, id: &NodeId) -> Result<()> {
        let scene = attached_mut(&mut self.scene, "remove")?;
        if scene.scene_view(id).is_none() {
            error!("remove: no scene view {id} to remove");
            return Err(SceneViewError::not_found(id));
        }

        self.hierarchy()?.remove_content_node(id);
        self.process_scene_events();
        Ok(())
    }

    /// Creates a user grouping node and makes it the active hierarchy.
    pub fn add_hierarchy(&mut self) -> Result<NodeId> {
        let created = self.hierarchy()?.create_grouping_node();
        if let Err(err) = &created {
            error!("add hierarchy: {err}");
        }
        self.process_scene_events();
        created
    }

    /// Makes `node` the active hierarchy; `None` selects the top-level node.
    pub fn set_active_hierarchy(&mut self, node: Option<&NodeId>) -> Result<()> {
        let result = self.hierarchy()?.set_active_hierarchy(node);
        if let Err(err) = &result {
            error!("could not find or create any hierarchy: {err}");
        }
        self.process_scene_events();
        result
    }

    /// Like [`set_active_hierarchy`](Self::set_active_hierarchy), looking the
    /// node up first. Ids that are not hierarchy nodes select the top level.
    pub fn set_active_hierarchy_by_id(&mut self, id: &str) -> Result<()> {
        let scene = attached(&self.scene, "set active hierarchy")?;
        let id = NodeId::from(id);
        let node = scene.hierarchy(&id).is_some().then_some(id);
        self.set_active_hierarchy(node.as_ref())
    }

    /// Creates the proxies a bulk import skipped.
    pub fn backfill_proxies(&mut self) -> Result<Vec<NodeId>> {
        let created = self.hierarchy()?.backfill_proxies();
        match &created {
            Ok(ids) => debug!("backfilled {} hierarchy nodes", ids.len()),
            Err(err) => error!("backfill: {err}"),
        }
        self.process_scene_events();
        created
    }

    /// Moves scene view `id` one slot up among its siblings.
    ///
    /// Returns `""` for an empty id, otherwise the id itself, whether or not
    /// anything moved.
    pub fn move_up(&mut self, id: &str) -> String {
        self.move_scene_view(id, Direction::Up)
    }

    /// Moves scene view `id` one slot down among its siblings.
    ///
    /// Same return contract as [`move_up`](Self::move_up).
    pub fn move_down(&mut self, id: &str) -> String {
        self.move_scene_view(id, Direction::Down)
    }

    fn move_scene_view(&mut self, id: &str, direction: Direction) -> String {
        if id.is_empty() {
            return String::new();
        }
        let Some(scene) = self.scene.as_ref() else {
            error!("move {direction:?}: no scene set");
            return id.to_owned();
        };
        let node_id = NodeId::from(id);
        if scene.scene_view(&node_id).is_none() {
            error!("move {direction:?}: could not get scene view {id}");
            return id.to_owned();
        }

        let moved = match self.hierarchy() {
            Ok(mut hierarchy) => hierarchy.move_sibling(&node_id, direction),
            Err(_) => node_id,
        };
        self.process_scene_events();
        moved.to_string()
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn name(&self, id: &NodeId) -> Result<&str> {
        Ok(&self.scene_view(id, "name")?.name)
    }

    pub fn description(&self, id: &NodeId) -> Result<&str> {
        Ok(&self.scene_view(id, "description")?.description)
    }

    pub fn screenshot_type(&self, id: &NodeId) -> Result<i32> {
        Ok(self.scene_view(id, "screenshot type")?.screenshot_type)
    }

    /// The stored screenshot; `None` for views loaded without one.
    pub fn screenshot(&self, id: &NodeId) -> Result<Option<&Screenshot>> {
        Ok(self.scene_view(id, "screenshot")?.screenshot())
    }

    /// Every scene view in the attached scene, in document order.
    pub fn scene_view_ids(&self) -> Result<Vec<NodeId>> {
        Ok(attached(&self.scene, "list")?.nodes_of_kind(NodeKind::SceneView))
    }

    fn scene_view(&self, id: &NodeId, operation: &str) -> Result<&SceneViewNode> {
        let scene = attached(&self.scene, operation)?;
        scene.scene_view(id).ok_or_else(|| {
            error!("{operation}: could not get scene view {id}");
            SceneViewError::not_found(id)
        })
    }
}

impl<S: SceneStore> Default for SceneViewsController<S> {
    fn default() -> Self {
        Self::new(SceneViewsConfig::default())
    }
}

fn attached<'a, S>(scene: &'a Option<S>, operation: &str) -> Result<&'a S> {
    scene.as_ref().ok_or_else(|| {
        error!("{operation}: no scene set");
        SceneViewError::NoScene
    })
}

fn attached_mut<'a, S>(scene: &'a mut Option<S>, operation: &str) -> Result<&'a mut S> {
    scene.as_mut().ok_or_else(|| {
        error!("{operation}: no scene set");
        SceneViewError::NoScene
    })
}
