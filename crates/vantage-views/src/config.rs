//! Naming configuration for scene views and their hierarchy.

use crate::error::{Result, SceneViewError};

/// Reserved names used when generating nodes.
///
/// The top-level node is recognized by name prefix, so `top_level_name`
/// must be non-empty and must not be a prefix of `hierarchy_base_name`.
/// [`validate`](Self::validate) checks this once all setters have run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SceneViewsConfig {
    /// Base for auto-generated scene view names.
    pub scene_view_base_name: String,
    /// Base for proxy and grouping node names.
    pub hierarchy_base_name: String,
    /// Name prefix identifying the top-level grouping node.
    pub top_level_name: String,
}

impl SceneViewsConfig {
    pub fn with_scene_view_base_name(mut self, name: impl Into<String>) -> Self {
        self.scene_view_base_name = name.into();
        self
    }

    pub fn with_hierarchy_base_name(mut self, name: impl Into<String>) -> Self {
        self.hierarchy_base_name = name.into();
        self
    }

    pub fn with_top_level_name(mut self, name: impl Into<String>) -> Self {
        self.top_level_name = name.into();
        self
    }

    /// Rejects names under which proxies and grouping nodes would be
    /// mistaken for the top-level node.
    pub fn validate(&self) -> Result<()> {
        if self.top_level_name.is_empty() {
            return Err(SceneViewError::InvalidConfig {
                reason: "top-level name is empty".to_string(),
            });
        }
        if self.is_top_level_name(&self.hierarchy_base_name) {
            return Err(SceneViewError::InvalidConfig {
                reason: format!(
                    "top-level name {:?} is a prefix of hierarchy base name {:?}",
                    self.top_level_name, self.hierarchy_base_name
                ),
            });
        }
        Ok(())
    }

    /// `true` when `name` marks a top-level grouping node.
    #[inline]
    pub fn is_top_level_name(&self, name: &str) -> bool {
        name.starts_with(self.top_level_name.as_str())
    }
}

impl Default for SceneViewsConfig {
    fn default() -> Self {
        Self {
            scene_view_base_name: "SceneView".to_string(),
            hierarchy_base_name: "SceneViewHierarchy".to_string(),
            top_level_name: "SceneViewToplevelHierarchyNode".to_string(),
        }
    }
}
