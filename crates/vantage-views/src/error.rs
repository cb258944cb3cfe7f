//! Error types for scene-view operations

use thiserror::Error;
use vantage_engine::scene::StoreError;

/// Result type for scene-view operations
pub type Result<T> = std::result::Result<T, SceneViewError>;

/// Errors detected by the hierarchy manager and the lifecycle controller.
///
/// Every variant is logged where it is detected before it is returned.
#[derive(Debug, Error)]
pub enum SceneViewError {
    /// No scene store is attached
    #[error("no scene set")]
    NoScene,

    /// The id does not resolve to a scene view
    #[error("scene view not found: {id}")]
    NotFound { id: String },

    /// A required screenshot buffer was not supplied
    #[error("{operation}: no screenshot was set")]
    MissingScreenshot { operation: &'static str },

    /// The store refused to create a hierarchy node
    #[error("could not create hierarchy node: {source}")]
    HierarchyCreation {
        #[source]
        source: StoreError,
    },

    /// The naming configuration cannot tell node roles apart
    #[error("invalid scene-view config: {reason}")]
    InvalidConfig { reason: String },

    /// Any other store refusal
    #[error("scene store error: {0}")]
    Store(#[from] StoreError),
}

impl SceneViewError {
    pub fn not_found(id: impl AsRef<str>) -> Self {
        Self::NotFound { id: id.as_ref().to_owned() }
    }

    pub fn hierarchy_creation(source: StoreError) -> Self {
        Self::HierarchyCreation { source }
    }

    /// `true` for errors that leave a content node without its proxy.
    pub fn breaks_hierarchy(&self) -> bool {
        matches!(self, Self::HierarchyCreation { .. })
    }
}
