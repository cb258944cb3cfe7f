//! Scene document model.
//!
//! Responsibilities:
//! - node records (scene views, hierarchy nodes, generic content)
//! - the [`SceneStore`] contract consumed by higher layers
//! - typed, queued scene notifications
//! - [`MemoryScene`], an in-memory store used by hosts and tests

mod event;
mod id;
mod memory;
mod node;
mod store;

pub use event::{EventTarget, SceneEvent, SceneNotification};
pub use id::NodeId;
pub use memory::MemoryScene;
pub use node::{
    GenericNode, HierarchyNode, Node, NodeKind, SceneSnapshot, SceneViewNode, Screenshot,
};
pub use store::{Result, SceneStore, StoreError};
