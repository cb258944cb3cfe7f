//! Scene views: named, described, screenshot-tagged captures of a scene's
//! state, organized in a reorderable hierarchy.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`hierarchy`] | `HierarchyManager`: proxies, top-level node, grouping, sibling moves |
//! | [`controller`] | `SceneViewsController`: scene-view API and notification handling |
//! | [`session`] | `SceneViewSession`: per-document active hierarchy and last addition |
//! | [`config`] | `SceneViewsConfig`: reserved node names |
//! | [`error`] | `SceneViewError` |
//!
//! # Quick start
//!
//! ```rust
//! use vantage_engine::scene::{MemoryScene, Screenshot};
//! use vantage_views::SceneViewsController;
//!
//! let mut views = SceneViewsController::with_scene(MemoryScene::new());
//! let shot = Screenshot::new(64, 48);
//!
//! let first = views.create("Overview", "whole model", 0, Some(&shot)).unwrap();
//! let second = views.create("", "close-up", 0, Some(&shot)).unwrap();
//! assert_eq!(views.name(&second).unwrap(), "SceneView");
//!
//! assert_eq!(views.move_up(second.as_str()), second.as_str());
//! views.restore(&first).unwrap();
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod hierarchy;
pub mod observer;
pub mod session;

pub use config::SceneViewsConfig;
pub use controller::SceneViewsController;
pub use error::{Result, SceneViewError};
pub use hierarchy::{Direction, HierarchyManager};
pub use observer::TreeViewObserver;
pub use session::SceneViewSession;
