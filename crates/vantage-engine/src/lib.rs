//! Vantage engine crate.
//!
//! This crate owns the scene document model that the scene-views layer
//! works against: node records, the store contract, and notifications.

pub mod logging;
pub mod scene;
