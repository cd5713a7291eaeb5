#![forbid(unsafe_code)]

//! Perspective persistence for the tiledock workbench.
//!
//! A *perspective* is a named, persisted snapshot of the panel
//! arrangement. Every perspective id maps to a **base state** (the last
//! explicitly saved form) and at most one **modified state** (an unsaved
//! overlay written as the user rearranges panels). [`PerspectiveStore`] is
//! the asynchronous contract any backend implements;
//! [`MemoryPerspectiveStore`] is the in-process reference backend.

pub mod memory;
pub mod perspective;
pub mod store;

pub use memory::MemoryPerspectiveStore;
pub use perspective::{PERSPECTIVE_SCHEMA_VERSION, Perspective, WorkbenchSnapshot};
pub use store::{
    MovePosition, PerspectiveStore, StoreError, StoreFuture, StoreListener, SubscriptionId,
};
