#![forbid(unsafe_code)]

//! Shared primitives for the tiledock workbench: pixel geometry and the
//! typed, suppressible event bus.

pub mod event;
pub mod geometry;

pub use event::{BusEvent, EventBus, ListenerId};
pub use geometry::{Axis, Bounds};
