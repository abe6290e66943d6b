//! In-process event plumbing.
//!
//! The behavior-write path publishes to the [`bus::EventBus`]; the
//! achievement engine consumes from it, keeping the engine decoupled
//! from request handling and testable in isolation.

pub mod bus;

pub use bus::{BehaviorEvent, EventBus};
