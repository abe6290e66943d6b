//! Achievement engine: event-driven badge evaluation.
//!
//! The engine never accumulates deltas. Every evaluation recomputes the
//! subject's metrics from behavior aggregates and pushes the result
//! through monotone/at-most-once writes, so duplicate or reordered event
//! delivery cannot corrupt progress or double-grant a badge.

pub mod evaluator;
pub mod listener;

pub use evaluator::{Evaluation, Evaluator};
pub use listener::spawn_engine_listener;
