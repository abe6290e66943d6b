//! Pure domain logic shared across the workspace.
//!
//! - [`types`] -- id/timestamp aliases and the subject-kind enum.
//! - [`error`] -- the domain error taxonomy.
//! - [`badge`] -- badge condition kinds, progress math, and streak
//!   computation. No I/O lives in this crate.

pub mod badge;
pub mod error;
pub mod types;
