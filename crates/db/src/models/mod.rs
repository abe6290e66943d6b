//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Where needed, a `Serialize` response shape without sensitive fields

pub mod achievement;
pub mod badge;
pub mod behavior;
pub mod session;
pub mod user;
