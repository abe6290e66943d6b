//! HTTP request handlers, grouped by resource.

pub mod admin;
pub mod auth;
pub mod badges;
pub mod behaviors;
pub mod users;
