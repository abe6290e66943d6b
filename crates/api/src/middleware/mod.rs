//! Request-scoped middleware (authentication extractors).

pub mod auth;
