//! Authentication primitives.
//!
//! - [`password`] -- salted-hash credential verification (with the legacy
//!   migration path) and salt/strength helpers.
//! - [`jwt`] -- HS256 access/refresh token issuance and validation.
//! - [`session`] -- session registration and revocation built on the
//!   server-side session store.

pub mod jwt;
pub mod password;
pub mod session;
