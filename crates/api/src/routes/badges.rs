//! Route definitions for the public `/badges` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::badges;
use crate::state::AppState;

/// Routes mounted at `/badges`.
///
/// ```text
/// GET /      -> active badge definitions
/// GET /{id}  -> one badge
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(badges::list))
        .route("/{id}", get(badges::get))
}
