//! Route definitions for the `/behaviors` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::behaviors;
use crate::state::AppState;

/// Routes mounted at `/behaviors`.
///
/// ```text
/// POST /  -> record a behavior (triggers achievement evaluation)
/// GET  /  -> list own records
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(behaviors::create).get(behaviors::list))
}
