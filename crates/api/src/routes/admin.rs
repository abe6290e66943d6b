//! Route definitions for the admin surface.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler enforces the admin guard.
///
/// ```text
/// GET    /badges                      -> all badges including inactive
/// POST   /badges                      -> create badge
/// PUT    /badges/{id}                 -> update badge (kind immutable)
/// DELETE /badges/{id}                 -> delete (refused once held)
/// POST   /users/{id}/force-logout     -> revoke all sessions
/// POST   /users/{id}/reevaluate       -> queue achievement re-evaluation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/badges", get(admin::list_badges).post(admin::create_badge))
        .route(
            "/badges/{id}",
            put(admin::update_badge).delete(admin::delete_badge),
        )
        .route("/users/{id}/force-logout", post(admin::force_logout))
        .route("/users/{id}/reevaluate", post(admin::reevaluate))
}
