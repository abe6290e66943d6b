//! Route definitions for the authenticated subject's own resources.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /me                      -> profile
/// PUT /me/password             -> change password (revokes all sessions)
/// GET /me/achievements         -> achievement progress
/// GET /me/achievements/recent  -> latest granted badges
/// GET /me/points               -> reward-point total
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/me/password", put(users::change_password))
        .route("/me/achievements", get(users::my_achievements))
        .route("/me/achievements/recent", get(users::recent_achievements))
        .route("/me/points", get(users::my_points))
}
