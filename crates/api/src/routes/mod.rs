pub mod admin;
pub mod auth;
pub mod badges;
pub mod behaviors;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout current session
/// /auth/logout-all                     logout every session
///
/// /users/me                            profile (GET)
/// /users/me/password                   change password (PUT)
/// /users/me/achievements               achievement progress (GET)
/// /users/me/points                     reward-point total (GET)
///
/// /badges                              active badge definitions (GET)
/// /badges/{id}                         one badge (GET)
///
/// /behaviors                           record (POST), list own (GET)
///
/// /admin/badges                        list all, create (admin only)
/// /admin/badges/{id}                   update, delete
/// /admin/users/{id}/force-logout       revoke all sessions (POST)
/// /admin/users/{id}/reevaluate         queue re-evaluation (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/badges", badges::router())
        .nest("/behaviors", behaviors::router())
        .nest("/admin", admin::router())
}
