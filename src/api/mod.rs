// API module - HTTP endpoints

pub mod auth;
pub mod families;
pub mod health;
pub mod middleware;
pub mod ministries;
pub mod ministry_admin;
pub mod portal;
pub mod roles;
pub mod stats;
pub mod users;
pub mod zones;

use axum::{middleware::from_fn_with_state, Router};

use middleware::{
    auth::{require_app_admin, require_member},
    session::AppState,
};

/// Assembles every route. The session layer is applied by the caller.
///
/// Admin routes sit behind the ADMIN/PASTOR gate, portal routes behind the
/// signed-in check, and auth plus health stay public.
pub fn router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(users::router())
        .merge(roles::router())
        .merge(zones::router())
        .merge(families::router())
        .merge(ministries::router())
        .merge(ministry_admin::router())
        .merge(stats::router())
        .route_layer(from_fn_with_state(state.clone(), require_app_admin));

    let portal = portal::router().route_layer(from_fn_with_state(state, require_member));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(admin)
        .merge(portal)
}
