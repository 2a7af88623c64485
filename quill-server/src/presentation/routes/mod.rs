use axum::Router;

use super::AppState;

pub(crate) mod account;
pub(crate) mod auth;
pub(crate) mod posts;
pub(crate) mod tags;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/account", account::router(state.clone()))
        .nest("/api/posts", posts::router(state))
        .nest("/api/tags", tags::router())
}
