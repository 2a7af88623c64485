use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::account::{get_account, update_account};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_account).put(update_account))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
