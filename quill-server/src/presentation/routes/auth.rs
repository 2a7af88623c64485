use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{
    confirm_password_reset, login, register, request_password_reset,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/password-reset/request", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}
