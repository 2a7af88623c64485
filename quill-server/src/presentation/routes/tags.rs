use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::tags::list_tags;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tags))
}
