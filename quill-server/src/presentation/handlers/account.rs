use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::UpdateAccountRequest;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::auth::UserDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateAccountDto {
    #[validate(length(min = 2, max = 20))]
    pub(crate) username: String,
    #[validate(email, length(max = 120))]
    pub(crate) email: String,
}

#[utoipa::path(
    get,
    path = "/api/account",
    tag = "account",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_account(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.account_service.current_user(auth.user_id).await?;
    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/account",
    tag = "account",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateAccountDto,
    responses(
        (status = 200, description = "Account updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_account(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<UpdateAccountDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let req = UpdateAccountRequest {
        username: dto.username,
        email: dto.email,
    };
    let user = state
        .account_service
        .update_account(auth.user_id, req)
        .await?;

    info!(
        user_id = user.id,
        previous_username = %auth.username,
        username = %user.username,
        "account updated"
    );
    Ok((StatusCode::OK, Json(UserDto::from(user))))
}
