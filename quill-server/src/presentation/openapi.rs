use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::account::UpdateAccountDto;
use crate::presentation::handlers::auth::{
    AuthResponseDto, ConfirmPasswordResetDto, LoginDto, RegisterDto, RequestPasswordResetDto,
    UserDto,
};
use crate::presentation::handlers::comments::{CommentDto, CreateCommentDto};
use crate::presentation::handlers::posts::{
    CreatePostDto, ListPostsQuery, ListPostsResponseDto, PostDto, UpdatePostDto,
};
use crate::presentation::handlers::tags::{TagDto, TagSummaryDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::request_password_reset,
        crate::presentation::handlers::auth::confirm_password_reset,
        crate::presentation::handlers::account::get_account,
        crate::presentation::handlers::account::update_account,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::tags::list_tags
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            RequestPasswordResetDto,
            ConfirmPasswordResetDto,
            AuthResponseDto,
            UserDto,
            UpdateAccountDto,
            CreatePostDto,
            UpdatePostDto,
            ListPostsQuery,
            PostDto,
            ListPostsResponseDto,
            TagDto,
            TagSummaryDto,
            CreateCommentDto,
            CommentDto
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and password reset"),
        (name = "account", description = "Current user's account"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comments on posts"),
        (name = "tags", description = "Tag listing")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
