use std::sync::Arc;

use crate::application::account_service::AccountService;
use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::password_reset_service::PasswordResetService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::tag_repository::PostgresTagRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type PgAuthService = AuthService<PostgresUserRepository>;
pub(crate) type PgAccountService = AccountService<PostgresUserRepository>;
pub(crate) type PgPasswordResetService = PasswordResetService<PostgresUserRepository>;
pub(crate) type PgBlogService =
    BlogService<PostgresPostRepository, PostgresTagRepository, PostgresCommentRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<PgAuthService>,
    pub(crate) account_service: Arc<PgAccountService>,
    pub(crate) password_reset_service: Arc<PgPasswordResetService>,
    pub(crate) blog_service: Arc<PgBlogService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<PgAuthService>,
        account_service: Arc<PgAccountService>,
        password_reset_service: Arc<PgPasswordResetService>,
        blog_service: Arc<PgBlogService>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service,
            account_service,
            password_reset_service,
            blog_service,
            jwt,
        }
    }
}
