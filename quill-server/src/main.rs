use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::account_service::AccountService;
use application::auth_service::AuthService;
use application::blog_service::BlogService;
use application::password_reset_service::PasswordResetService;
use application::reset_token_service::PasswordResetTokenService;
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::tag_repository::PostgresTagRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::clock::SystemClock;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::mailer::{LogMailer, MailOutbox};
use infrastructure::reset_token::ResetTokenSigner;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let state = build_state(pool, &settings);
    server::run_http(&settings, state).await
}

pub(crate) fn build_state(pool: PgPool, settings: &Settings) -> AppState {
    let users = PostgresUserRepository::new(pool.clone());
    let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);

    let reset_tokens = PasswordResetTokenService::new(
        users.clone(),
        ResetTokenSigner::new(&settings.reset_token_secret),
        Arc::new(SystemClock),
        settings.reset_token_ttl_seconds,
    );
    let password_reset_service = PasswordResetService::new(
        users.clone(),
        reset_tokens,
        MailOutbox::spawn(LogMailer::new(settings.mail_sender.clone())),
        settings.reset_url_base.clone(),
    );

    let blog_service = BlogService::new(
        PostgresPostRepository::new(pool.clone()),
        PostgresTagRepository::new(pool.clone()),
        PostgresCommentRepository::new(pool),
    );

    AppState::new(
        Arc::new(AuthService::new(users.clone(), jwt.clone())),
        Arc::new(AccountService::new(users)),
        Arc::new(password_reset_service),
        Arc::new(blog_service),
        Arc::new(jwt),
    )
}
