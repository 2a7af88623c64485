pub(crate) mod account_service;
pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod password_reset_service;
pub(crate) mod reset_token_service;
pub(crate) mod tag_resolver;
