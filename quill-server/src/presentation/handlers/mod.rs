pub(crate) mod account;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod tags;
