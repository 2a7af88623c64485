pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod post;
pub(crate) mod tag;
pub(crate) mod user;
