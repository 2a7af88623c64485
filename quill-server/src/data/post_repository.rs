use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSearch};
use crate::domain::tag::ResolvedTags;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) chinese_content: String,
    pub(crate) author_id: i64,
    pub(crate) tags: ResolvedTags,
}

/// Full replacement of a post's editable fields, tag set included.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) chinese_content: String,
    pub(crate) tags: ResolvedTags,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

/// Post writes are a unit of work: the post row, any new tags and the
/// post-tag links are committed together or not at all.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn total_posts(&self, search: &PostSearch) -> Result<i64, DomainError>;
}
