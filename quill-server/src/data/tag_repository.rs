use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::tag::{Tag, TagSummary};

#[async_trait]
pub(crate) trait TagRepository: Send + Sync {
    /// Single bulk lookup of every stored tag whose name is in `names`.
    async fn find_by_names(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, DomainError>;
    async fn list_with_counts(&self) -> Result<Vec<TagSummary>, DomainError>;
}
