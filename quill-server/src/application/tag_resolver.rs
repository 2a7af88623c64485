use tracing::debug;

use crate::data::tag_repository::TagRepository;
use crate::domain::error::DomainError;
use crate::domain::tag::{NewTag, ResolvedTags, parse_tag_names};

/// Turns raw comma-separated tag input into stored tags plus not-yet-stored
/// ones. Nothing is written here; the post write persists the new tags.
pub(crate) struct TagResolver<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagResolver<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn resolve(&self, raw: Option<&str>) -> Result<ResolvedTags, DomainError> {
        let requested = parse_tag_names(raw);
        if requested.is_empty() {
            return Ok(ResolvedTags::default());
        }

        let mut existing = self.repo.find_by_names(&requested).await?;
        // the lookup may be case-insensitive or return extras; keep exact matches once
        existing.retain(|tag| requested.contains(&tag.name));
        existing.sort_by(|a, b| a.name.cmp(&b.name));
        existing.dedup_by(|a, b| a.name == b.name);

        let new: Vec<NewTag> = requested
            .iter()
            .filter(|name| !existing.iter().any(|tag| &tag.name == *name))
            .map(|name| NewTag { name: name.clone() })
            .collect();

        debug!(
            requested = requested.len(),
            existing = existing.len(),
            new = new.len(),
            "tags resolved"
        );

        Ok(ResolvedTags { existing, new })
    }
}
