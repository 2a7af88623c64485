use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::tag::{Tag, TagSummary};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagSummaryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) post_count: i64,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

impl From<TagSummary> for TagSummaryDto {
    fn from(summary: TagSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            post_count: summary.post_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses(
        (status = 200, description = "Tags with post counts", body = [TagSummaryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_tags(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<TagSummaryDto>>)> {
    let tags = state.blog_service.list_tags().await?;
    Ok((
        StatusCode::OK,
        Json(tags.into_iter().map(TagSummaryDto::from).collect()),
    ))
}
