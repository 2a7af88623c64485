use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::data::tag_repository::TagRepository;
use crate::domain::error::DomainError;
use crate::domain::tag::{ResolvedTags, Tag, TagSummary};

#[derive(Debug, Clone)]
pub(crate) struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TagRow {
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct TagSummaryRow {
    id: i64,
    name: String,
    post_count: i64,
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_names(&self, names: &BTreeSet<String>) -> Result<Vec<Tag>, DomainError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = names.iter().cloned().collect();

        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT id, name
            FROM tags
            WHERE name = ANY($1)
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        rows.into_iter().map(map_row_to_tag).collect()
    }

    async fn list_with_counts(&self) -> Result<Vec<TagSummary>, DomainError> {
        let rows = sqlx::query_as::<_, TagSummaryRow>(
            r#"
            SELECT
                t.id,
                t.name,
                COUNT(pt.post_id) AS post_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| TagSummary {
                id: row.id,
                name: row.name,
                post_count: row.post_count,
            })
            .collect())
    }
}

/// Stores the new tags of `tags` and links every tag to `post_id`, replacing
/// previous links. Runs on the caller's transaction.
///
/// A name inserted concurrently by another request hits the unique constraint
/// and the existing row is returned instead of a duplicate.
pub(super) async fn replace_post_tags(
    conn: &mut PgConnection,
    post_id: i64,
    tags: &ResolvedTags,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    let mut tag_ids: Vec<i64> = tags.existing.iter().map(|tag| tag.id).collect();

    for new_tag in &tags.new {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(&new_tag.name)
        .fetch_one(&mut *conn)
        .await?;

        tag_ids.push(id);
    }

    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO post_tags (post_id, tag_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn map_row_to_tag(row: TagRow) -> Result<Tag, DomainError> {
    Tag::new(row.id, row.name).map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_tag_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
