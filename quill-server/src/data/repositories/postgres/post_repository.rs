use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::tag_repository::replace_post_tags;
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSearch};
use crate::domain::tag::Tag;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_tags(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, DomainError> {
        let mut by_post: HashMap<i64, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(by_post);
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id AS tag_id, t.name
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            "#,
        )
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        for row in rows {
            let tag = Tag::new(row.tag_id, row.name)
                .map_err(|err| DomainError::Unexpected(err.to_string()))?;
            by_post.entry(row.post_id).or_default().push(tag);
        }
        Ok(by_post)
    }

    async fn attach_tags(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut tags = self.load_tags(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let post_tags = tags.remove(&row.id).unwrap_or_default();
                map_row_to_post(row).map(|post| post.with_tags(post_tags))
            })
            .collect()
    }

    async fn fetch_written_post(&self, id: i64) -> Result<Post, DomainError> {
        self.get_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} vanished after write")))
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    chinese_content: String,
    author_id: i64,
    total_comments: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    tag_id: i64,
    name: String,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let post_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, chinese_content, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.chinese_content)
        .bind(input.author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        replace_post_tags(&mut *tx, post_id, &input.tags)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;

        self.fetch_written_post(post_id).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            p.id,
            p.title,
            p.content,
            p.chinese_content,
            p.author_id,
            (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS total_comments,
            p.created_at,
            p.updated_at
            FROM posts p
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        match row {
            Some(row) => Ok(self.attach_tags(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET title = $3,
                content = $4,
                chinese_content = $5,
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.chinese_content)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        let Some(post_id) = updated else {
            return Ok(None);
        };

        replace_post_tags(&mut *tx, post_id, &patch.tags)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;

        self.fetch_written_post(post_id).await.map(Some)
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let limit = i64::from(pagination.limit);
        let offset = i64::from(pagination.offset);

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                p.id,
                p.title,
                p.content,
                p.chinese_content,
                p.author_id,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS total_comments,
                p.created_at,
                p.updated_at
            FROM posts p
            WHERE ($1::TEXT IS NULL
                   OR p.title ILIKE '%' || $1 || '%'
                   OR p.content ILIKE '%' || $1 || '%'
                   OR p.chinese_content ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL
                   OR EXISTS (
                       SELECT 1
                       FROM post_tags pt
                       JOIN tags t ON t.id = pt.tag_id
                       WHERE pt.post_id = p.id AND t.name = $2
                   ))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(search.query.as_deref().map(escape_like))
        .bind(search.tag.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.attach_tags(rows).await
    }

    async fn total_posts(&self, search: &PostSearch) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts p
            WHERE ($1::TEXT IS NULL
                   OR p.title ILIKE '%' || $1 || '%'
                   OR p.content ILIKE '%' || $1 || '%'
                   OR p.chinese_content ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL
                   OR EXISTS (
                       SELECT 1
                       FROM post_tags pt
                       JOIN tags t ON t.id = pt.tag_id
                       WHERE pt.post_id = p.id AND t.name = $2
                   ))
            "#,
        )
        .bind(search.query.as_deref().map(escape_like))
        .bind(search.tag.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(count)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.title,
        row.content,
        row.chinese_content,
        row.author_id,
        row.created_at,
        row.updated_at,
    )
    .map(|post| post.with_total_comments(row.total_comments))
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
