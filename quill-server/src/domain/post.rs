use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::tag::Tag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) chinese_content: String,
    pub(crate) author_id: i64,
    pub(crate) tags: Vec<Tag>,
    pub(crate) total_comments: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) chinese_content: String,
    pub(crate) tags: Option<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_body("content", &self.content)?,
            chinese_content: normalize_body("chinese_content", &self.chinese_content)?,
            tags: self.tags,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) chinese_content: String,
    pub(crate) tags: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_body("content", &self.content)?,
            chinese_content: normalize_body("chinese_content", &self.chinese_content)?,
            tags: self.tags,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PostSearch {
    pub(crate) query: Option<String>,
    pub(crate) tag: Option<String>,
}

impl PostSearch {
    pub(crate) fn new(query: Option<String>, tag: Option<String>) -> Self {
        Self {
            query: non_blank(query),
            tag: non_blank(tag),
        }
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        chinese_content: impl Into<String>,
        author_id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let title = normalize_title(&title.into())?;
        let content = normalize_body("content", &content.into())?;
        let chinese_content = normalize_body("chinese_content", &chinese_content.into())?;

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            title,
            content,
            chinese_content,
            author_id,
            tags: Vec::new(),
            total_comments: 0,
            created_at,
            updated_at,
        })
    }

    pub(crate) fn with_tags(mut self, mut tags: Vec<Tag>) -> Self {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        self.tags = tags;
        self
    }

    pub(crate) fn with_total_comments(mut self, total_comments: i64) -> Self {
        self.total_comments = total_comments.max(0);
        self
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 100 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..100 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_body(field: &'static str, body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(body.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{CreatePostRequest, DomainError, Post, PostSearch, UpdatePostRequest};
    use crate::domain::tag::Tag;

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            content: "valid content".to_string(),
            chinese_content: "内容".to_string(),
            tags: None,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_rejects_long_title() {
        let req = CreatePostRequest {
            title: "t".repeat(101),
            content: "valid content".to_string(),
            chinese_content: "内容".to_string(),
            tags: None,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn update_post_request_validate_rejects_empty_chinese_content() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            content: "content".to_string(),
            chinese_content: "   ".to_string(),
            tags: Some("rust".to_string()),
        };

        let err = req.validate().expect_err("chinese_content must be rejected");
        assert_validation_field(err, "chinese_content");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
            chinese_content: "  内容  ".to_string(),
            tags: Some(" a, b ".to_string()),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.content, "content");
        assert_eq!(validated.chinese_content, "内容");
        assert_eq!(validated.tags.as_deref(), Some(" a, b "));
    }

    #[test]
    fn post_new_normalizes_and_builds_post() {
        let created_at = Utc::now();
        let updated_at = created_at + Duration::seconds(1);

        let post = Post::new(1, "  Title  ", "  Content  ", " 内容 ", 10, created_at, updated_at)
            .expect("post should be created");

        assert_eq!(post.id, 1);
        assert_eq!(post.author_id, 10);
        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "Content");
        assert_eq!(post.chinese_content, "内容");
        assert!(post.tags.is_empty());
        assert_eq!(post.total_comments, 0);
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let now = Utc::now();
        let err = Post::new(1, "Title", "Content", "内容", 0, now, now)
            .expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn post_new_rejects_updated_before_created() {
        let updated_at = Utc::now();
        let created_at = updated_at + Duration::seconds(1);

        let err = Post::new(1, "Title", "Content", "内容", 10, created_at, updated_at)
            .expect_err("updated_at < created_at must fail");
        assert_validation_field(err, "updated_at");
    }

    #[test]
    fn with_tags_sorts_by_name() {
        let now = Utc::now();
        let post = Post::new(1, "Title", "Content", "内容", 10, now, now)
            .expect("post should be created")
            .with_tags(vec![
                Tag::new(2, "web").expect("valid tag"),
                Tag::new(1, "rust").expect("valid tag"),
            ])
            .with_total_comments(-3);

        let names: Vec<&str> = post.tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "web"]);
        assert_eq!(post.total_comments, 0);
    }

    #[test]
    fn post_search_drops_blank_filters() {
        let search = PostSearch::new(Some("  ".to_string()), Some(" rust ".to_string()));
        assert!(search.query.is_none());
        assert_eq!(search.tag.as_deref(), Some("rust"));
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
