use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) name: String,
    pub(crate) comment: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) name: String,
    pub(crate) comment: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            comment: normalize_comment(&self.comment)?,
        })
    }
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        post_id: i64,
        name: impl Into<String>,
        comment: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        if post_id <= 0 {
            return Err(DomainError::Validation {
                field: "post_id",
                message: "must be > 0",
            });
        }

        Ok(Self {
            id,
            post_id,
            name: normalize_name(&name.into())?,
            comment: normalize_comment(&comment.into())?,
            created_at,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..100 chars",
        });
    }
    Ok(name.to_string())
}

fn normalize_comment(comment: &str) -> Result<String, DomainError> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(DomainError::Validation {
            field: "comment",
            message: "must not be empty",
        });
    }
    Ok(comment.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Comment, CreateCommentRequest, DomainError};

    #[test]
    fn create_comment_request_trims_fields() {
        let req = CreateCommentRequest {
            name: "  Reader ".to_string(),
            comment: " nice post ".to_string(),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.name, "Reader");
        assert_eq!(validated.comment, "nice post");
    }

    #[test]
    fn create_comment_request_rejects_empty_comment() {
        let req = CreateCommentRequest {
            name: "Reader".to_string(),
            comment: "   ".to_string(),
        };

        match req.validate() {
            Err(DomainError::Validation { field, .. }) => assert_eq!(field, "comment"),
            other => panic!("expected comment validation error, got {other:?}"),
        }
    }

    #[test]
    fn comment_new_rejects_non_positive_post_id() {
        assert!(Comment::new(1, 0, "Reader", "text", Utc::now()).is_err());
    }
}
