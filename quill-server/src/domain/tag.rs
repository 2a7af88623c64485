use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Tag {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl Tag {
    pub(crate) fn new(id: i64, name: impl Into<String>) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "name",
                message: "must not be empty",
            });
        }
        Ok(Self { id, name })
    }
}

/// Tag that is not stored yet; it gets an id when the owning post is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewTag {
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagSummary {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) post_count: i64,
}

/// Result of resolving raw tag input: tags already stored plus names seen for
/// the first time. Names never overlap between the two parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedTags {
    pub(crate) existing: Vec<Tag>,
    pub(crate) new: Vec<NewTag>,
}

impl ResolvedTags {
    pub(crate) fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.new.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.existing.len() + self.new.len()
    }

    pub(crate) fn names(&self) -> BTreeSet<&str> {
        self.existing
            .iter()
            .map(|tag| tag.name.as_str())
            .chain(self.new.iter().map(|tag| tag.name.as_str()))
            .collect()
    }
}

/// Splits comma-separated tag input into a set of trimmed, non-empty names.
pub(crate) fn parse_tag_names(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{NewTag, ResolvedTags, Tag, parse_tag_names};

    #[test]
    fn parse_tag_names_handles_absent_and_blank_input() {
        assert!(parse_tag_names(None).is_empty());
        assert!(parse_tag_names(Some("")).is_empty());
        assert!(parse_tag_names(Some(" , ,, ")).is_empty());
    }

    #[test]
    fn parse_tag_names_trims_and_deduplicates() {
        let names = parse_tag_names(Some(" rust , web,rust ,  "));
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["rust", "web"]);
    }

    #[test]
    fn parse_tag_names_keeps_inner_whitespace_and_case() {
        let names = parse_tag_names(Some("Machine Learning, machine learning"));
        assert_eq!(names.len(), 2);
        assert!(names.contains("Machine Learning"));
    }

    #[test]
    fn tag_new_rejects_non_positive_id() {
        assert!(Tag::new(0, "rust").is_err());
        assert!(Tag::new(1, "  ").is_err());
        assert!(Tag::new(1, "rust").is_ok());
    }

    #[test]
    fn resolved_tags_reports_names_from_both_parts() {
        let resolved = ResolvedTags {
            existing: vec![Tag::new(3, "x").expect("valid tag")],
            new: vec![NewTag {
                name: "z".to_string(),
            }],
        };

        assert_eq!(resolved.len(), 2);
        assert!(!resolved.is_empty());
        assert_eq!(resolved.names().into_iter().collect::<Vec<_>>(), vec!["x", "z"]);
    }
}
