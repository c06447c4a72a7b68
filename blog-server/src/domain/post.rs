use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CategoryRef, LocationRef};
use super::error::DomainError;

pub(crate) const TITLE_MAX_CHARS: usize = 256;

/// A post together with the data every view shows next to it: author name,
/// category, location and the number of comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) location: Option<LocationRef>,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) comment_count: i64,
}

/// Submitted post form, shared by create and edit.
///
/// `pub_date` and `is_published` are optional: on create they default to
/// "now" and `true`, on edit to the stored values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostForm {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

impl PostForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(category_id) = self.category_id {
            validate_positive_i64("category_id", category_id)?;
        }
        if let Some(location_id) = self.location_id {
            validate_positive_i64("location_id", location_id)?;
        }

        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
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
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..256 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::{DomainError, PostForm};

    fn form(title: &str, text: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            text: text.to_string(),
            pub_date: None,
            is_published: None,
            category_id: None,
            location_id: None,
        }
    }

    #[test]
    fn validate_rejects_empty_title() {
        let err = form("   ", "valid text")
            .validate()
            .expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn validate_rejects_too_long_title() {
        let err = form(&"x".repeat(257), "valid text")
            .validate()
            .expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn validate_rejects_empty_text() {
        let err = form("valid title", " \n ")
            .validate()
            .expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn validate_rejects_non_positive_category() {
        let mut input = form("title", "text");
        input.category_id = Some(0);

        let err = input.validate().expect_err("category_id must be rejected");
        assert_validation_field(err, "category_id");
    }

    #[test]
    fn validate_normalizes_and_keeps_optional_fields() {
        let mut input = form("  title  ", "  text  ");
        input.is_published = Some(false);
        input.location_id = Some(3);

        let validated = input.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "text");
        assert_eq!(validated.is_published, Some(false));
        assert_eq!(validated.location_id, Some(3));
        assert_eq!(validated.category_id, None);
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
