use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{trimmed_opt, RequestSchema};
use crate::database::models::NoteChanges;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        required(message = "Title is required"),
        length(min = 3, max = 100, message = "Title must be between 3 and 100 characters")
    )]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        required(message = "Content is required"),
        length(min = 10, max = 1000, message = "Content must be between 10 and 1000 characters")
    )]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,

    #[serde(default)]
    pub is_public: Option<bool>,
}

impl RequestSchema for CreateNoteRequest {
    const OPERATION: &'static str = "Create Note";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "at_least_one_field", skip_on_field_errors = false))]
pub struct UpdateNoteRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 10, max = 1000, message = "Content must be between 10 and 1000 characters"))]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,

    #[serde(default)]
    pub is_public: Option<bool>,
}

impl RequestSchema for UpdateNoteRequest {
    const OPERATION: &'static str = "Update Note";
}

fn at_least_one_field(request: &UpdateNoteRequest) -> Result<(), ValidationError> {
    if request.title.is_none()
        && request.content.is_none()
        && request.author_name.is_none()
        && request.is_public.is_none()
    {
        let mut error = ValidationError::new("empty_update");
        error.message = Some(Cow::Borrowed("At least one field must be provided for update"));
        return Err(error);
    }
    Ok(())
}

impl UpdateNoteRequest {
    /// Changes to apply; a blank author name resets to `default_author`
    pub fn into_changes(self, default_author: &str) -> NoteChanges {
        NoteChanges {
            title: self.title,
            content: self.content,
            author_name: self
                .author_name
                .map(|name| if name.is_empty() { default_author.to_string() } else { name }),
            is_public: self.is_public,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareNoteRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(required(message = "Email is required"), email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl RequestSchema for ShareNoteRequest {
    const OPERATION: &'static str = "Share Note";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::flatten_errors;

    fn create(json: &str) -> CreateNoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn valid_create_passes() {
        let req = create(r#"{"title": "  Groceries ", "content": "Milk, eggs and bread", "isPublic": false}"#);
        assert!(req.validate().is_ok());
        assert_eq!(req.title.as_deref(), Some("Groceries"));
        assert_eq!(req.is_public, Some(false));
    }

    #[test]
    fn short_title_and_missing_content() {
        let errors = create(r#"{"title": "ab"}"#).validate().unwrap_err();
        let flat = flatten_errors(&errors);
        assert_eq!(flat["title"], vec!["Title must be between 3 and 100 characters"]);
        assert_eq!(flat["content"], vec!["Content is required"]);
    }

    #[test]
    fn long_author_name_uses_camel_case_key() {
        let json = format!(
            r#"{{"title": "Title", "content": "Long enough content", "authorName": "{}"}}"#,
            "a".repeat(101)
        );
        let flat = flatten_errors(&create(&json).validate().unwrap_err());
        assert!(flat.contains_key("authorName"));
    }

    #[test]
    fn empty_update_reports_general() {
        let req: UpdateNoteRequest = serde_json::from_str("{}").unwrap();
        let flat = flatten_errors(&req.validate().unwrap_err());
        assert_eq!(flat["general"], vec!["At least one field must be provided for update"]);
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn partial_update_is_checked() {
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"content": "short"}"#).unwrap();
        let flat = flatten_errors(&req.validate().unwrap_err());
        assert!(flat.contains_key("content"));

        let req: UpdateNoteRequest = serde_json::from_str(r#"{"isPublic": true}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_author_resets_to_default() {
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"authorName": "   "}"#).unwrap();
        let changes = req.into_changes("Unknown");
        assert_eq!(changes.author_name.as_deref(), Some("Unknown"));
        assert!(changes.title.is_none());
    }

    #[test]
    fn share_requires_email() {
        let req: ShareNoteRequest = serde_json::from_str(r#"{"email": "not-an-email"}"#).unwrap();
        let flat = flatten_errors(&req.validate().unwrap_err());
        assert_eq!(flat["email"], vec!["Invalid email format"]);
    }
}
