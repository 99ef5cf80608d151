//! Request bodies and the rules they are checked against before a handler runs.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

use crate::error::FieldErrors;

pub mod auth;
pub mod note;

pub use auth::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
pub use note::{CreateNoteRequest, ShareNoteRequest, UpdateNoteRequest};

/// Key used for failures that belong to the body as a whole
pub const GENERAL_KEY: &str = "general";

/// A JSON body that is validated before it reaches a handler.
pub trait RequestSchema: DeserializeOwned + Validate {
    /// Operation name used in the failure message, e.g. "Create Note"
    const OPERATION: &'static str;

    fn failure_message() -> String {
        format!("{} validation failed", Self::OPERATION)
    }
}

/// Deserialize an optional string, trimming surrounding whitespace
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}

/// Flatten validator output into `{ field: [messages] }` with camelCase keys
pub fn flatten_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut flattened = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let key = match field {
            "__all__" => GENERAL_KEY.to_string(),
            other => camel_case(other),
        };
        let messages = field_errors.iter().map(|e| {
            e.message
                .clone()
                .unwrap_or_else(|| Cow::Owned(format!("Invalid value ({})", e.code)))
                .into_owned()
        });
        flattened.entry(key).or_default().extend(messages);
    }
    flattened
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
