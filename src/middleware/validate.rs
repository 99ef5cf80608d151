use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};

use crate::error::ApiError;
use crate::validation::{flatten_errors, RequestSchema, GENERAL_KEY};

/// JSON body that has been parsed and passed its validation rules
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| match rejection {
            // Well-formed JSON of the wrong shape is reported like any other rule failure
            JsonRejection::JsonDataError(err) => {
                ApiError::field_error(T::failure_message(), GENERAL_KEY, err.body_text())
            }
            other => ApiError::from(other),
        })?;

        value
            .validate()
            .map_err(|errors| ApiError::validation_error(T::failure_message(), Some(flatten_errors(&errors))))?;

        Ok(Self(value))
    }
}

/// `:id` path segment of a note route, checked to be a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        positive_param(parts, state, "id")
            .await
            .map(NoteId)
            .ok_or_else(|| ApiError::field_error("Invalid note ID", "id", "Note ID must be a positive integer"))
    }
}

/// `:user_id` path segment of the unshare route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedUserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharedUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        positive_param(parts, state, "user_id")
            .await
            .map(SharedUserId)
            .ok_or_else(|| ApiError::field_error("Invalid user ID", "userId", "User ID must be a positive integer"))
    }
}

async fn positive_param<S: Send + Sync>(parts: &mut Parts, state: &S, name: &str) -> Option<i64> {
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await.ok()?;
    params.get(name).and_then(|raw| parse_positive_id(raw))
}

pub fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
