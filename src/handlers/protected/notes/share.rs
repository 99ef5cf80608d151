use axum::{extract::State, Extension};

use super::utils::load_owned_note;
use crate::api::format::SharedUserView;
use crate::database::models::SharedUser;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::public::auth::utils::normalize_email;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, NoteId, SharedUserId, ValidatedJson};
use crate::state::AppState;
use crate::validation::{RequestSchema, ShareNoteRequest};

/// GET /api/notes/:id/shares - Users an owned note is shared with
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
) -> ApiResult<Vec<SharedUserView>> {
    load_owned_note(&state, id, &auth).await?;
    let shares = state.store.notes.shares(id).await?;
    Ok(ApiResponse::success(shares.into_iter().map(SharedUserView::from).collect()))
}

/// POST /api/notes/:id/share - Share an owned note with another user by email
///
/// Expected Input:
/// ```json
/// { "email": "friend@example.com" }
/// ```
pub async fn post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
    ValidatedJson(body): ValidatedJson<ShareNoteRequest>,
) -> ApiResult<SharedUserView> {
    let Some(email) = body.email else {
        return Err(ApiError::validation_error(ShareNoteRequest::failure_message(), None));
    };

    load_owned_note(&state, id, &auth).await?;

    let target = state
        .store
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.id == auth.id {
        return Err(ApiError::bad_request("You cannot share a note with yourself"));
    }
    if state.store.notes.is_shared_with(id, target.id).await? {
        return Err(ApiError::conflict("Note is already shared with this user"));
    }

    let share = state.store.notes.share(id, target.id).await?;

    tracing::info!("User {} shared note {} with user {}", auth.id, id, target.id);
    Ok(ApiResponse::created(
        SharedUser {
            user_id: target.id,
            email: target.email,
            name: target.name,
            shared_at: share.created_at,
        }
        .into(),
    ))
}

/// DELETE /api/notes/:id/share/:user_id - Stop sharing an owned note
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
    SharedUserId(user_id): SharedUserId,
) -> ApiResult<()> {
    load_owned_note(&state, id, &auth).await?;

    match state.store.notes.unshare(id, user_id).await {
        Ok(()) => Ok(ApiResponse::no_content()),
        Err(DatabaseError::NotFound(_)) => Err(ApiError::not_found("Note is not shared with this user")),
        Err(err) => Err(err.into()),
    }
}
