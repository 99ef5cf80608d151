use axum::{extract::State, Extension};

use super::utils::{load_note, load_owned_note};
use crate::api::format::NoteView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, NoteId, ValidatedJson};
use crate::state::AppState;
use crate::validation::UpdateNoteRequest;

/// GET /api/notes/:id - Fetch one note
///
/// Private notes are only readable by their owner and the users they were
/// shared with; everyone else gets 403.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
) -> ApiResult<NoteView> {
    let note = load_note(&state, id).await?;

    if !note.is_owned_by(auth.id) && !note.is_public && !state.store.notes.is_shared_with(id, auth.id).await? {
        return Err(ApiError::forbidden("You do not have access to this note"));
    }

    Ok(ApiResponse::success(note.into()))
}

/// PUT|PATCH /api/notes/:id - Change the provided fields of an owned note
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
    ValidatedJson(body): ValidatedJson<UpdateNoteRequest>,
) -> ApiResult<NoteView> {
    load_owned_note(&state, id, &auth).await?;

    let changes = body.into_changes(&state.config.notes.default_author);
    let note = state.store.notes.update(id, changes).await?;

    tracing::info!("User {} updated note {}", auth.id, id);
    Ok(ApiResponse::success(note.into()))
}

/// DELETE /api/notes/:id - Remove an owned note and its shares
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    NoteId(id): NoteId,
) -> ApiResult<()> {
    load_owned_note(&state, id, &auth).await?;
    state.store.notes.delete(id).await?;

    tracing::info!("User {} deleted note {}", auth.id, id);
    Ok(ApiResponse::no_content())
}
