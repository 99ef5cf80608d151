use crate::database::models::Note;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn load_note(state: &AppState, id: i64) -> Result<Note, ApiError> {
    state
        .store
        .notes
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))
}

/// Load a note the caller is about to change; 404 before 403
pub async fn load_owned_note(state: &AppState, id: i64, auth: &AuthUser) -> Result<Note, ApiError> {
    let note = load_note(state, id).await?;
    if !note.is_owned_by(auth.id) {
        tracing::debug!("User {} denied access to note {}", auth.id, id);
        return Err(ApiError::forbidden("You do not have permission to modify this note"));
    }
    Ok(note)
}
