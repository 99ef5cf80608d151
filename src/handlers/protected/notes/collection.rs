use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::api::format::{format_notes, NotePage, NoteView, Pagination};
use crate::config::NotesConfig;
use crate::database::models::NewNote;
use crate::database::{NoteListQuery, NoteScope, NoteSort};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedJson};
use crate::state::AppState;
use crate::validation::{CreateNoteRequest, RequestSchema};

/// Query string of GET /api/notes; unparseable numbers fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub scope: Option<String>,
}

impl ListQuery {
    pub fn into_note_query(self, viewer: i64, notes: &NotesConfig) -> NoteListQuery {
        let page = parse_number(self.page.as_deref()).filter(|p| *p >= 1).unwrap_or(1);
        let limit = parse_number(self.limit.as_deref())
            .filter(|l| *l >= 1)
            .unwrap_or(notes.default_limit)
            .min(notes.max_limit);

        NoteListQuery {
            viewer,
            scope: NoteScope::parse(self.scope.as_deref()),
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            sort: NoteSort::parse(self.sort.as_deref()),
            page,
            limit,
        }
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// GET /api/notes - Page through the notes visible to the caller
///
/// Query: `page`, `limit`, `search`, `sort` (newest|oldest|title_asc|title_desc),
/// `scope` (visible|mine|shared).
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "notes": [ { "id": 1, "title": "...", "authorName": "Unknown", ... } ],
///     "pagination": { "total": 7, "page": 1, "limit": 3, "pages": 3 }
///   }
/// }
/// ```
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<NotePage> {
    let query = query.into_note_query(auth.id, &state.config.notes);
    let (notes, total) = state.store.notes.list(&query).await?;

    Ok(ApiResponse::success(NotePage {
        notes: format_notes(notes),
        pagination: Pagination::new(total, query.page, query.limit),
    }))
}

/// POST /api/notes - Create a note owned by the caller
///
/// Expected Input:
/// ```json
/// { "title": "Groceries", "content": "Milk, eggs and bread", "authorName": "Jane", "isPublic": false }
/// ```
/// `authorName` defaults to "Unknown" and `isPublic` to true.
pub async fn post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateNoteRequest>,
) -> ApiResult<NoteView> {
    let CreateNoteRequest {
        title: Some(title),
        content: Some(content),
        author_name,
        is_public,
    } = body
    else {
        return Err(ApiError::validation_error(CreateNoteRequest::failure_message(), None));
    };

    let note = state
        .store
        .notes
        .create(NewNote {
            title,
            content,
            author_name: author_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| state.config.notes.default_author.clone()),
            is_public: is_public.unwrap_or(true),
            user_id: auth.id,
        })
        .await?;

    tracing::info!("User {} created note {}", auth.id, note.id);
    Ok(ApiResponse::created(note.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn notes_config() -> NotesConfig {
        AppConfig::development().notes
    }

    #[test]
    fn defaults_apply() {
        let q = ListQuery::default().into_note_query(5, &notes_config());
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 3);
        assert_eq!(q.sort, NoteSort::Newest);
        assert_eq!(q.scope, NoteScope::Visible);
        assert_eq!(q.viewer, 5);
    }

    #[test]
    fn bad_numbers_fall_back_and_limit_is_capped() {
        let q = ListQuery {
            page: Some("-2".into()),
            limit: Some("5000".into()),
            search: Some("  ".into()),
            ..Default::default()
        }
        .into_note_query(1, &notes_config());
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 100);
        assert_eq!(q.search, None);

        let q = ListQuery {
            limit: Some("abc".into()),
            ..Default::default()
        }
        .into_note_query(1, &notes_config());
        assert_eq!(q.limit, 3);
    }
}
