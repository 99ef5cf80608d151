use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the note_shares join table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NoteShare {
    pub note_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A user a note is shared with, as listed to the note owner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedUser {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub shared_at: DateTime<Utc>,
}
