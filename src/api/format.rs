use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Note, SharedUser, User};

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A note as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_name: String,
    pub is_public: bool,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            author_name: note.author_name,
            is_public: note.is_public,
            user_id: note.user_id,
            created_at: iso(note.created_at),
            updated_at: iso(note.updated_at),
        }
    }
}

pub fn format_notes(notes: Vec<Note>) -> Vec<NoteView> {
    notes.into_iter().map(NoteView::from).collect()
}

/// Public profile of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub created_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            age: user.age,
            created_at: iso(user.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedUserView {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub shared_at: String,
}

impl From<SharedUser> for SharedUserView {
    fn from(shared: SharedUser) -> Self {
        Self {
            user_id: shared.user_id,
            email: shared.email,
            name: shared.name,
            shared_at: iso(shared.shared_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotePage {
    pub notes: Vec<NoteView>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Pagination::new(0, 1, 3).pages, 0);
        assert_eq!(Pagination::new(3, 1, 3).pages, 1);
        assert_eq!(Pagination::new(7, 1, 3).pages, 3);
    }

    #[test]
    fn note_view_is_camel_case() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let view = NoteView::from(Note {
            id: 3,
            title: "Title".into(),
            content: "Some content".into(),
            author_name: "Unknown".into(),
            is_public: true,
            user_id: 1,
            created_at: at,
            updated_at: at,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["authorName"], "Unknown");
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["createdAt"], "2024-05-01T08:30:00.000Z");
    }

    #[test]
    fn user_view_hides_password() {
        let view = UserView::from(User {
            id: 1,
            email: "a@example.com".into(),
            name: "A".into(),
            age: 20,
            password_hash: "secret".into(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
