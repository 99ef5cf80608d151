use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{NewNote, NewUser, Note, NoteChanges, NoteShare, RefreshToken, SharedUser, User};
use super::query::NoteListQuery;
use super::repository::{HealthCheck, NoteRepository, TokenRepository, UserRepository};

#[derive(Default)]
struct Tables {
    notes: BTreeMap<i64, Note>,
    users: BTreeMap<i64, User>,
    shares: BTreeMap<(i64, i64), NoteShare>,
    tokens: HashMap<String, RefreshToken>,
    next_note_id: i64,
    next_user_id: i64,
}

impl Tables {
    fn is_shared(&self, note_id: i64, user_id: i64) -> bool {
        self.shares.contains_key(&(note_id, user_id))
    }
}

/// Process-local store with the same error semantics as Postgres
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn list(&self, query: &NoteListQuery) -> Result<(Vec<Note>, i64), DatabaseError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Note> = tables
            .notes
            .values()
            .filter(|note| query.matches(note, tables.is_shared(note.id, query.viewer)))
            .collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset().max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn find(&self, id: i64) -> Result<Option<Note>, DatabaseError> {
        Ok(self.tables.read().await.notes.get(&id).cloned())
    }

    async fn create(&self, note: NewNote) -> Result<Note, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&note.user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("user {} does not exist", note.user_id)));
        }

        tables.next_note_id += 1;
        let now = Utc::now();
        let created = Note {
            id: tables.next_note_id,
            title: note.title,
            content: note.content,
            author_name: note.author_name,
            is_public: note.is_public,
            user_id: note.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: NoteChanges) -> Result<Note, DatabaseError> {
        let mut tables = self.tables.write().await;
        let note = tables
            .notes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Note {} not found", id)))?;
        changes.apply(note, Utc::now());
        Ok(note.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.notes.remove(&id).is_none() {
            return Err(DatabaseError::NotFound(format!("Note {} not found", id)));
        }
        tables.shares.retain(|(note_id, _), _| *note_id != id);
        Ok(())
    }

    async fn is_shared_with(&self, note_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.is_shared(note_id, user_id))
    }

    async fn share(&self, note_id: i64, user_id: i64) -> Result<NoteShare, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.notes.contains_key(&note_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("note {} does not exist", note_id)));
        }
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("user {} does not exist", user_id)));
        }
        if tables.is_shared(note_id, user_id) {
            return Err(DatabaseError::UniqueViolation(format!(
                "note {} already shared with user {}",
                note_id, user_id
            )));
        }

        let share = NoteShare {
            note_id,
            user_id,
            created_at: Utc::now(),
        };
        tables.shares.insert((note_id, user_id), share.clone());
        Ok(share)
    }

    async fn unshare(&self, note_id: i64, user_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .shares
            .remove(&(note_id, user_id))
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("Note {} is not shared with user {}", note_id, user_id)))
    }

    async fn shares(&self, note_id: i64) -> Result<Vec<SharedUser>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut users: Vec<SharedUser> = tables
            .shares
            .values()
            .filter(|share| share.note_id == note_id)
            .filter_map(|share| {
                tables.users.get(&share.user_id).map(|user| SharedUser {
                    user_id: user.id,
                    email: user.email.clone(),
                    name: user.name.clone(),
                    shared_at: share.created_at,
                })
            })
            .collect();
        users.sort_by(|a, b| a.shared_at.cmp(&b.shared_at).then(a.user_id.cmp(&b.user_id)));
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation(format!("email {} already registered", user.email)));
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            email: user.email,
            name: user.name,
            age: user.age,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn store(&self, token: RefreshToken) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&token.user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("user {} does not exist", token.user_id)));
        }
        if tables.tokens.contains_key(&token.token) {
            return Err(DatabaseError::UniqueViolation("refresh token already exists".to_string()));
        }
        tables.tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        Ok(self.tables.read().await.tokens.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.tokens.remove(token).is_some())
    }

    async fn revoke_all(&self, user_id: i64) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tables.tokens.len()) as u64)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
