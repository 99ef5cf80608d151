use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::DatabaseError;
use super::memory::MemoryStore;
use super::models::{NewNote, NewUser, Note, NoteChanges, NoteShare, RefreshToken, SharedUser, User};
use super::postgres::PgStore;
use super::query::NoteListQuery;

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// One page of matching notes plus the total number of matches
    async fn list(&self, query: &NoteListQuery) -> Result<(Vec<Note>, i64), DatabaseError>;

    async fn find(&self, id: i64) -> Result<Option<Note>, DatabaseError>;

    async fn create(&self, note: NewNote) -> Result<Note, DatabaseError>;

    /// Fails with `NotFound` when the note does not exist
    async fn update(&self, id: i64, changes: NoteChanges) -> Result<Note, DatabaseError>;

    /// Fails with `NotFound` when the note does not exist
    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;

    async fn is_shared_with(&self, note_id: i64, user_id: i64) -> Result<bool, DatabaseError>;

    /// Fails with `UniqueViolation` on a duplicate pair and
    /// `ForeignKeyViolation` when either side does not exist
    async fn share(&self, note_id: i64, user_id: i64) -> Result<NoteShare, DatabaseError>;

    /// Fails with `NotFound` when the pair does not exist
    async fn unshare(&self, note_id: i64, user_id: i64) -> Result<(), DatabaseError>;

    async fn shares(&self, note_id: i64) -> Result<Vec<SharedUser>, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn store(&self, token: RefreshToken) -> Result<(), DatabaseError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError>;

    /// Returns whether a token was removed
    async fn revoke(&self, token: &str) -> Result<bool, DatabaseError>;

    /// Returns the number of tokens removed
    async fn revoke_all(&self, user_id: i64) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Handles to every repository, backed by one storage engine
#[derive(Clone)]
pub struct Store {
    pub backend: &'static str,
    pub notes: Arc<dyn NoteRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            backend: "postgres",
            notes: store.clone(),
            users: store.clone(),
            tokens: store.clone(),
            health: store,
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            backend: "memory",
            notes: store.clone(),
            users: store.clone(),
            tokens: store.clone(),
            health: store,
        }
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.health.ping().await
    }
}
