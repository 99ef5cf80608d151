use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{NewNote, NewUser, Note, NoteChanges, NoteShare, RefreshToken, SharedUser, User};
use super::query::{bind_query, bind_query_as, NoteListQuery};
use super::repository::{HealthCheck, NoteRepository, TokenRepository, UserRepository};

/// Repositories over a Postgres pool
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgStore {
    async fn list(&self, query: &NoteListQuery) -> Result<(Vec<Note>, i64), DatabaseError> {
        let page_sql = query.to_sql();
        let count_sql = query.to_count_sql();

        // Page and total come from one snapshot
        let mut tx = self.pool.begin().await?;

        let notes = bind_query_as(sqlx::query_as::<_, Note>(&page_sql.query), &page_sql.params)
            .fetch_all(&mut *tx)
            .await?;

        let row = bind_query(sqlx::query(&count_sql.query), &count_sql.params)
            .fetch_one(&mut *tx)
            .await?;
        let total: i64 = row.try_get("count")?;

        tx.commit().await?;

        tracing::debug!("Listed {} of {} notes for user {}", notes.len(), total, query.viewer);
        Ok((notes, total))
    }

    async fn find(&self, id: i64) -> Result<Option<Note>, DatabaseError> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn create(&self, note: NewNote) -> Result<Note, DatabaseError> {
        let created = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (title, content, author_name, is_public, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.author_name)
        .bind(note.is_public)
        .bind(note.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, id: i64, changes: NoteChanges) -> Result<Note, DatabaseError> {
        let updated = sqlx::query_as::<_, Note>(
            "UPDATE notes SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                author_name = COALESCE($4, author_name),
                is_public = COALESCE($5, is_public),
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.author_name)
        .bind(changes.is_public)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DatabaseError::NotFound(format!("Note {} not found", id)))
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn is_shared_with(&self, note_id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM note_shares WHERE note_id = $1 AND user_id = $2) AS shared")
            .bind(note_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("shared")?)
    }

    async fn share(&self, note_id: i64, user_id: i64) -> Result<NoteShare, DatabaseError> {
        let share = sqlx::query_as::<_, NoteShare>(
            "INSERT INTO note_shares (note_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(share)
    }

    async fn unshare(&self, note_id: i64, user_id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM note_shares WHERE note_id = $1 AND user_id = $2")
            .bind(note_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Note {} is not shared with user {}",
                note_id, user_id
            )));
        }
        Ok(())
    }

    async fn shares(&self, note_id: i64) -> Result<Vec<SharedUser>, DatabaseError> {
        let users = sqlx::query_as::<_, SharedUser>(
            "SELECT u.id AS user_id, u.email, u.name, s.created_at AS shared_at
             FROM note_shares s
             JOIN users u ON u.id = s.user_id
             WHERE s.note_id = $1
             ORDER BY s.created_at, u.id",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, age, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn store(&self, token: RefreshToken) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&token.token)
            .bind(token.user_id)
            .bind(token.expires_at)
            .bind(token.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        let found = sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn revoke(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(&self, user_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
