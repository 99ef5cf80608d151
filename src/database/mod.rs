pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use query::{NoteListQuery, NoteScope, NoteSort};
pub use repository::{HealthCheck, NoteRepository, Store, TokenRepository, UserRepository};
