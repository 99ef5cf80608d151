pub mod note;
pub mod refresh_token;
pub mod share;
pub mod user;

pub use note::{NewNote, Note, NoteChanges};
pub use refresh_token::RefreshToken;
pub use share::{NoteShare, SharedUser};
pub use user::{NewUser, User};
