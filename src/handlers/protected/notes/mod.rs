pub mod collection;
pub mod record;
pub mod share;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as notes_get;
pub use collection::post as notes_post;

pub use record::delete as note_delete;
pub use record::get as note_get;
pub use record::update as note_update;

pub use share::delete as share_delete;
pub use share::get as shares_get;
pub use share::post as share_post;
