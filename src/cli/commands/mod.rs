pub mod auth;
pub mod notes;
pub mod server;
