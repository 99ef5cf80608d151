// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which puts an
// `AuthUser` into the request extensions.
pub mod auth; // Session endpoints for the signed-in user
pub mod notes; // Note CRUD and sharing
