// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (JWT auth)
pub mod protected; // JWT required (/api/auth/whoami, /api/auth/logout, /api/notes/*)
pub mod public; // No authentication (/api/auth/register, /api/auth/login, /api/auth/refresh)
