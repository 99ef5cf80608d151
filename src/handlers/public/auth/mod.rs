pub mod login; // POST /api/auth/login
pub mod refresh; // POST /api/auth/refresh
pub mod register; // POST /api/auth/register
pub mod utils;

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
