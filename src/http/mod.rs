/// HTTP plumbing shared by the handlers: extractors and cookie building
pub mod cookies;
pub mod extract;

pub use cookies::{clear_auth_cookies, set_auth_cookies};
pub use extract::{ambient_candidates, require_superuser, AmbientToken, CurrentUser, Superuser};
