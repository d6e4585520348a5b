/// Business logic: authentication strategies, session orchestration,
/// login notifications
pub mod auth_service;
pub mod notification;
pub mod strategy;

pub use auth_service::{prepare_signup, select_live_token, AuthSessionService};
pub use notification::TelegramNotifier;
pub use strategy::{AuthOutcome, AuthStrategy, Credentials, DefaultAuthStrategy, TelegramAuthStrategy};
