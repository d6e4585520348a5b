use chrono::{DateTime, Utc};
/// User model and auth request/response types
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub telegram_id: Option<i64>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Insert payload; exactly the columns signup sets
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub telegram_id: Option<i64>,
    pub password_hash: Option<String>,
    pub language: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: Option<String>,
    pub telegram_id: Option<i64>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: Option<String>,
    /// Used by the bot flow when the client already knows its telegram_id
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TelegramLoginRequest {
    pub telegram_id: i64,
    pub signature: String,
    pub nonce: i64,
    pub timestamp: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub repeat_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleUpdateRequest {
    pub is_superuser: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub language: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            telegram_id: user.telegram_id,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            language: user.language,
        }
    }
}
