/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,

    /// Shared HS256 secret signing both token kinds
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,

    /// Server secret keying the Telegram login signature HMAC
    pub signature_secret_key: String,

    /// Bot token for login notifications; notifications are disabled when unset
    #[serde(default)]
    pub telegram_bot_token: Option<String>,

    #[serde(default = "default_true")]
    pub cookie_httponly: bool,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_samesite")]
    pub cookie_samesite: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_access_ttl() -> i64 {
    24 * 60 * 60 // 24 hours
}

fn default_refresh_ttl() -> i64 {
    30 * 24 * 60 * 60 // 30 days
}

fn default_true() -> bool {
    true
}

fn default_samesite() -> String {
    "Lax".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
