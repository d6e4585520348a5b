/// Set-Cookie construction for the token pair.
///
/// Tokens travel either as a bearer header or as the `access_token` /
/// `refresh_token` cookies; cookie attributes are configuration.
use axum::http::{header::SET_COOKIE, HeaderValue};
use axum::response::Response;

use crate::config::Config;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

fn attributes(config: &Config) -> String {
    let mut attrs = format!("; Path=/; SameSite={}", config.cookie_samesite);
    if config.cookie_httponly {
        attrs.push_str("; HttpOnly");
    }
    if config.cookie_secure {
        attrs.push_str("; Secure");
    }
    attrs
}

fn cookie(name: &str, value: &str, max_age_secs: i64, config: &Config) -> String {
    format!(
        "{}={}; Max-Age={}{}",
        name,
        value,
        max_age_secs,
        attributes(config)
    )
}

/// Attach both token cookies to a response
pub fn set_auth_cookies(
    response: &mut Response,
    config: &Config,
    access_token: &str,
    refresh_token: &str,
) {
    let pairs = [
        cookie(ACCESS_COOKIE, access_token, config.access_token_ttl_secs, config),
        cookie(REFRESH_COOKIE, refresh_token, config.refresh_token_ttl_secs, config),
    ];
    for value in pairs {
        if let Ok(header) = HeaderValue::from_str(&value) {
            response.headers_mut().append(SET_COOKIE, header);
        }
    }
}

/// Expire both token cookies on the client
pub fn clear_auth_cookies(response: &mut Response, config: &Config) {
    let pairs = [
        cookie(ACCESS_COOKIE, "", 0, config),
        cookie(REFRESH_COOKIE, "", 0, config),
    ];
    for value in pairs {
        if let Ok(header) = HeaderValue::from_str(&value) {
            response.headers_mut().append(SET_COOKIE, header);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            database_url: String::new(),
            redis_url: String::new(),
            jwt_secret: "secret".to_string(),
            access_token_ttl_secs: 86400,
            refresh_token_ttl_secs: 2592000,
            signature_secret_key: "secret".to_string(),
            telegram_bot_token: None,
            cookie_httponly: true,
            cookie_secure: true,
            cookie_samesite: "Lax".to_string(),
        }
    }

    #[test]
    fn test_cookie_format() {
        let config = test_config();
        let value = cookie(ACCESS_COOKIE, "tok", 86400, &config);
        assert_eq!(
            value,
            "access_token=tok; Max-Age=86400; Path=/; SameSite=Lax; HttpOnly; Secure"
        );
    }

    #[test]
    fn test_insecure_cookie_omits_attributes() {
        let mut config = test_config();
        config.cookie_secure = false;
        config.cookie_httponly = false;
        let value = cookie(REFRESH_COOKIE, "tok", 60, &config);
        assert!(!value.contains("Secure"));
        assert!(!value.contains("HttpOnly"));
    }
}
