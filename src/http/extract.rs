/// Request extractors: ambient token lookup, the authenticated user,
/// and the superuser gate
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::{AuthError, Result};
use crate::http::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::models::User;
use crate::security::jwt::Claims;
use crate::AppState;

/// Token from the Authorization header, if present and well-formed
pub fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Named cookie from the Cookie header(s)
pub fn cookie_token(parts: &Parts, name: &str) -> Option<String> {
    for header in parts.headers.get_all("Cookie") {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let mut kv = pair.trim().splitn(2, '=');
            if kv.next() == Some(name) {
                if let Some(value) = kv.next() {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Ordered token candidates a request carries ambiently: bearer
/// header first, then the access cookie, then the refresh cookie.
/// Login sets both cookies, so by the time refresh is called the
/// access cookie is routinely expired while the refresh cookie is
/// still live; callers try each candidate in order.
pub fn ambient_candidates(parts: &Parts) -> Vec<String> {
    let mut candidates = Vec::new();
    candidates.extend(bearer_token(parts));
    candidates.extend(cookie_token(parts, ACCESS_COOKIE));
    candidates.extend(cookie_token(parts, REFRESH_COOKIE));
    candidates
}

/// The ambient candidates of a request; rejects when there are none.
/// Used by refresh and verify, which accept either token kind.
pub struct AmbientToken(pub Vec<String>);

#[async_trait]
impl FromRequestParts<AppState> for AmbientToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self> {
        let candidates = ambient_candidates(parts);
        if candidates.is_empty() {
            return Err(AuthError::Credentials);
        }
        Ok(AmbientToken(candidates))
    }
}

/// The authenticated account behind a request: decodes the access
/// token, consults the blacklist, loads the subject, and rejects
/// deactivated accounts.
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts, ACCESS_COOKIE))
            .ok_or(AuthError::Credentials)?;

        let claims = state.codec.decode(&token).map_err(|e| match e {
            AuthError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::Credentials,
        })?;
        if !claims.is_access() {
            return Err(AuthError::Credentials);
        }

        if state.blacklist.is_revoked(&claims.jti).await? {
            return Err(AuthError::Credentials);
        }

        let user = state
            .users
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::Credentials)?;
        if !user.is_active {
            return Err(AuthError::DeactivatedAccount);
        }

        Ok(CurrentUser { user, claims })
    }
}

/// Pure predicate gating privileged operations
pub fn require_superuser(user: &User) -> Result<()> {
    if user.is_superuser {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

/// An authenticated superuser; rejects everyone else with 403
pub struct Superuser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Superuser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        require_superuser(&current.user)?;
        Ok(Superuser(current.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::test_user;
    use axum::http::Request;

    fn parts_with(header: &str, value: &str) -> Parts {
        let request = Request::builder()
            .uri("/")
            .header(header, value)
            .body(())
            .expect("request builds");
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        let parts = parts_with("Authorization", "Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let parts = parts_with("Authorization", "Basic abc");
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn test_cookie_token() {
        let parts = parts_with("Cookie", "theme=dark; access_token=tok-1; lang=en");
        assert_eq!(cookie_token(&parts, ACCESS_COOKIE).as_deref(), Some("tok-1"));
        assert!(cookie_token(&parts, REFRESH_COOKIE).is_none());
    }

    #[test]
    fn test_ambient_candidates_include_both_cookies_in_order() {
        let parts = parts_with("Cookie", "access_token=tok-a; refresh_token=tok-r");
        assert_eq!(
            ambient_candidates(&parts),
            vec!["tok-a".to_string(), "tok-r".to_string()]
        );
    }

    #[test]
    fn test_bearer_precedes_cookies() {
        let request = Request::builder()
            .uri("/")
            .header("Authorization", "Bearer tok-b")
            .header("Cookie", "refresh_token=tok-r")
            .body(())
            .expect("request builds");
        let parts = request.into_parts().0;
        assert_eq!(
            ambient_candidates(&parts),
            vec!["tok-b".to_string(), "tok-r".to_string()]
        );
    }

    #[test]
    fn test_empty_cookie_value_ignored() {
        let parts = parts_with("Cookie", "access_token=");
        assert!(cookie_token(&parts, ACCESS_COOKIE).is_none());
    }

    #[test]
    fn test_require_superuser() {
        let mut user = test_user();
        assert!(matches!(
            require_superuser(&user),
            Err(AuthError::PermissionDenied)
        ));
        user.is_superuser = true;
        assert!(require_superuser(&user).is_ok());
    }
}
