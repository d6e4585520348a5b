/// Signed token minting and parsing (access/refresh pairs)
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims embedded in every token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id, string-encoded)
    pub sub: String,
    /// Unique token id; the sole revocation handle
    pub jti: String,
    /// "access" or "refresh"
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Set on access tokens only: true iff minted by a primary-credential login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,
    /// CSRF nonce, minted with every token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn is_access(&self) -> bool {
        self.token_type == TOKEN_TYPE_ACCESS
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh.unwrap_or(false)
    }
}

/// A freshly minted access/refresh pair with the claims behind it,
/// so callers can index the jtis without re-decoding
#[derive(Debug)]
pub struct MintedPair {
    pub access_token: String,
    pub access_claims: Claims,
    pub refresh_token: String,
    pub refresh_claims: Claims,
}

/// Encodes and decodes HS256-signed claim tokens. A single shared
/// secret signs both token kinds; keys and TTLs are injected from
/// configuration at the composition root.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    fn mint(&self, user_id: i64, token_type: &str, fresh: Option<bool>, ttl_secs: i64) -> Result<(String, Claims)> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
            iat: now,
            exp: now + ttl_secs,
            fresh,
            csrf: Some(Uuid::new_v4().to_string()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))?;

        Ok((token, claims))
    }

    /// Mint an access token bound to `sub = user_id`
    pub fn create_access(&self, user_id: i64, fresh: bool) -> Result<(String, Claims)> {
        self.mint(user_id, TOKEN_TYPE_ACCESS, Some(fresh), self.access_ttl_secs)
    }

    /// Mint a refresh token bound to `sub = user_id`
    pub fn create_refresh(&self, user_id: i64) -> Result<(String, Claims)> {
        self.mint(user_id, TOKEN_TYPE_REFRESH, None, self.refresh_ttl_secs)
    }

    /// Mint an access/refresh pair in one go
    pub fn mint_pair(&self, user_id: i64, fresh: bool) -> Result<MintedPair> {
        let (access_token, access_claims) = self.create_access(user_id, fresh)?;
        let (refresh_token, refresh_claims) = self.create_refresh(user_id)?;
        Ok(MintedPair {
            access_token,
            access_claims,
            refresh_token,
            refresh_claims,
        })
    }

    /// Decode and verify a token.
    ///
    /// Expired tokens surface as `TokenExpired`; anything malformed or
    /// carrying a bad signature surfaces as `InvalidToken`, so callers
    /// can map the two to different client-visible errors.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-jwt-secret", 3600, 86400)
    }

    #[test]
    fn test_access_round_trip() {
        let codec = codec();
        let (token, minted) = codec.create_access(42, true).expect("should mint");
        let claims = codec.decode(&token).expect("should decode");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().expect("numeric sub"), 42);
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert!(claims.is_fresh());
        assert_eq!(claims.jti, minted.jti);
        assert!(claims.csrf.is_some());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_has_no_fresh_claim() {
        let codec = codec();
        let (token, _) = codec.create_refresh(42).expect("should mint");
        let claims = codec.decode(&token).expect("should decode");

        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
        assert!(claims.fresh.is_none());
        assert!(!claims.is_fresh());
    }

    #[test]
    fn test_jti_unique_per_mint() {
        let codec = codec();
        let (_, a) = codec.create_access(42, true).expect("should mint");
        let (_, b) = codec.create_access(42, true).expect("should mint");
        let (_, c) = codec.create_refresh(42).expect("should mint");
        assert_ne!(a.jti, b.jti);
        assert_ne!(a.jti, c.jti);
        assert_ne!(b.jti, c.jti);
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let codec = codec();
        let (token, _) = codec
            .mint(42, TOKEN_TYPE_ACCESS, Some(false), -120)
            .expect("should mint");
        assert!(matches!(codec.decode(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let codec = codec();
        assert!(matches!(
            codec.decode("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let codec = codec();
        let (token, _) = codec.create_access(42, false).expect("should mint");
        let mut tampered = token;
        tampered.pop();
        tampered.push('A');
        assert!(matches!(
            codec.decode(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_foreign_secret_is_invalid() {
        let ours = codec();
        let theirs = TokenCodec::new("other-secret", 3600, 86400);
        let (token, _) = theirs.create_access(42, true).expect("should mint");
        assert!(matches!(ours.decode(&token), Err(AuthError::InvalidToken)));
    }
}
