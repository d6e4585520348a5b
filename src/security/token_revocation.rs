/// Redis-backed jti blacklist
///
/// Revocation is keyed by the token's jti claim. Every check is a live
/// round trip to the shared store so a revoked token takes effect
/// immediately for every subsequent request, not just future ones by
/// the same process.
///
/// Alongside the blacklist proper, a per-user jti index
/// (`jwt_blacklist:{user_id}:{token_type}:{jti}`) is written at mint
/// time; it is what makes "logout all sessions" and the password-reset
/// revocation sweep possible.
use redis::aio::ConnectionManager;

use crate::error::{AuthError, Result};

const NAMESPACE: &str = "jwt_blacklist";

const DEFAULT_TOKEN_TTL_SECS: u64 = 3600; // 1 hour
const MIN_TOKEN_TTL_SECS: u64 = 300; // 5 minutes for already-expired tokens

/// Clamp a blacklist entry's TTL to the token's remaining lifetime so
/// entries never outlive the token they revoke
pub fn remaining_ttl(expires_at_secs: Option<i64>) -> u64 {
    let now_secs = chrono::Utc::now().timestamp();
    match expires_at_secs {
        Some(exp) if exp > now_secs => (exp - now_secs) as u64,
        Some(_) => MIN_TOKEN_TTL_SECS,
        None => DEFAULT_TOKEN_TTL_SECS,
    }
}

#[derive(Clone)]
pub struct TokenBlacklist {
    redis: ConnectionManager,
}

impl TokenBlacklist {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn revocation_key(jti: &str) -> String {
        format!("{}:{}", NAMESPACE, jti)
    }

    fn index_key(user_id: i64, token_type: &str, jti: &str) -> String {
        format!("{}:{}:{}:{}", NAMESPACE, user_id, token_type, jti)
    }

    fn user_pattern(user_id: i64) -> String {
        format!("{}:{}:*", NAMESPACE, user_id)
    }

    /// Parse `{ns}:{user_id}:{token_type}:{jti}` back into (token_type, jti)
    fn parse_index_key(key: &str) -> Option<(String, String)> {
        let mut parts = key.splitn(4, ':');
        let _ns = parts.next()?;
        let _user_id = parts.next()?;
        let token_type = parts.next()?;
        let jti = parts.next()?;
        Some((token_type.to_string(), jti.to_string()))
    }

    /// Mark a jti revoked. Idempotent.
    pub async fn add(&self, jti: &str, ttl_secs: u64) -> Result<()> {
        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::revocation_key(jti))
            .arg(1)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut redis)
            .await?;

        tracing::info!(
            "jti revoked, blacklist entry will expire in {} seconds",
            ttl_secs
        );
        Ok(())
    }

    /// Check whether a jti has been revoked
    pub async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let mut redis = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(Self::revocation_key(jti))
            .query_async(&mut redis)
            .await?;
        Ok(exists)
    }

    /// Delete a single namespaced key, returning the number removed
    pub async fn remove(&self, suffix: &str) -> Result<u64> {
        let mut redis = self.redis.clone();
        let removed: u64 = redis::cmd("DEL")
            .arg(format!("{}:{}", NAMESPACE, suffix))
            .query_async(&mut redis)
            .await?;
        Ok(removed)
    }

    /// Cursor-paginated scan-and-delete over a key pattern; never
    /// issues KEYS so large keyspaces cannot block the store
    pub async fn clear(&self, pattern: &str, page_size: usize) -> Result<u64> {
        let mut redis = self.redis.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(page_size)
                .query_async(&mut redis)
                .await?;

            if !keys.is_empty() {
                let removed: u64 = redis::cmd("UNLINK")
                    .arg(&keys)
                    .query_async(&mut redis)
                    .await?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(deleted)
    }

    /// Record a freshly minted jti in the per-user index
    pub async fn track(
        &self,
        user_id: i64,
        token_type: &str,
        jti: &str,
        ttl_secs: u64,
    ) -> Result<()> {
        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::index_key(user_id, token_type, jti))
            .arg(1)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut redis)
            .await?;
        Ok(())
    }

    /// List the (token_type, jti) entries currently indexed for a user
    pub async fn user_jtis(&self, user_id: i64) -> Result<Vec<(String, String)>> {
        let mut redis = self.redis.clone();
        let pattern = Self::user_pattern(user_id);
        let mut cursor: u64 = 0;
        let mut entries = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut redis)
                .await?;

            for key in keys {
                if let Some(entry) = Self::parse_index_key(&key) {
                    entries.push(entry);
                } else {
                    return Err(AuthError::Redis(format!(
                        "Malformed jti index key: {}",
                        key
                    )));
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(entries)
    }

    /// Blacklist every jti indexed for a user, then drop the index.
    /// Returns the number of jtis revoked.
    pub async fn revoke_all_for_user(
        &self,
        user_id: i64,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Result<u64> {
        let entries = self.user_jtis(user_id).await?;
        let mut revoked = 0u64;

        for (token_type, jti) in &entries {
            // The index does not carry the exact exp, so revoke for the
            // full configured lifetime of that token kind
            let ttl = if token_type == crate::security::jwt::TOKEN_TYPE_REFRESH {
                refresh_ttl_secs
            } else {
                access_ttl_secs
            };
            self.add(jti, ttl).await?;
            revoked += 1;
        }

        self.clear(&Self::user_pattern(user_id), 100).await?;

        tracing::warn!("All tokens revoked for user: {}", user_id);
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_ttl_clamps_to_expiry() {
        let now = chrono::Utc::now().timestamp();
        let ttl = remaining_ttl(Some(now + 600));
        assert!((595..=600).contains(&ttl));
    }

    #[test]
    fn test_remaining_ttl_for_expired_token() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(remaining_ttl(Some(now - 10)), MIN_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_remaining_ttl_without_expiry() {
        assert_eq!(remaining_ttl(None), DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_index_key_round_trip() {
        let key = TokenBlacklist::index_key(42, "access", "abc-123");
        assert_eq!(key, "jwt_blacklist:42:access:abc-123");
        let (token_type, jti) =
            TokenBlacklist::parse_index_key(&key).expect("well-formed key parses");
        assert_eq!(token_type, "access");
        assert_eq!(jti, "abc-123");
    }

    #[test]
    fn test_parse_rejects_short_keys() {
        assert!(TokenBlacklist::parse_index_key("jwt_blacklist:42").is_none());
    }
}
