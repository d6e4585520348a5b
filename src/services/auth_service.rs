/// Session orchestration: signup, signin, refresh, verify, password
/// reset, logout.
///
/// Session state lives in token possession, not on the server; the
/// only server-side state is the jti blacklist. The logical lifecycle
/// is Anonymous -> Authenticated(fresh) -> Authenticated(rotated) ->
/// Revoked.
use std::sync::Arc;

use crate::db::UserStore;
use crate::error::{AuthError, Result};
use crate::models::{NewUser, RegisterRequest, ResetPasswordRequest, User};
use crate::security::{
    self,
    jwt::{Claims, MintedPair},
    remaining_ttl, TokenBlacklist, TokenCodec,
};
use crate::services::notification::TelegramNotifier;
use crate::services::strategy::{AuthOutcome, AuthStrategy, Credentials};
use crate::validators;

/// Validate a registration payload and turn it into an insertable row.
/// At least one of {password, telegram_id} must be present.
pub fn prepare_signup(req: &RegisterRequest) -> Result<NewUser> {
    if req.password.is_none() && req.telegram_id.is_none() {
        return Err(AuthError::MissingFields("password, telegram_id".to_string()));
    }

    validators::check_username(&req.username)?;

    let password_hash = match &req.password {
        Some(password) => {
            validators::check_password(password)?;
            Some(security::hash_password(password)?)
        }
        None => None,
    };

    Ok(NewUser {
        username: req.username.clone(),
        telegram_id: req.telegram_id,
        password_hash,
        language: req.language.clone().unwrap_or_else(|| "ru".to_string()),
    })
}

/// Pick the first ambient token candidate that still decodes.
///
/// A refresh request routinely carries an expired access token next
/// to a live refresh token (login sets both cookies with different
/// TTLs); the expired candidate must not mask the live one. Only when
/// no candidate decodes does the failure surface, expiry taking
/// precedence over malformed input.
pub fn select_live_token<'a>(codec: &TokenCodec, candidates: &'a [String]) -> Result<&'a str> {
    let mut expired = false;
    for token in candidates {
        match codec.decode(token) {
            Ok(_) => return Ok(token),
            Err(AuthError::TokenExpired) => expired = true,
            Err(_) => {}
        }
    }
    if expired {
        Err(AuthError::TokenExpired)
    } else {
        Err(AuthError::Credentials)
    }
}

pub struct AuthSessionService {
    users: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    blacklist: TokenBlacklist,
    notifier: Option<Arc<TelegramNotifier>>,
}

impl AuthSessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        codec: Arc<TokenCodec>,
        blacklist: TokenBlacklist,
        notifier: Option<Arc<TelegramNotifier>>,
    ) -> Self {
        Self {
            users,
            codec,
            blacklist,
            notifier,
        }
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Record both jtis of a minted pair in the per-user index so
    /// logout-all and password reset can revoke them later
    async fn track_pair(&self, user_id: i64, pair: &MintedPair) -> Result<()> {
        self.blacklist
            .track(
                user_id,
                &pair.access_claims.token_type,
                &pair.access_claims.jti,
                remaining_ttl(Some(pair.access_claims.exp)),
            )
            .await?;
        self.blacklist
            .track(
                user_id,
                &pair.refresh_claims.token_type,
                &pair.refresh_claims.jti,
                remaining_ttl(Some(pair.refresh_claims.exp)),
            )
            .await?;
        Ok(())
    }

    pub async fn signup(&self, req: &RegisterRequest) -> Result<User> {
        let new_user = prepare_signup(req)?;
        let user = self.users.insert(new_user).await?;
        tracing::info!("User registered: {}", user.username);
        Ok(user)
    }

    /// Delegate to the selected strategy; on success, index the minted
    /// jtis and (when the account has a linked chat) send the login
    /// notification in the background.
    pub async fn signin(
        &self,
        credentials: &Credentials,
        strategy: &dyn AuthStrategy,
        device_info: Option<String>,
    ) -> Result<AuthOutcome> {
        let outcome = strategy.authenticate(self.users.as_ref(), credentials).await?;
        self.track_pair(outcome.user.id, &outcome.tokens).await?;

        if let (Some(notifier), Some(chat_id), Some(text)) =
            (&self.notifier, outcome.user.telegram_id, device_info)
        {
            notifier.notify_login(chat_id, text);
        }

        Ok(outcome)
    }

    /// Rotate a session: accepts a still-valid access token as well as
    /// a refresh token (graceful degradation), checks revocation and
    /// the subject account, then mints a rotated (fresh=false) pair.
    pub async fn refresh(&self, raw_token: &str) -> Result<(User, MintedPair)> {
        let claims = self.codec.decode(raw_token).map_err(|e| match e {
            AuthError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::Credentials,
        })?;

        if self.blacklist.is_revoked(&claims.jti).await? {
            return Err(AuthError::Credentials);
        }

        let user = self
            .users
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::Credentials)?;
        if !user.is_active {
            return Err(AuthError::DeactivatedAccount);
        }

        let pair = self.codec.mint_pair(user.id, false)?;
        self.track_pair(user.id, &pair).await?;
        tracing::info!("Token pair rotated for user: {}", user.id);
        Ok((user, pair))
    }

    /// Pure check: no rotation, no mutation. Any failure reads as false.
    pub async fn verify(&self, raw_token: &str) -> bool {
        let Ok(claims) = self.codec.decode(raw_token) else {
            return false;
        };
        match self.blacklist.is_revoked(&claims.jti).await {
            Ok(false) => {}
            _ => return false,
        }
        let Ok(user_id) = claims.user_id() else {
            return false;
        };
        matches!(self.users.find_by_id(user_id).await, Ok(Some(user)) if user.is_active)
    }

    /// Change the password and revoke every session the user holds.
    /// Revocation happens before the new hash is committed, so the pair
    /// returned alongside the response is the only surviving credential.
    pub async fn reset_password(
        &self,
        user_id: i64,
        req: &ResetPasswordRequest,
    ) -> Result<(User, MintedPair)> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::IncorrectPassword)?;
        if !security::verify_password(&req.old_password, hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        if req.new_password != req.repeat_password {
            return Err(AuthError::Validation(
                "Passwords do not match".to_string(),
            ));
        }
        validators::check_password(&req.new_password)?;

        self.blacklist
            .revoke_all_for_user(
                user.id,
                self.codec.access_ttl_secs() as u64,
                self.codec.refresh_ttl_secs() as u64,
            )
            .await?;

        let new_hash = security::hash_password(&req.new_password)?;
        self.users.update_password(user.id, &new_hash).await?;

        let pair = self.codec.mint_pair(user.id, false)?;
        self.track_pair(user.id, &pair).await?;
        tracing::info!("Password reset for user: {}", user.id);
        Ok((user, pair))
    }

    /// Blacklist the presented token's jti and drop its index entry
    pub async fn logout(&self, claims: &Claims) -> Result<()> {
        self.blacklist
            .add(&claims.jti, remaining_ttl(Some(claims.exp)))
            .await?;
        let user_id = claims.user_id()?;
        self.blacklist
            .remove(&format!("{}:{}:{}", user_id, claims.token_type, claims.jti))
            .await?;
        tracing::info!("User logged out: {}", user_id);
        Ok(())
    }

    /// Revoke every jti indexed for the user
    pub async fn logout_all(&self, user_id: i64) -> Result<u64> {
        self.blacklist
            .revoke_all_for_user(
                user_id,
                self.codec.access_ttl_secs() as u64,
                self.codec.refresh_ttl_secs() as u64,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{TEST_PASSWORD, TEST_USERNAME};

    fn register_request(password: Option<&str>, telegram_id: Option<i64>) -> RegisterRequest {
        RegisterRequest {
            username: TEST_USERNAME.to_string(),
            password: password.map(str::to_string),
            telegram_id,
            language: None,
        }
    }

    #[test]
    fn test_prepare_signup_requires_a_credential() {
        assert!(matches!(
            prepare_signup(&register_request(None, None)),
            Err(AuthError::MissingFields(_))
        ));
    }

    #[test]
    fn test_prepare_signup_hashes_password() {
        let new_user = prepare_signup(&register_request(Some(TEST_PASSWORD), None))
            .expect("valid signup payload");
        let hash = new_user.password_hash.expect("hash present");
        assert!(crate::security::verify_password(TEST_PASSWORD, &hash).expect("hash verifies"));
        assert_eq!(new_user.language, "ru");
    }

    #[test]
    fn test_prepare_signup_telegram_only() {
        let new_user =
            prepare_signup(&register_request(None, Some(1))).expect("valid signup payload");
        assert!(new_user.password_hash.is_none());
    }

    #[test]
    fn test_select_live_token_skips_expired_access() {
        // Negative access TTL mints an already-expired access token
        // next to a live refresh token, the state a refresh call
        // carries after the access cookie has aged out
        let codec = TokenCodec::new("test-jwt-secret", -120, 86400);
        let pair = codec.mint_pair(42, true).expect("should mint");
        let candidates = vec![pair.access_token, pair.refresh_token.clone()];

        let selected =
            select_live_token(&codec, &candidates).expect("live refresh token selected");
        assert_eq!(selected, pair.refresh_token);
    }

    #[test]
    fn test_select_live_token_all_expired() {
        let codec = TokenCodec::new("test-jwt-secret", -120, -120);
        let pair = codec.mint_pair(42, true).expect("should mint");
        let candidates = vec![pair.access_token, pair.refresh_token];

        assert!(matches!(
            select_live_token(&codec, &candidates),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_select_live_token_garbage_only() {
        let codec = TokenCodec::new("test-jwt-secret", 3600, 86400);
        let candidates = vec!["not.a.token".to_string()];

        assert!(matches!(
            select_live_token(&codec, &candidates),
            Err(AuthError::Credentials)
        ));
    }
}
