/// Pluggable credential verification.
///
/// A strategy turns submitted credentials into a minted token pair.
/// Strategies are selected by the caller based on the credential shape
/// and form a closed, extensible set: new ones (e.g. OTP) slot in
/// without touching the existing variants.
use std::sync::Arc;

use async_trait::async_trait;

use crate::db::UserStore;
use crate::error::{AuthError, Result};
use crate::models::User;
use crate::security::{self, jwt::MintedPair, TokenCodec};

/// Ephemeral request payloads; never persisted
#[derive(Debug, Clone)]
pub enum Credentials {
    Password {
        username: String,
        password: Option<String>,
        telegram_id: Option<i64>,
    },
    Telegram {
        telegram_id: i64,
        signature: String,
        nonce: i64,
        timestamp: i64,
    },
}

/// A successful authentication: the account plus its fresh token pair
#[derive(Debug)]
pub struct AuthOutcome {
    pub user: User,
    pub tokens: MintedPair,
}

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn authenticate(
        &self,
        users: &dyn UserStore,
        credentials: &Credentials,
    ) -> Result<AuthOutcome>;
}

/// Username/password login. The lookup filter is username OR
/// telegram_id (when supplied) so bot-linked accounts can sign in by
/// either identifier.
pub struct DefaultAuthStrategy {
    codec: Arc<TokenCodec>,
}

impl DefaultAuthStrategy {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl AuthStrategy for DefaultAuthStrategy {
    async fn authenticate(
        &self,
        users: &dyn UserStore,
        credentials: &Credentials,
    ) -> Result<AuthOutcome> {
        let Credentials::Password {
            username,
            password,
            telegram_id,
        } = credentials
        else {
            return Err(AuthError::Internal(
                "DefaultAuthStrategy requires password credentials".to_string(),
            ));
        };

        let user = users
            .find_by_username_or_telegram(username, *telegram_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // The no-password path exists only for telegram-only accounts,
        // which have no hash; an account that set a password must
        // always present one
        match (password, user.password_hash.as_deref()) {
            (Some(password), Some(hash)) => {
                if !security::verify_password(password, hash)? {
                    return Err(AuthError::IncorrectPassword);
                }
            }
            (Some(_), None) | (None, Some(_)) => return Err(AuthError::IncorrectPassword),
            (None, None) => {}
        }

        if !user.is_active {
            return Err(AuthError::DeactivatedAccount);
        }

        let tokens = self.codec.mint_pair(user.id, true)?;
        tracing::info!("User logged in: {}", user.username);
        Ok(AuthOutcome { user, tokens })
    }
}

/// Telegram HMAC-signature login. The signature is verified before the
/// account lookup so error ordering cannot leak account existence.
pub struct TelegramAuthStrategy {
    codec: Arc<TokenCodec>,
    signature_secret: String,
}

impl TelegramAuthStrategy {
    pub fn new(codec: Arc<TokenCodec>, signature_secret: String) -> Self {
        Self {
            codec,
            signature_secret,
        }
    }
}

#[async_trait]
impl AuthStrategy for TelegramAuthStrategy {
    async fn authenticate(
        &self,
        users: &dyn UserStore,
        credentials: &Credentials,
    ) -> Result<AuthOutcome> {
        let Credentials::Telegram {
            telegram_id,
            signature,
            nonce,
            timestamp,
        } = credentials
        else {
            return Err(AuthError::Internal(
                "TelegramAuthStrategy requires telegram credentials".to_string(),
            ));
        };

        if !security::verify_signature(
            *telegram_id,
            signature,
            *nonce,
            *timestamp,
            &self.signature_secret,
        ) {
            return Err(AuthError::InvalidSignature);
        }

        let user = users
            .find_by_telegram_id(*telegram_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::DeactivatedAccount);
        }

        let tokens = self.codec.mint_pair(user.id, true)?;
        tracing::info!("Telegram login for user: {}", user.username);
        Ok(AuthOutcome { user, tokens })
    }
}
