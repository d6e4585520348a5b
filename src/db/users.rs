/// User persistence: the `UserStore` contract and its Postgres implementation
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AuthError, Result};
use crate::models::{NewUser, User};

/// Query contract the auth core needs from persistence.
/// All lookups exclude soft-deleted rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// OR-combined filter: matches on username, or on telegram_id when supplied
    async fn find_by_username_or_telegram(
        &self,
        username: &str,
        telegram_id: Option<i64>,
    ) -> Result<Option<User>>;

    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>>;

    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    async fn set_active(&self, id: i64, active: bool) -> Result<User>;

    async fn set_superuser(&self, id: i64, superuser: bool) -> Result<User>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AuthError::UserAlreadyExists;
        }
    }
    err.into()
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username_or_telegram(
        &self,
        username: &str,
        telegram_id: Option<i64>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE deleted_at IS NULL
              AND (username = $1 OR ($2::BIGINT IS NOT NULL AND telegram_id = $2))
            "#,
        )
        .bind(username)
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE telegram_id = $1 AND deleted_at IS NULL",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, telegram_id, password_hash, is_active, is_superuser, language, created_at, updated_at)
            VALUES ($1, $2, $3, true, false, $4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(user.telegram_id)
        .bind(&user.password_hash)
        .bind(&user.language)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(created)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_active = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }

    async fn set_superuser(&self, id: i64, superuser: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_superuser = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(superuser)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }
}
