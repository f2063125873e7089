use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::debug;

use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same phone or username is already stored.
    #[error("user already exists")]
    Conflict,
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for the `users` table.
///
/// Each call works on a single connection that is returned to the pool
/// when the call finishes, whether it succeeded or not.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user unless its phone or username is taken.
    async fn register(&self, new_user: &NewUser) -> Result<User, StoreError>;

    /// Look a user up by phone and bump `last_seen`. `None` if no such user.
    async fn login(&self, phone: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn register(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let existing = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT id
            FROM users
            WHERE phone = $1 OR username = $2
            LIMIT 1
            "#,
        )
        .bind(&new_user.phone)
        .bind(&new_user.username)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(id) = existing {
            debug!(user_id = id, "phone or username taken");
            return Err(StoreError::Conflict);
        }

        insert_user(&mut conn, new_user).await
    }

    async fn login(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let id = sqlx::query_scalar::<_, i32>(r#"SELECT id FROM users WHERE phone = $1"#)
            .bind(phone)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(id) = id else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_seen = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, phone, avatar, nickname, username, is_premium, created_at, last_seen
            "#,
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some(user))
    }
}

/// Insert without a pre-check. A unique violation (a concurrent insert that
/// slipped past the lookup) is reported as `Conflict`.
pub(crate) async fn insert_user(
    conn: &mut PgConnection,
    new_user: &NewUser,
) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (phone, avatar, nickname, username)
        VALUES ($1, $2, $3, $4)
        RETURNING id, phone, avatar, nickname, username, is_premium, created_at
        "#,
    )
    .bind(&new_user.phone)
    .bind(&new_user.avatar)
    .bind(&new_user.nickname)
    .bind(&new_user.username)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict,
        other => StoreError::Database(other),
    })
}
