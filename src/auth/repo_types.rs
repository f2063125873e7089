use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,                      // assigned by the database
    pub phone: String,                // login key, unique
    pub avatar: String,
    pub nickname: String,
    pub username: String,             // public handle, unique
    pub is_premium: bool,             // schema default, never written here
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    // absent from the row returned by INSERT
    #[sqlx(default)]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_seen: Option<OffsetDateTime>,
}

/// Fields supplied by the client at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub phone: String,
    pub avatar: String,
    pub nickname: String,
    pub username: String,
}
