use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::auth::{
    errors::AuthError,
    repo_types::{NewUser, User},
};

/// A request body resolved to the operation it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCommand {
    Register(NewUser),
    Login(LoginRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub phone: String,
}

/// Body as sent by the client. A field counts as present only when it is a
/// non-empty string.
#[derive(Debug, Deserialize)]
struct RawBody {
    #[serde(default, deserialize_with = "present_string")]
    action: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    avatar: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    nickname: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    username: Option<String>,
}

fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

impl AuthCommand {
    pub fn parse(body: &str) -> Result<Self, AuthError> {
        // Going through a map rejects arrays, which serde would otherwise accept positionally.
        let object: Map<String, Value> = serde_json::from_str(body)?;
        let raw = RawBody::deserialize(Value::Object(object))?;

        match raw.action.as_deref() {
            Some("register") => match (raw.phone, raw.avatar, raw.nickname, raw.username) {
                (Some(phone), Some(avatar), Some(nickname), Some(username)) => {
                    Ok(AuthCommand::Register(NewUser {
                        phone,
                        avatar,
                        nickname,
                        username,
                    }))
                }
                _ => Err(AuthError::MissingFields),
            },
            Some("login") => raw
                .phone
                .map(|phone| AuthCommand::Login(LoginRequest { phone }))
                .ok_or(AuthError::PhoneRequired),
            _ => Err(AuthError::InvalidAction),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthCommand::Register(_) => "register",
            AuthCommand::Login(_) => "login",
        }
    }
}

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}
