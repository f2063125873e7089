use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::{
    dto::{AuthCommand, UserEnvelope},
    errors::AuthError,
    event::{AuthEvent, AuthResponse},
    repo::UserStore,
    repo_types::User,
};

const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

/// Turns one `AuthEvent` into one `AuthResponse`.
#[derive(Clone)]
pub struct AuthHandler {
    store: Arc<dyn UserStore>,
    expose_internal_errors: bool,
}

impl AuthHandler {
    pub fn new(store: Arc<dyn UserStore>, expose_internal_errors: bool) -> Self {
        Self {
            store,
            expose_internal_errors,
        }
    }

    pub async fn handle(&self, event: AuthEvent) -> AuthResponse {
        let body = event
            .body
            .as_deref()
            .map(str::as_bytes)
            .ok_or(AuthError::NullBody);
        self.respond(&event.http_method, body).await
    }

    /// Answers a raw request. The body is only looked at for `POST`, so a
    /// preflight or a rejected method never fails on what the client sent.
    #[instrument(skip(self, body))]
    pub async fn respond<B: AsRef<[u8]>>(
        &self,
        method: &str,
        body: Result<B, AuthError>,
    ) -> AuthResponse {
        match method {
            "OPTIONS" => return AuthResponse::preflight(),
            "POST" => {}
            other => {
                warn!(method = %other, "method not allowed");
                return self.error_response(AuthError::MethodNotAllowed);
            }
        }

        let result = match body {
            Ok(bytes) => match std::str::from_utf8(bytes.as_ref()) {
                Ok(text) => self.dispatch(text).await,
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => AuthResponse::json(StatusCode::OK, &UserEnvelope { user }),
            Err(e) => self.error_response(e),
        }
    }

    async fn dispatch(&self, body: &str) -> Result<User, AuthError> {
        let command = AuthCommand::parse(body)?;
        debug!(action = command.name(), "dispatching");

        match command {
            AuthCommand::Register(new_user) => {
                let user = self.store.register(&new_user).await?;
                info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            AuthCommand::Login(req) => {
                let user = self
                    .store
                    .login(&req.phone)
                    .await?
                    .ok_or(AuthError::UserNotFound)?;
                info!(user_id = user.id, username = %user.username, "user logged in");
                Ok(user)
            }
        }
    }

    fn error_response(&self, err: AuthError) -> AuthResponse {
        let status = err.status();
        if err.is_internal() {
            error!(error = %err, "auth invocation failed");
            if !self.expose_internal_errors {
                return AuthResponse::error(status, GENERIC_INTERNAL_ERROR);
            }
        } else {
            warn!(%status, reason = %err, "auth request rejected");
        }
        AuthResponse::error(status, &err.to_string())
    }
}
