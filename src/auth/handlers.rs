use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::{
    auth::{
        errors::AuthError,
        event::{AuthEvent, AuthResponse},
    },
    state::AppState,
};

/// Largest body read on `/auth`, the same as axum's default extractor limit.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", any(http_entry))
        .route("/invoke", post(invoke))
}

/// Plain HTTP: the request method and body become the event.
///
/// The body is taken raw so that undecodable or oversized input still gets a
/// JSON answer with CORS headers instead of an extractor rejection.
pub async fn http_entry(State(state): State<AppState>, method: Method, body: Body) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("invocation", %request_id);

    let body: Result<Bytes, AuthError> = if method == Method::POST {
        to_bytes(body, MAX_BODY_BYTES).await.map_err(AuthError::from)
    } else {
        Ok(Bytes::new())
    };

    let mut response = state
        .auth
        .respond(method.as_str(), body)
        .instrument(span)
        .await
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Trigger style: the body is the event envelope, the reply is the response envelope.
pub async fn invoke(
    State(state): State<AppState>,
    Json(event): Json<AuthEvent>,
) -> Json<AuthResponse> {
    let request_id = Uuid::new_v4();
    let response = state
        .auth
        .handle(event)
        .instrument(info_span!("invocation", %request_id))
        .await;
    Json(response)
}
