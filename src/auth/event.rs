use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Incoming invocation: the HTTP method and the raw JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    #[serde(default = "default_method")]
    pub http_method: String,
    /// Absent reads as `{}`; an explicit `null` stays `None`.
    #[serde(default = "default_body")]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

fn default_body() -> Option<String> {
    Some("{}".into())
}

impl AuthEvent {
    pub fn new(http_method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            body: Some(body.into()),
        }
    }
}

/// Outgoing envelope: status, headers and a JSON-encoded body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl AuthResponse {
    /// CORS preflight answer. Carries no `Content-Type`.
    pub fn preflight() -> Self {
        let headers = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            (
                "Access-Control-Allow-Methods".to_string(),
                "POST, OPTIONS".to_string(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                "Content-Type".to_string(),
            ),
        ]);
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_json_body(status, body),
            Err(e) => {
                error!(error = %e, "response serialization failed");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::with_json_body(status, serde_json::json!({ "error": message }).to_string())
    }

    fn with_json_body(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }

        (status, headers, Body::from(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_has_cors_headers_and_no_content_type() {
        let res = AuthResponse::preflight();
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, "");
        assert_eq!(res.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(res.headers["Access-Control-Allow-Methods"], "POST, OPTIONS");
        assert_eq!(res.headers["Access-Control-Allow-Headers"], "Content-Type");
        assert!(!res.headers.contains_key("Content-Type"));
    }

    #[test]
    fn error_body_is_json_with_cors() {
        let res = AuthResponse::error(StatusCode::NOT_FOUND, "User not found");
        assert_eq!(res.status_code, 404);
        assert_eq!(res.body, r#"{"error":"User not found"}"#);
        assert_eq!(res.headers["Content-Type"], "application/json");
        assert_eq!(res.headers["Access-Control-Allow-Origin"], "*");
        assert!(!res.is_base64_encoded);
    }

    #[test]
    fn envelope_uses_camel_case_on_the_wire() {
        let event: AuthEvent =
            serde_json::from_str(r#"{"httpMethod":"POST","body":"{\"action\":\"login\"}"}"#)
                .unwrap();
        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"action":"login"}"#));

        let json = serde_json::to_value(AuthResponse::preflight()).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], false);
        assert!(json["headers"].is_object());
    }

    #[test]
    fn missing_fields_in_event_fall_back() {
        let event: AuthEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.http_method, "GET");
        assert_eq!(event.body.as_deref(), Some("{}"));
    }

    #[test]
    fn null_body_is_kept_apart_from_absent_body() {
        let event: AuthEvent =
            serde_json::from_str(r#"{"httpMethod":"POST","body":null}"#).unwrap();
        assert!(event.body.is_none());
    }

    #[test]
    fn into_response_keeps_status_and_headers() {
        let res = AuthResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            .into_response();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
    }
}
