use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    api_key: Arc<String>,
}

impl AuthState {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }

    /// Constant-time comparison against the configured key.
    fn allows(&self, presented: &str) -> bool {
        self.api_key.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

#[derive(Debug, Serialize)]
struct UnauthorizedBody {
    detail: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the `x-api-key` header on protected routes.
pub async fn require_api_key(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if auth.allows(key) => next.run(req).await,
        _ => {
            tracing::warn!("unauthorized request rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(UnauthorizedBody {
                    detail: "Unauthorized",
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_accepts_exact_key() {
        let auth = AuthState::new("secret-key".to_string());
        assert!(auth.allows("secret-key"));
    }

    #[test]
    fn allows_rejects_wrong_key() {
        let auth = AuthState::new("secret-key".to_string());
        assert!(!auth.allows("secret-kez"));
    }

    #[test]
    fn allows_rejects_key_of_different_length() {
        let auth = AuthState::new("secret-key".to_string());
        assert!(!auth.allows("secret"));
        assert!(!auth.allows(""));
    }
}
