use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // ── Client Errors ───────────────────────────────────────────────────
    #[error("{0}")]
    Validation(String),

    #[error("firm {0} is not connected")]
    NotConnected(String),

    #[error("{0} not found")]
    NotFound(String),

    // ── Upstream Errors ─────────────────────────────────────────────────
    /// Non-success status from the identity provider or the accounting API.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::NotConnected(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Transport(_) | RelayError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for RelayError {
    fn from(e: JsonRejection) -> Self {
        RelayError::Validation(format!("invalid JSON body: {}", e.body_text()))
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::warn!(status = status.as_u16(), "{self}");
        }

        let body = json!({
            "ok": false,
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_propagated() {
        let err = RelayError::Upstream {
            status: 401,
            message: "unauthorized".into(),
        };
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "unauthorized");
    }

    #[test]
    fn test_bogus_upstream_status_falls_back_to_bad_gateway() {
        let err = RelayError::Upstream {
            status: 42,
            message: String::new(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_connected_is_client_error() {
        let err = RelayError::NotConnected("f9".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "firm f9 is not connected");
    }
}
