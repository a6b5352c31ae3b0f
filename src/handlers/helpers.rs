use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::error::StoreError;
use crate::models::{AppState, Snapshot};
use crate::render::PASSWORD_MASK;

pub fn render_template<T: askama::Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub fn json_error<S: Into<String>>(status: StatusCode, message: S) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Apply the server's password policy before a snapshot leaves the process.
pub fn outgoing_snapshot(state: &AppState, snapshot: Snapshot) -> Snapshot {
    if state.mask_passwords {
        snapshot.masked(PASSWORD_MASK)
    } else {
        snapshot
    }
}

/// Same as [`outgoing_snapshot`] for an already serialized payload.
pub fn outgoing_payload(state: &AppState, payload: String) -> String {
    if !state.mask_passwords {
        return payload;
    }
    match Snapshot::parse(&payload) {
        Ok(snapshot) => snapshot
            .masked(PASSWORD_MASK)
            .to_json()
            .unwrap_or_else(|_| "[]".to_string()),
        Err(e) => {
            tracing::error!(%e, "Published payload is not a snapshot");
            "[]".to_string()
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "User store error");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}
