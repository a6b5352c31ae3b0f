use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{AppState, UserRecord};

use super::helpers::{json_error, outgoing_snapshot};

pub async fn users_list(State(state): State<AppState>) -> impl IntoResponse {
    Json(outgoing_snapshot(&state, state.store.snapshot()))
}

pub async fn users_create(
    State(state): State<AppState>,
    Json(record): Json<UserRecord>,
) -> Response {
    let email = record.email.trim().to_string();
    if email.is_empty() {
        return json_error(StatusCode::UNPROCESSABLE_ENTITY, "Missing email");
    }
    match state.store.insert(UserRecord::new(email, record.password)) {
        Ok(snapshot) => {
            (StatusCode::CREATED, Json(outgoing_snapshot(&state, snapshot))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn users_delete(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    match state.store.remove(&email) {
        Ok(0) => json_error(StatusCode::NOT_FOUND, format!("User '{}' not found", email)),
        Ok(removed) => {
            tracing::info!(%email, removed, "Removed user");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}
