use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::models::{AppState, Snapshot};
use crate::render::{HtmlTable, LiveTable, RenderOptions};
use crate::templates::IndexTemplate;

use super::helpers::{json_error, outgoing_snapshot, render_template};

// Embed the browser assets in the binary
const CLIENT_SCRIPT: &str = include_str!("../../static/client.js");
const DEFAULT_STYLESHEET: &str = include_str!("../../static/styles.css");

/// Page hosting the `user-list` table, pre-filled with the current snapshot.
pub async fn index(State(state): State<AppState>) -> Response {
    let snapshot = outgoing_snapshot(&state, state.store.snapshot());

    let table_html = match render_user_table(&snapshot) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(%e, "Failed to render user table");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    render_template(IndexTemplate {
        title: "Users".to_string(),
        user_count: snapshot.len(),
        rendered_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        table_html,
    })
}

fn render_user_table(snapshot: &Snapshot) -> Result<String, Box<dyn std::error::Error>> {
    let mut table = LiveTable::new(HtmlTable::new(), RenderOptions::default())?;
    table.render(snapshot)?;
    Ok(table.target().to_html()?)
}

pub async fn client_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CLIENT_SCRIPT,
    )
}

pub async fn styles_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], DEFAULT_STYLESHEET)
}
