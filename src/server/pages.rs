//! Landing page: a static listing of the registered operations.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::server::routes::AppState;

const TEMPLATE: &str = include_str!("../../templates/index.html");

/// Render the operation listing from the registry.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let rows: String = state
        .registry
        .operations()
        .iter()
        .map(|op| {
            format!(
                "      <tr><td><code>{}</code></td><td><code>{} {}</code></td><td>{}</td></tr>\n",
                op.id, op.method, op.route, op.description
            )
        })
        .collect();

    Html(TEMPLATE.replace("{{operations}}", &rows))
}
