//! HTTP routing for the gateway.

use crate::{chat, state::AppState};
use axum::{Router, routing::post};

/// Build the axum router with the `/chat` endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat::chat))
        .with_state(state)
}
