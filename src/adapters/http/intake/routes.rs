//! HTTP routes for the intake endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    close_conversation, delete_settings, get_conversation, get_settings, open_conversation,
    put_settings, send_message, IntakeAppState,
};

/// Conversation and settings endpoints under `/api/intake`.
pub fn intake_router() -> Router<IntakeAppState> {
    Router::new()
        .route("/api/intake/conversations", post(open_conversation))
        .route(
            "/api/intake/conversations/:id",
            get(get_conversation).delete(close_conversation),
        )
        .route("/api/intake/conversations/:id/messages", post(send_message))
        .route(
            "/api/intake/settings",
            get(get_settings).put(put_settings).delete(delete_settings),
        )
}
