//! HTTP handlers for the intake endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::application::handlers::intake::{ConversationRegistry, RegistryError, SettingsProvider};
use crate::domain::foundation::{ConversationId, DomainError};

use super::dto::{
    is_client_error, CloseResponse, ConversationResponse, ErrorResponse, SendMessageRequest,
    SettingsResponse, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct IntakeAppState {
    registry: Arc<ConversationRegistry>,
}

impl IntakeAppState {
    pub fn new(registry: Arc<ConversationRegistry>) -> Self {
        Self { registry }
    }

    fn settings(&self) -> &SettingsProvider {
        self.registry.controller().settings()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Conversations
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/intake/conversations - Open a conversation
pub async fn open_conversation(State(state): State<IntakeAppState>) -> Response {
    match state.registry.open().await {
        Ok(turn) => (StatusCode::CREATED, Json(TurnResponse::from(turn))).into_response(),
        Err(e) => handle_registry_error(e),
    }
}

/// POST /api/intake/conversations/:id/messages - Send one utterance
pub async fn send_message(
    State(state): State<IntakeAppState>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let conversation_id = match parse_id(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let utterance = match req.into_utterance() {
        Ok(utterance) => utterance,
        Err(err) => return (StatusCode::BAD_REQUEST, Json(err)).into_response(),
    };

    match state.registry.send(conversation_id, utterance).await {
        Ok(turn) => (StatusCode::OK, Json(TurnResponse::from(turn))).into_response(),
        Err(e) => handle_registry_error(e),
    }
}

/// GET /api/intake/conversations/:id - Current conversation state
pub async fn get_conversation(
    State(state): State<IntakeAppState>,
    Path(conversation_id): Path<String>,
) -> Response {
    let conversation_id = match parse_id(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.view(conversation_id).await {
        Ok(view) => (StatusCode::OK, Json(ConversationResponse::from(view))).into_response(),
        Err(e) => handle_registry_error(e),
    }
}

/// DELETE /api/intake/conversations/:id - Close and discard a conversation
pub async fn close_conversation(
    State(state): State<IntakeAppState>,
    Path(conversation_id): Path<String>,
) -> Response {
    let conversation_id = match parse_id(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.close(conversation_id).await {
        Ok(messages) => (StatusCode::OK, Json(CloseResponse { messages })).into_response(),
        Err(e) => handle_registry_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Settings overlay
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/intake/settings - Stored overrides and the effective settings
pub async fn get_settings(State(state): State<IntakeAppState>) -> Response {
    let overrides = match state.settings().overrides().await {
        Ok(overrides) => overrides,
        Err(e) => return handle_domain_error(e),
    };
    let effective = state.settings().snapshot().await.as_ref().clone();
    (StatusCode::OK, Json(SettingsResponse { overrides, effective })).into_response()
}

/// PUT /api/intake/settings - Replace the overrides for future sessions
pub async fn put_settings(
    State(state): State<IntakeAppState>,
    Json(overrides): Json<Value>,
) -> Response {
    match state.settings().save_overrides(&overrides).await {
        Ok(effective) => (
            StatusCode::OK,
            Json(SettingsResponse {
                overrides: Some(overrides),
                effective,
            }),
        )
            .into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// DELETE /api/intake/settings - Back to the built-in settings
pub async fn delete_settings(State(state): State<IntakeAppState>) -> Response {
    match state.settings().clear_overrides().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_domain_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_id(raw: &str) -> Result<ConversationId, Response> {
    raw.parse::<ConversationId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid conversation ID")),
        )
            .into_response()
    })
}

fn handle_registry_error(error: RegistryError) -> Response {
    match error {
        RegistryError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Conversation", &id.to_string())),
        )
            .into_response(),
        RegistryError::AtCapacity(limit) => {
            tracing::warn!(limit, "conversation refused, registry full");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::unavailable(format!(
                    "too many live conversations (limit {})",
                    limit
                ))),
            )
                .into_response()
        }
        RegistryError::Intake(e) => {
            tracing::error!(error = %e, "intake turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(e.to_string())),
            )
                .into_response()
        }
    }
}

fn handle_domain_error(error: DomainError) -> Response {
    let status = if is_client_error(error.code) {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %error, "settings request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse::from(error))).into_response()
}
