//! HTTP DTOs for the intake endpoints.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::application::handlers::intake::{ConversationTurn, ConversationView};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::intake::{ImageUpload, IntakeSettings, MediaSlot, Utterance};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One user turn: plain text or a base64-encoded image.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SendMessageRequest {
    Text {
        text: String,
    },
    Image {
        file_name: String,
        content_type: String,
        /// Standard base64, no data-URL prefix.
        data: String,
    },
}

impl SendMessageRequest {
    pub fn into_utterance(self) -> Result<Utterance, ErrorResponse> {
        match self {
            SendMessageRequest::Text { text } => Ok(Utterance::Text(text)),
            SendMessageRequest::Image {
                file_name,
                content_type,
                data,
            } => {
                let bytes = STANDARD
                    .decode(data.trim())
                    .map_err(|e| ErrorResponse::bad_request(format!("Invalid base64 image: {}", e)))?;
                Ok(Utterance::Image(ImageUpload::new(file_name, content_type, bytes)))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// The assistant's reply to a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub conversation_id: String,
    pub step: String,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
}

impl From<ConversationTurn> for TurnResponse {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            conversation_id: turn.conversation_id.to_string(),
            step: turn.step.to_string(),
            messages: turn.messages,
            submission_id: turn.submission_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSlotResponse {
    pub key: String,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<MediaSlot> for MediaSlotResponse {
    fn from(slot: MediaSlot) -> Self {
        Self {
            key: slot.key,
            label: slot.label,
            required: slot.required,
            url: slot.url,
        }
    }
}

/// Conversation state for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub session_id: String,
    pub started_at: String,
    pub step: String,
    pub attempts: u32,
    pub reporter: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub media: Vec<MediaSlotResponse>,
}

impl From<ConversationView> for ConversationResponse {
    fn from(view: ConversationView) -> Self {
        Self {
            conversation_id: view.conversation_id.to_string(),
            session_id: view.session_id.to_string(),
            started_at: view.started_at.to_rfc3339(),
            step: view.step.to_string(),
            attempts: view.attempts,
            reporter: view.reporter,
            area: view.area,
            description: view.description,
            location: view.location.map(|l| l.to_string()),
            media: view.media.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseResponse {
    pub messages: Vec<String>,
}

/// Stored overrides next to the settings they produce.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub overrides: Option<serde_json::Value>,
    pub effective: IntakeSettings,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::with_code("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_code("SERVICE_UNAVAILABLE", message)
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message,
            details: err.details,
        }
    }
}

/// Status code family for a domain error.
pub fn is_client_error(code: ErrorCode) -> bool {
    matches!(code, ErrorCode::ValidationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_deserializes() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"type": "text", "text": "hola"}"#).unwrap();
        assert_eq!(req.into_utterance().unwrap(), Utterance::Text("hola".into()));
    }

    #[test]
    fn image_request_decodes_base64() {
        let json = r#"{"type": "image", "file_name": "foto.jpg", "content_type": "image/jpeg", "data": "AQID"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        match req.into_utterance().unwrap() {
            Utterance::Image(upload) => {
                assert_eq!(upload.bytes, vec![1, 2, 3]);
                assert_eq!(upload.file_name, "foto.jpg");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn bad_base64_is_a_bad_request() {
        let json = r#"{"type": "image", "file_name": "f.jpg", "content_type": "image/jpeg", "data": "@@@"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.into_utterance().unwrap_err().code, "BAD_REQUEST");
    }

    #[test]
    fn domain_error_keeps_code_and_details() {
        let err = DomainError::validation("confidence_threshold", "out of range");
        let response = ErrorResponse::from(err);
        assert_eq!(response.code, "VALIDATION_FAILED");
        assert_eq!(response.details["field"], "confidence_threshold");
    }
}
