//! Conversational touches around the deterministic dialogue.
//!
//! Every call has a canned or identity fallback, so the assistant works the
//! same with or without a language model and never fails a turn.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::intake::{render, response_parser, IntakeSettings};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Upper bound for model-phrased replies.
const MAX_REPLY_TOKENS: u32 = 200;

#[derive(Clone, Default)]
pub struct ConversationAssistant {
    provider: Option<Arc<dyn AIProvider>>,
}

impl ConversationAssistant {
    /// An assistant that only ever uses the canned fallbacks.
    pub fn canned() -> Self {
        Self { provider: None }
    }

    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Friendly reply to non-numeric input while asking for identity.
    pub async fn small_talk(
        &self,
        session_id: SessionId,
        settings: &IntakeSettings,
        text: &str,
    ) -> String {
        self.ask(session_id, "small_talk", &settings.prompts.small_talk, text)
            .await
            .unwrap_or_else(|| settings.messages.small_talk.clone())
    }

    /// The sentence acknowledging a detected area.
    pub async fn follow_up(
        &self,
        session_id: SessionId,
        settings: &IntakeSettings,
        area: &str,
        problem: &str,
    ) -> String {
        let prompt = render(&settings.prompts.follow_up, &[("area", area)]);
        self.ask(session_id, "follow_up", &prompt, problem)
            .await
            .unwrap_or_else(|| render(&settings.messages.area_detected, &[("area", area)]))
    }

    /// Rewrites a raw description; the raw text is the fallback.
    pub async fn improve_description(
        &self,
        session_id: SessionId,
        settings: &IntakeSettings,
        raw: &str,
    ) -> String {
        let fallback = raw.trim().to_string();
        match self
            .ask(session_id, "improve_description", &settings.prompts.improve_description, raw)
            .await
        {
            Some(improved) if improved.chars().count() >= settings.thresholds.min_description_len => improved,
            _ => fallback,
        }
    }

    /// Normalises a free-text location; the raw text is the fallback.
    pub async fn suggest_location(
        &self,
        session_id: SessionId,
        settings: &IntakeSettings,
        raw: &str,
    ) -> String {
        let fallback = raw.trim().to_string();
        match self
            .ask(session_id, "suggest_location", &settings.prompts.suggest_location, raw)
            .await
        {
            Some(location) if location.chars().count() >= settings.thresholds.min_location_len => location,
            _ => fallback,
        }
    }

    async fn ask(
        &self,
        session_id: SessionId,
        purpose: &str,
        system_prompt: &str,
        user_text: &str,
    ) -> Option<String> {
        let provider = self.provider.as_ref()?;
        let request = CompletionRequest::new(RequestMetadata::new(session_id, purpose))
            .with_system_prompt(system_prompt)
            .with_message(MessageRole::User, user_text)
            .with_max_tokens(MAX_REPLY_TOKENS)
            .with_temperature(0.3);

        match provider.complete(request).await {
            Ok(response) => {
                let parsed = response_parser::parse_text(&response.content);
                if parsed.is_none() {
                    tracing::debug!(%session_id, purpose, "empty model reply, using fallback");
                }
                parsed
            }
            Err(err) => {
                tracing::warn!(%session_id, purpose, error = %err, "model call failed, using fallback");
                None
            }
        }
    }
}
