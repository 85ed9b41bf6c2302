//! Model-backed structured extraction.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::catalog::{Area, FieldKind, OptionCatalog};
use crate::domain::foundation::SessionId;
use crate::domain::intake::response_parser::{self, str_field, MAX_FIELD_LENGTH};
use crate::domain::intake::{
    render, ExtractedSlots, ExtractionError, Extras, SlotExtractor, Urgency,
};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, ResponseFormat};

/// Pulls description, location, urgency and area-specific extras out of
/// the problem text. Only extras whose key matches a non-image field of the
/// area are kept.
pub struct ModelSlotExtractor {
    provider: Arc<dyn AIProvider>,
    prompt_template: String,
    options: OptionCatalog,
    session_id: SessionId,
}

impl ModelSlotExtractor {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        prompt_template: impl Into<String>,
        options: OptionCatalog,
        session_id: SessionId,
    ) -> Self {
        Self {
            provider,
            prompt_template: prompt_template.into(),
            options,
            session_id,
        }
    }

    fn describe_fields(&self, area: &Area) -> String {
        let described: Vec<String> = area
            .fields
            .iter()
            .filter_map(|field| match &field.kind {
                FieldKind::Image { .. } => None,
                FieldKind::Text => Some(format!("{} ({})", field.key, field.label)),
                FieldKind::Select { options } => Some(format!(
                    "{} ({}; una de: {})",
                    field.key,
                    field.label,
                    self.options.resolve(options).join(", ")
                )),
            })
            .collect();
        if described.is_empty() {
            "ninguno".to_string()
        } else {
            described.join("; ")
        }
    }

    fn parse_answer(
        content: &str,
        problem: &str,
        area: &Area,
    ) -> Result<ExtractedSlots, ExtractionError> {
        let map = response_parser::parse_json_object(content)
            .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

        let defaults = ExtractedSlots::defaults(problem);
        let extras = match map.get("extras") {
            Some(Value::Object(extras)) => keep_known_extras(extras, area),
            _ => Extras::new(),
        };

        Ok(ExtractedSlots {
            description: str_field(&map, "description").unwrap_or(defaults.description),
            location: str_field(&map, "location"),
            urgency: str_field(&map, "urgency")
                .and_then(|u| Urgency::parse(&u))
                .unwrap_or(defaults.urgency),
            extras,
        })
    }
}

fn keep_known_extras(extras: &serde_json::Map<String, Value>, area: &Area) -> Extras {
    let mut kept = Extras::new();
    for field in &area.fields {
        if matches!(field.kind, FieldKind::Image { .. }) {
            continue;
        }
        match extras.get(&field.key) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                let value: String = s.trim().chars().take(MAX_FIELD_LENGTH).collect();
                kept.insert(field.key.clone(), Value::String(value));
            }
            Some(value @ (Value::Number(_) | Value::Bool(_))) => {
                kept.insert(field.key.clone(), value.clone());
            }
            _ => {}
        }
    }
    kept
}

#[async_trait]
impl SlotExtractor for ModelSlotExtractor {
    async fn extract(&self, problem: &str, area: &Area) -> Result<ExtractedSlots, ExtractionError> {
        let fields = self.describe_fields(area);
        let system_prompt = render(
            &self.prompt_template,
            &[("area", area.name.as_str()), ("fields", fields.as_str())],
        );
        let request = CompletionRequest::new(RequestMetadata::new(self.session_id, "extract"))
            .with_system_prompt(system_prompt)
            .with_message(MessageRole::User, problem)
            .with_response_format(ResponseFormat::Json)
            .with_max_tokens(400)
            .with_temperature(0.0);

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| ExtractionError::Unavailable(e.to_string()))?;
        Self::parse_answer(&response.content, problem, area)
    }
}
