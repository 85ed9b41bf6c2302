//! Area classification: keyword rules first, then the language model.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::intake::policy::gate_classification;
use crate::domain::intake::response_parser::{self, int_field, str_field};
use crate::domain::intake::{
    AbstainReason, AreaCandidate, AreaClassifier, AreaProfile, ClassificationError,
    ClassificationOutcome, DetectionSource, KeywordAreaClassifier,
};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, ResponseFormat};

/// Asks the model to pick one of the numbered areas.
pub struct ModelAreaClassifier {
    provider: Arc<dyn AIProvider>,
    system_prompt: String,
    session_id: SessionId,
}

impl ModelAreaClassifier {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        system_prompt: impl Into<String>,
        session_id: SessionId,
    ) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            session_id,
        }
    }

    fn user_message(problem: &str, areas: &[AreaProfile]) -> String {
        let mut out = String::from("Áreas disponibles:\n");
        for (i, area) in areas.iter().enumerate() {
            out.push_str(&format!("{}. {}", i + 1, area.name));
            if !area.description.trim().is_empty() {
                out.push_str(&format!(": {}", area.description.trim()));
            }
            if !area.vocabulary.is_empty() {
                out.push_str(&format!(" (opciones: {})", area.vocabulary.join(", ")));
            }
            out.push('\n');
        }
        out.push_str(&format!("\nReporte: {}", problem.trim()));
        out
    }

    /// Reads `{"index": 1-based, "confidence": 0-100, "rationale": "..."}`.
    fn parse_answer(content: &str) -> Result<Option<AreaCandidate>, ClassificationError> {
        let map = response_parser::parse_json_object(content)
            .map_err(|e| ClassificationError::Unreadable(e.to_string()))?;

        let index = match int_field(&map, "index") {
            Some(index) => index,
            // The model may explicitly decline with `"index": null`.
            None if map.get("index").map_or(false, |v| v.is_null()) => return Ok(None),
            None => return Err(ClassificationError::Unreadable("missing index".into())),
        };
        if index < 1 {
            return Ok(None);
        }
        let confidence = int_field(&map, "confidence")
            .ok_or_else(|| ClassificationError::Unreadable("missing confidence".into()))?
            .clamp(0, 100) as u8;

        Ok(Some(AreaCandidate {
            index: (index - 1) as usize,
            confidence,
            rationale: str_field(&map, "rationale").unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl AreaClassifier for ModelAreaClassifier {
    fn source(&self) -> DetectionSource {
        DetectionSource::Model
    }

    async fn classify(
        &self,
        problem: &str,
        areas: &[AreaProfile],
    ) -> Result<Option<AreaCandidate>, ClassificationError> {
        let request = CompletionRequest::new(RequestMetadata::new(self.session_id, "classify"))
            .with_system_prompt(&self.system_prompt)
            .with_message(MessageRole::User, Self::user_message(problem, areas))
            .with_response_format(ResponseFormat::Json)
            .with_max_tokens(200)
            .with_temperature(0.0);

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| ClassificationError::Unavailable(e.to_string()))?;
        Self::parse_answer(&response.content)
    }
}

/// Result of running the chain: the gate decision and who made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedClassification {
    pub outcome: ClassificationOutcome,
    pub source: DetectionSource,
}

/// Rules first; the model only when the rules do not clear the threshold.
///
/// Without a model the chain abstains unconditionally, sending every
/// report through the numbered menu.
pub struct ClassifierChain {
    rules: KeywordAreaClassifier,
    model: Option<Box<dyn AreaClassifier>>,
    threshold: u8,
}

impl ClassifierChain {
    /// The chain used when no model is configured.
    pub fn manual(threshold: u8) -> Self {
        Self {
            rules: KeywordAreaClassifier::new(),
            model: None,
            threshold,
        }
    }

    pub fn assisted(model: Box<dyn AreaClassifier>, threshold: u8) -> Self {
        Self {
            rules: KeywordAreaClassifier::new(),
            model: Some(model),
            threshold,
        }
    }

    pub async fn classify(
        &self,
        session_id: SessionId,
        problem: &str,
        areas: &[AreaProfile],
    ) -> GatedClassification {
        let model = match &self.model {
            Some(model) => model,
            None => {
                return GatedClassification {
                    outcome: ClassificationOutcome::Abstained(AbstainReason::NoCandidate),
                    source: DetectionSource::Manual,
                }
            }
        };

        let rules = self.gate(self.run(&self.rules, session_id, problem, areas).await, areas.len());
        if let ClassificationOutcome::Accepted(_) = rules {
            return GatedClassification {
                outcome: rules,
                source: self.rules.source(),
            };
        }

        GatedClassification {
            outcome: self.gate(self.run(model.as_ref(), session_id, problem, areas).await, areas.len()),
            source: model.source(),
        }
    }

    async fn run(
        &self,
        classifier: &dyn AreaClassifier,
        session_id: SessionId,
        problem: &str,
        areas: &[AreaProfile],
    ) -> Option<AreaCandidate> {
        match classifier.classify(problem, areas).await {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::warn!(
                    %session_id,
                    source = classifier.source().as_str(),
                    error = %err,
                    "classifier failed, abstaining"
                );
                None
            }
        }
    }

    fn gate(&self, candidate: Option<AreaCandidate>, area_count: usize) -> ClassificationOutcome {
        gate_classification(candidate, area_count, self.threshold)
    }
}
