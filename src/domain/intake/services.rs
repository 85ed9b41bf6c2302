//! Domain services for the intake dialogue.
//!
//! Traits the controller depends on; rule-based implementations live in the
//! domain, model-backed ones in the application layer.

use async_trait::async_trait;
use thiserror::Error;

use super::detection::{DetectionSource, Urgency};
use super::policy::AreaCandidate;
use super::session::Extras;
use crate::domain::catalog::{Area, OptionCatalog};

/// What a classifier is told about one area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaProfile {
    pub name: String,
    pub description: String,
    /// Selectable-option words, expanded through the shared catalog.
    pub vocabulary: Vec<String>,
}

impl AreaProfile {
    pub fn from_area(area: &Area, options: &OptionCatalog) -> Self {
        Self {
            name: area.name.clone(),
            description: area.description.clone(),
            vocabulary: area.vocabulary(options),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("unreadable classifier answer: {0}")]
    Unreadable(String),
}

/// Picks the area a problem belongs to.
#[async_trait]
pub trait AreaClassifier: Send + Sync {
    /// Which detection source this classifier reports.
    fn source(&self) -> DetectionSource;

    /// Returns a candidate, or `None` when the classifier has no opinion.
    ///
    /// The candidate is not yet gated; callers apply the confidence
    /// threshold.
    async fn classify(
        &self,
        problem: &str,
        areas: &[AreaProfile],
    ) -> Result<Option<AreaCandidate>, ClassificationError>;
}

/// Structured fields pulled from a problem description.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSlots {
    pub description: String,
    pub location: Option<String>,
    pub urgency: Urgency,
    pub extras: Extras,
}

impl ExtractedSlots {
    /// The non-AI fallback: raw text, no location, medium urgency.
    pub fn defaults(raw: &str) -> Self {
        Self {
            description: raw.trim().to_string(),
            location: None,
            urgency: Urgency::default(),
            extras: Extras::new(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("extractor unavailable: {0}")]
    Unavailable(String),

    #[error("unreadable extractor answer: {0}")]
    Unreadable(String),
}

/// Best-effort field extraction.
#[async_trait]
pub trait SlotExtractor: Send + Sync {
    async fn extract(&self, problem: &str, area: &Area) -> Result<ExtractedSlots, ExtractionError>;
}

/// Extractor used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSlotExtractor;

#[async_trait]
impl SlotExtractor for DefaultSlotExtractor {
    async fn extract(
        &self,
        problem: &str,
        _area: &Area,
    ) -> Result<ExtractedSlots, ExtractionError> {
        Ok(ExtractedSlots::defaults(problem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AreaId;

    #[tokio::test]
    async fn default_extractor_returns_documented_defaults() {
        let area = Area {
            id: AreaId::new("tic").unwrap(),
            name: "Soporte TIC".into(),
            description: String::new(),
            fields: vec![],
        };
        let slots = DefaultSlotExtractor
            .extract("  El proyector no enciende ", &area)
            .await
            .unwrap();
        assert_eq!(slots.description, "El proyector no enciende");
        assert_eq!(slots.location, None);
        assert_eq!(slots.urgency, Urgency::Media);
        assert!(slots.extras.is_empty());
    }
}
