//! Triage metadata attached once an area has been settled.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::text;

/// Estimated urgency of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Baja,
    #[default]
    Media,
    Alta,
}

impl Urgency {
    /// Lenient parse of model output; accepts Spanish and English labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match text::normalize(raw).as_str() {
            "baja" | "low" | "leve" => Some(Urgency::Baja),
            "media" | "medium" | "normal" | "moderada" => Some(Urgency::Media),
            "alta" | "high" | "urgente" | "critica" | "urgent" => Some(Urgency::Alta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Baja => "baja",
            Urgency::Media => "media",
            Urgency::Alta => "alta",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who settled the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Rules,
    Model,
    /// The reporter picked it from the numbered menu.
    Manual,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::Rules => "rules",
            DetectionSource::Model => "model",
            DetectionSource::Manual => "manual",
        }
    }
}

/// Classification metadata carried through to the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Confidence in `[0, 100]`.
    pub confidence: u8,
    pub urgency: Urgency,
    pub source: DetectionSource,
    pub raw_utterance: String,
}

impl Detection {
    pub fn new(confidence: u8, source: DetectionSource, raw_utterance: impl Into<String>) -> Self {
        Self {
            confidence: confidence.min(100),
            urgency: Urgency::default(),
            source,
            raw_utterance: raw_utterance.into(),
        }
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }
}
