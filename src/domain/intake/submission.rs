//! The terminal artifact of a completed dialogue.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::detection::Detection;
use super::media::MediaSlot;
use super::session::{Extras, ReadyReport};
use crate::domain::catalog::Location;
use crate::domain::directory::ReporterRef;
use crate::domain::foundation::{AreaId, Timestamp, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
        }
    }
}

/// A validated report ready to hand to the submission store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub area_id: AreaId,
    pub reporter: ReporterRef,
    pub description: String,
    /// Human-readable location.
    pub location: String,
    /// Structured location as selected or typed.
    pub location_detail: Location,
    pub media: Vec<MediaSlot>,
    pub detection: Option<Detection>,
    pub extras: Extras,
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
}

impl SubmissionRecord {
    /// Builds the record, re-checking the mandatory fields.
    pub fn assemble(report: &ReadyReport) -> Result<Self, ValidationError> {
        let description = report.description.trim();
        if description.is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        if report.location.is_blank() {
            return Err(ValidationError::empty_field("location"));
        }
        if report.reporter.to_ref().key().trim().is_empty() {
            return Err(ValidationError::empty_field("reporter"));
        }
        if report.area.id.as_str().trim().is_empty() {
            return Err(ValidationError::empty_field("area_id"));
        }

        Ok(Self {
            area_id: report.area.id.clone(),
            reporter: report.reporter.to_ref(),
            description: description.to_string(),
            location: report.location.to_string(),
            location_detail: report.location.clone(),
            media: report.media.clone(),
            detection: report.detection.clone(),
            extras: report.extras.clone(),
            status: SubmissionStatus::Pending,
            created_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Area;
    use crate::domain::directory::{Reporter, Staff};

    fn report() -> ReadyReport {
        ReadyReport {
            reporter: Reporter::Staff(Staff {
                dni: "73788334".into(),
                name: "Carlos Rojas".into(),
            }),
            area: Area {
                id: AreaId::new("limpieza").unwrap(),
                name: "Limpieza".into(),
                description: String::new(),
                fields: vec![],
            },
            description: "  Basura acumulada en el pasillo  ".into(),
            location: Location::freeform("Pabellón C"),
            media: vec![],
            detection: None,
            extras: Extras::new(),
        }
    }

    #[test]
    fn assembles_pending_record() {
        let record = SubmissionRecord::assemble(&report()).unwrap();
        assert_eq!(record.status, SubmissionStatus::Pending);
        assert_eq!(record.area_id.as_str(), "limpieza");
        assert_eq!(record.reporter.kind(), "staff");
        assert_eq!(record.description, "Basura acumulada en el pasillo");
        assert_eq!(record.location, "Pabellón C");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut blank_description = report();
        blank_description.description = "   ".into();
        assert!(SubmissionRecord::assemble(&blank_description).is_err());

        let mut blank_location = report();
        blank_location.location = Location::freeform("");
        assert!(SubmissionRecord::assemble(&blank_location).is_err());
    }

    #[test]
    fn status_serializes_as_pending() {
        let record = SubmissionRecord::assemble(&report()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["reporter"]["kind"], "staff");
    }
}
