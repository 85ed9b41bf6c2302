//! Conversation session as a tagged state.
//!
//! Each stage carries exactly the data that is valid at that point of the
//! dialogue, so a session cannot hold an area without a reporter or reach
//! confirmation without a location.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::detection::Detection;
use super::media::{MediaProgress, MediaSlot};
use super::settings::IntakeSettings;
use super::step::Step;
use crate::domain::catalog::{Area, Building, Location, Room};
use crate::domain::directory::Reporter;
use crate::domain::foundation::{
    SessionId, StateMachine, SubmissionId, Timestamp, ValidationError,
};

/// Extra structured fields pulled out of the problem text.
pub type Extras = Map<String, Value>;

/// A report under construction, from area selection onwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub reporter: Reporter,
    pub area: Area,
    /// The text the reporter originally typed.
    pub problem: String,
    /// Cleaned-up description; defaults to `problem`.
    pub description: String,
    pub location: Option<Location>,
    pub detection: Option<Detection>,
    pub extras: Extras,
}

impl ReportDraft {
    pub fn new(reporter: Reporter, area: Area, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self {
            reporter,
            area,
            description: problem.clone(),
            problem,
            location: None,
            detection: None,
            extras: Extras::new(),
        }
    }

    /// Freezes the draft once every mandatory field is present.
    pub fn ready(self, media: Vec<MediaSlot>) -> Result<ReadyReport, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        let location = match self.location {
            Some(location) if !location.is_blank() => location,
            _ => return Err(ValidationError::empty_field("location")),
        };
        Ok(ReadyReport {
            reporter: self.reporter,
            area: self.area,
            description: self.description,
            location,
            media,
            detection: self.detection,
            extras: self.extras,
        })
    }
}

/// A complete report waiting for the reporter's confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyReport {
    pub reporter: Reporter,
    pub area: Area,
    pub description: String,
    pub location: Location,
    pub media: Vec<MediaSlot>,
    pub detection: Option<Detection>,
    pub extras: Extras,
}

/// Step-indexed session payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Greeting,
    AwaitingIdentity,
    AwaitingProblem {
        reporter: Reporter,
    },
    /// Manual menu; `areas` is the list exactly as it was shown.
    AwaitingArea {
        reporter: Reporter,
        problem: String,
        areas: Vec<Area>,
    },
    AwaitingBuilding {
        draft: ReportDraft,
        buildings: Vec<Building>,
    },
    AwaitingRoom {
        draft: ReportDraft,
        building: Building,
        rooms: Vec<Room>,
    },
    AwaitingMedia {
        draft: ReportDraft,
        media: MediaProgress,
    },
    AwaitingLocation {
        draft: ReportDraft,
        media: Vec<MediaSlot>,
    },
    AwaitingConfirmation {
        report: ReadyReport,
    },
    Completed {
        submission_id: SubmissionId,
    },
}

impl Stage {
    pub fn step(&self) -> Step {
        match self {
            Stage::Greeting => Step::Greeting,
            Stage::AwaitingIdentity => Step::AwaitingIdentity,
            Stage::AwaitingProblem { .. } => Step::AwaitingProblem,
            Stage::AwaitingArea { .. } => Step::AwaitingArea,
            Stage::AwaitingBuilding { .. } => Step::AwaitingBuilding,
            Stage::AwaitingRoom { .. } => Step::AwaitingRoom,
            Stage::AwaitingMedia { media, .. } => Step::AwaitingMedia(media.index()),
            Stage::AwaitingLocation { .. } => Step::AwaitingLocation,
            Stage::AwaitingConfirmation { .. } => Step::AwaitingConfirmation,
            Stage::Completed { .. } => Step::Completed,
        }
    }

    pub fn reporter(&self) -> Option<&Reporter> {
        match self {
            Stage::Greeting | Stage::AwaitingIdentity | Stage::Completed { .. } => None,
            Stage::AwaitingProblem { reporter } | Stage::AwaitingArea { reporter, .. } => {
                Some(reporter)
            }
            Stage::AwaitingConfirmation { report } => Some(&report.reporter),
            _ => self.draft().map(|d| &d.reporter),
        }
    }

    fn draft(&self) -> Option<&ReportDraft> {
        match self {
            Stage::AwaitingBuilding { draft, .. }
            | Stage::AwaitingRoom { draft, .. }
            | Stage::AwaitingMedia { draft, .. }
            | Stage::AwaitingLocation { draft, .. } => Some(draft),
            _ => None,
        }
    }
}

/// One conversation's state.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    id: SessionId,
    started_at: Timestamp,
    settings: Arc<IntakeSettings>,
    stage: Stage,
    attempts: u32,
}

impl IntakeSession {
    /// A brand-new session at `greeting`.
    pub fn new(settings: Arc<IntakeSettings>) -> Self {
        Self::with_stage(settings, Stage::Greeting)
    }

    /// A fresh session that skips the greeting and asks for identity.
    pub fn awaiting_identity(settings: Arc<IntakeSettings>) -> Self {
        Self::with_stage(settings, Stage::AwaitingIdentity)
    }

    fn with_stage(settings: Arc<IntakeSettings>, stage: Stage) -> Self {
        Self {
            id: SessionId::new(),
            started_at: Timestamp::now(),
            settings,
            stage,
            attempts: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn settings(&self) -> &Arc<IntakeSettings> {
        &self.settings
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn step(&self) -> Step {
        self.stage.step()
    }

    /// Consecutive invalid replies at the current step.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reporter(&self) -> Option<&Reporter> {
        self.stage.reporter()
    }

    pub fn selected_area(&self) -> Option<&Area> {
        match &self.stage {
            Stage::AwaitingConfirmation { report } => Some(&report.area),
            stage => stage.draft().map(|d| &d.area),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.stage {
            Stage::AwaitingConfirmation { report } => Some(&report.description),
            stage => stage.draft().map(|d| d.description.as_str()),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match &self.stage {
            Stage::AwaitingConfirmation { report } => Some(&report.location),
            stage => stage.draft().and_then(|d| d.location.as_ref()),
        }
    }

    pub fn detection(&self) -> Option<&Detection> {
        match &self.stage {
            Stage::AwaitingConfirmation { report } => report.detection.as_ref(),
            stage => stage.draft().and_then(|d| d.detection.as_ref()),
        }
    }

    pub fn media_slots(&self) -> &[MediaSlot] {
        match &self.stage {
            Stage::AwaitingMedia { media, .. } => media.slots(),
            Stage::AwaitingLocation { media, .. } => media.as_slice(),
            Stage::AwaitingConfirmation { report } => &report.media,
            _ => &[],
        }
    }

    pub fn submission_id(&self) -> Option<SubmissionId> {
        match &self.stage {
            Stage::Completed { submission_id } => Some(*submission_id),
            _ => None,
        }
    }

    /// Moves to `next` after checking the step graph. The reporter, once
    /// set, must be carried over unchanged.
    pub fn advance(self, next: Stage) -> Result<Self, ValidationError> {
        self.step().transition_to(next.step())?;

        if let (Some(current), Some(following)) = (self.reporter(), next.reporter()) {
            if current != following {
                return Err(ValidationError::invalid_format(
                    "reporter",
                    "reporter cannot change within a session",
                ));
            }
        }

        Ok(Self {
            stage: next,
            attempts: 0,
            ..self
        })
    }

    /// Returns to `awaiting_problem`, dropping everything but the reporter.
    pub fn restart_problem(self) -> Result<Self, ValidationError> {
        let reporter = self
            .reporter()
            .cloned()
            .ok_or_else(|| ValidationError::empty_field("reporter"))?;

        if matches!(self.stage, Stage::AwaitingProblem { .. }) {
            return Ok(Self {
                attempts: 0,
                ..self
            });
        }
        self.advance(Stage::AwaitingProblem { reporter })
    }

    /// Records an invalid reply at the current step.
    pub fn record_invalid(mut self) -> Self {
        self.attempts = self.attempts.saturating_add(1);
        self
    }

    /// True once the retry policy gives up on the current step.
    pub fn retries_exhausted(&self) -> bool {
        self.settings.retry.is_exhausted(self.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ImageSlotSpec;
    use crate::domain::directory::{Staff, Student};
    use crate::domain::foundation::AreaId;
    use crate::domain::intake::settings::RetryPolicy;

    fn settings() -> Arc<IntakeSettings> {
        Arc::new(IntakeSettings::default())
    }

    fn reporter() -> Reporter {
        Reporter::Student(Student {
            code: "201422107".into(),
            dni: "70112233".into(),
            name: "Lucía Quispe".into(),
        })
    }

    fn area() -> Area {
        Area {
            id: AreaId::new("mantenimiento").unwrap(),
            name: "Mantenimiento".into(),
            description: "Infraestructura".into(),
            fields: vec![],
        }
    }

    fn identified() -> IntakeSession {
        IntakeSession::new(settings())
            .advance(Stage::AwaitingIdentity)
            .unwrap()
            .advance(Stage::AwaitingProblem {
                reporter: reporter(),
            })
            .unwrap()
    }

    fn draft_with_location() -> ReportDraft {
        let mut draft = ReportDraft::new(reporter(), area(), "fuga de agua en el baño");
        draft.location = Some(Location::freeform("Pabellón B, piso 2"));
        draft
    }

    #[test]
    fn starts_at_greeting_without_reporter() {
        let session = IntakeSession::new(settings());
        assert_eq!(session.step(), Step::Greeting);
        assert!(session.reporter().is_none());
        assert!(session.media_slots().is_empty());
    }

    #[test]
    fn confirmation_requires_location() {
        let draft = ReportDraft::new(reporter(), area(), "fuga de agua en el baño");
        assert_eq!(
            draft.ready(vec![]).unwrap_err(),
            ValidationError::empty_field("location")
        );

        let mut blank = ReportDraft::new(reporter(), area(), "fuga de agua en el baño");
        blank.location = Some(Location::freeform("  "));
        assert!(blank.ready(vec![]).is_err());
    }

    #[test]
    fn restart_keeps_reporter_and_clears_the_rest() {
        let report = draft_with_location().ready(vec![]).unwrap();
        let session = identified()
            .advance(Stage::AwaitingConfirmation { report })
            .unwrap();
        assert!(session.selected_area().is_some());

        let session = session.restart_problem().unwrap();
        assert_eq!(session.step(), Step::AwaitingProblem);
        assert_eq!(session.reporter(), Some(&reporter()));
        assert!(session.selected_area().is_none());
        assert!(session.description().is_none());
        assert!(session.location().is_none());
        assert!(session.detection().is_none());
        assert!(session.media_slots().is_empty());
    }

    #[test]
    fn reporter_cannot_change() {
        let other = Reporter::Staff(Staff {
            dni: "73788334".into(),
            name: "Carlos Rojas".into(),
        });
        let session = identified();
        let draft = ReportDraft::new(other, area(), "fuga de agua en el baño");
        let result = session.advance(Stage::AwaitingBuilding {
            draft,
            buildings: vec![],
        });
        assert!(result.is_err());
    }

    #[test]
    fn illegal_step_jump_is_rejected() {
        let session = IntakeSession::new(settings());
        let report = draft_with_location().ready(vec![]).unwrap();
        assert!(session
            .advance(Stage::AwaitingConfirmation { report })
            .is_err());
    }

    #[test]
    fn media_stage_reports_slot_index() {
        let mut media = MediaProgress::new(vec![
            ImageSlotSpec {
                key: "a".into(),
                label: "A".into(),
                required: false,
            },
            ImageSlotSpec {
                key: "b".into(),
                label: "B".into(),
                required: false,
            },
        ]);
        let session = identified()
            .advance(Stage::AwaitingMedia {
                draft: draft_with_location(),
                media: media.clone(),
            })
            .unwrap();
        assert_eq!(session.step(), Step::AwaitingMedia(0));

        media.skip().unwrap();
        let session = session
            .advance(Stage::AwaitingMedia {
                draft: draft_with_location(),
                media,
            })
            .unwrap();
        assert_eq!(session.step(), Step::AwaitingMedia(1));
    }

    #[test]
    fn attempts_reset_on_advance() {
        let session = IntakeSession::new(settings())
            .advance(Stage::AwaitingIdentity)
            .unwrap()
            .record_invalid()
            .record_invalid();
        assert_eq!(session.attempts(), 2);
        let session = session
            .advance(Stage::AwaitingProblem {
                reporter: reporter(),
            })
            .unwrap();
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn bounded_retry_policy_exhausts() {
        let mut custom = IntakeSettings::default();
        custom.retry = RetryPolicy::bounded(2);
        let session = IntakeSession::awaiting_identity(Arc::new(custom)).record_invalid();
        assert!(!session.retries_exhausted());
        assert!(session.record_invalid().retries_exhausted());
    }
}
