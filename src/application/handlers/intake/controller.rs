//! Conversation controller.
//!
//! One call per user turn: read the current stage, run the step handler,
//! move to the next stage and return the messages to show. Every
//! recoverable failure (lookups, validation, classifier or extractor
//! trouble, upload and persistence errors) becomes a message; only a broken
//! stage transition is returned as an error.

use std::sync::Arc;
use thiserror::Error;

use super::area_classifier::{ClassifierChain, ModelAreaClassifier};
use super::assistant::ConversationAssistant;
use super::identity_resolver::{IdentityResolution, IdentityResolver};
use super::settings_provider::SettingsProvider;
use super::slot_extractor::ModelSlotExtractor;
use crate::domain::catalog::{Area, Building, Location, OptionCatalog, Room};
use crate::domain::directory::Reporter;
use crate::domain::foundation::{SubmissionId, ValidationError};
use crate::domain::intake::policy::{
    classify_confirmation, is_media_url, is_skip, parse_menu_choice, validate_description,
    validate_location,
};
use crate::domain::intake::{
    collected, render, AreaProfile, ClassificationOutcome, ConfirmationReply, DefaultSlotExtractor,
    Detection, DetectionSource, ImageUpload, IntakeSession, IntakeSettings, MediaError,
    MediaProgress, MediaSlot, ReadyReport, ReportDraft, SlotExtractor, Stage, Step,
    SubmissionRecord, Utterance,
};
use crate::ports::{
    AIProvider, AreaCatalog, LocationCatalog, MediaStore, ReporterDirectory, SubmissionStore,
};

/// Raised only when a turn would break the step graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("invalid session transition: {0}")]
    InvalidTransition(#[from] ValidationError),
}

/// The result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session: IntakeSession,
    pub messages: Vec<String>,
    /// Set on the turn that persisted a report.
    pub submission_id: Option<SubmissionId>,
}

fn reply(session: IntakeSession, messages: Vec<String>) -> TurnOutcome {
    TurnOutcome {
        session,
        messages,
        submission_id: None,
    }
}

pub struct IntakeController {
    identity: IdentityResolver,
    areas: Arc<dyn AreaCatalog>,
    locations: Arc<dyn LocationCatalog>,
    media: Arc<dyn MediaStore>,
    submissions: Arc<dyn SubmissionStore>,
    settings: SettingsProvider,
    assistant: ConversationAssistant,
    ai: Option<Arc<dyn AIProvider>>,
}

impl IntakeController {
    /// A controller in manual mode: menus only, no model calls.
    pub fn new(
        directory: Arc<dyn ReporterDirectory>,
        areas: Arc<dyn AreaCatalog>,
        locations: Arc<dyn LocationCatalog>,
        media: Arc<dyn MediaStore>,
        submissions: Arc<dyn SubmissionStore>,
        settings: SettingsProvider,
    ) -> Self {
        Self {
            identity: IdentityResolver::new(directory),
            areas,
            locations,
            media,
            submissions,
            settings,
            assistant: ConversationAssistant::canned(),
            ai: None,
        }
    }

    /// Enables the assisted path.
    pub fn with_ai(mut self, provider: Arc<dyn AIProvider>) -> Self {
        self.assistant = ConversationAssistant::new(provider.clone());
        self.ai = Some(provider);
        self
    }

    pub fn is_assisted(&self) -> bool {
        self.ai.is_some()
    }

    pub fn settings(&self) -> &SettingsProvider {
        &self.settings
    }

    /// Opens a conversation at `greeting` with a fresh settings snapshot.
    pub async fn start_session(&self) -> TurnOutcome {
        let session = IntakeSession::new(self.settings.snapshot().await);
        tracing::info!(session_id = %session.id(), assisted = self.is_assisted(), "intake session started");
        let welcome = session.settings().messages.welcome.clone();
        reply(session, vec![welcome])
    }

    /// Discards the session and hands back a fresh identity-seeking one.
    pub async fn close_session(&self, session: IntakeSession) -> TurnOutcome {
        tracing::info!(session_id = %session.id(), step = %session.step(), "intake session closed");
        let closed = session.settings().messages.closed.clone();
        let fresh = IntakeSession::awaiting_identity(self.settings.snapshot().await);
        reply(fresh, vec![closed])
    }

    pub async fn handle_utterance(
        &self,
        session: IntakeSession,
        utterance: impl Into<Utterance>,
    ) -> Result<TurnOutcome, IntakeError> {
        let utterance = utterance.into();
        let session_id = session.id();
        let step = session.step();
        tracing::debug!(%session_id, %step, kind = utterance.kind(), "handling utterance");

        let outcome = match session.stage().clone() {
            Stage::AwaitingMedia { draft, media } => {
                self.on_media(session, draft, media, utterance).await?
            }
            stage => match utterance {
                Utterance::Text(text) => self.on_text(session, stage, &text).await?,
                Utterance::Image(_) => {
                    let message = session.settings().messages.text_expected.clone();
                    reply(session, vec![message])
                }
            },
        };

        tracing::debug!(
            %session_id,
            from = %step,
            to = %outcome.session.step(),
            attempts = outcome.session.attempts(),
            "turn handled"
        );
        Ok(outcome)
    }

    async fn on_text(
        &self,
        session: IntakeSession,
        stage: Stage,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        match stage {
            Stage::Greeting | Stage::AwaitingIdentity => self.on_identity(session, text).await,
            Stage::AwaitingProblem { reporter } => self.on_problem(session, reporter, text).await,
            Stage::AwaitingArea {
                reporter,
                problem,
                areas,
            } => self.on_area_choice(session, reporter, problem, areas, text).await,
            Stage::AwaitingBuilding { draft, buildings } => {
                self.on_building_choice(session, draft, buildings, text).await
            }
            Stage::AwaitingRoom {
                draft,
                building,
                rooms,
            } => self.on_room_choice(session, draft, building, rooms, text).await,
            Stage::AwaitingMedia { draft, media } => {
                self.on_media(session, draft, media, Utterance::Text(text.to_string()))
                    .await
            }
            Stage::AwaitingLocation { draft, media } => {
                self.on_location(session, draft, media, text).await
            }
            Stage::AwaitingConfirmation { report } => {
                self.on_confirmation(session, report, text).await
            }
            Stage::Completed { .. } => {
                let fresh = IntakeSession::awaiting_identity(self.settings.snapshot().await);
                self.on_identity(fresh, text).await
            }
        }
    }

    // ----- identity -----

    async fn on_identity(
        &self,
        session: IntakeSession,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        match self.identity.resolve(text).await {
            IdentityResolution::Found(reporter) => {
                let greeting = render(
                    &settings.messages.greet_reporter,
                    &[("name", reporter.first_name())],
                );
                let session = session.advance(Stage::AwaitingProblem { reporter })?;
                Ok(reply(session, vec![greeting]))
            }
            IdentityResolution::NotIdentityLike => {
                let answer = self.assistant.small_talk(session.id(), &settings, text).await;
                Ok(reply(leave_greeting(session)?, vec![answer]))
            }
            IdentityResolution::NotFound(code) => {
                let message = render(&settings.messages.identity_not_found, &[("code", &code)]);
                self.reject(leave_greeting(session)?, message).await
            }
        }
    }

    // ----- problem and area -----

    async fn on_problem(
        &self,
        session: IntakeSession,
        reporter: Reporter,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let problem = match validate_description(text, &settings.thresholds) {
            Ok(problem) => problem,
            Err(short) => {
                let message = render(
                    &settings.messages.description_too_short,
                    &[("min", &short.min.to_string())],
                );
                return self.reject(session, message).await;
            }
        };

        let areas = match self.areas.list_areas().await {
            Ok(areas) if !areas.is_empty() => areas,
            Ok(_) => {
                tracing::warn!(session_id = %session.id(), "area catalog is empty");
                return Ok(reply(session, vec![settings.messages.no_areas.clone()]));
            }
            Err(err) => {
                tracing::error!(session_id = %session.id(), error = %err, "failed to list areas");
                return Ok(reply(session, vec![settings.messages.no_areas.clone()]));
            }
        };

        let options = self.option_catalog().await;
        let profiles: Vec<AreaProfile> = areas
            .iter()
            .map(|area| AreaProfile::from_area(area, &options))
            .collect();
        let classification = self
            .classifier_chain(&session)
            .classify(session.id(), &problem, &profiles)
            .await;

        match classification.outcome {
            ClassificationOutcome::Accepted(candidate) => {
                let mut areas = areas;
                let area = areas.swap_remove(candidate.index);
                tracing::info!(
                    session_id = %session.id(),
                    area = %area.id,
                    confidence = candidate.confidence,
                    source = classification.source.as_str(),
                    rationale = %candidate.rationale,
                    "area detected"
                );
                let ack = self
                    .assistant
                    .follow_up(session.id(), &settings, &area.name, &problem)
                    .await;
                let detection =
                    Detection::new(candidate.confidence, classification.source, problem.as_str());
                let mut draft = ReportDraft::new(reporter, area, problem);
                draft.detection = Some(detection);
                self.after_area(session, draft, options, vec![ack]).await
            }
            ClassificationOutcome::Abstained(reason) => {
                tracing::info!(session_id = %session.id(), ?reason, "classification abstained, showing area menu");
                let menu = area_menu(&settings, &areas);
                let session = session.advance(Stage::AwaitingArea {
                    reporter,
                    problem,
                    areas,
                })?;
                Ok(reply(session, vec![menu]))
            }
        }
    }

    async fn on_area_choice(
        &self,
        session: IntakeSession,
        reporter: Reporter,
        problem: String,
        mut areas: Vec<Area>,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let index = match parse_menu_choice(text, areas.len()) {
            Ok(index) => index,
            Err(_) => {
                let message = out_of_range(&settings, areas.len());
                return self.reject(session, message).await;
            }
        };

        let area = areas.swap_remove(index);
        tracing::info!(session_id = %session.id(), area = %area.id, "area chosen from menu");
        let ack = render(&settings.messages.area_detected, &[("area", &area.name)]);
        let mut draft = ReportDraft::new(reporter, area, problem.as_str());
        draft.detection = Some(Detection::new(100, DetectionSource::Manual, problem));
        let options = self.option_catalog().await;
        self.after_area(session, draft, options, vec![ack]).await
    }

    /// Refreshes the schema, extracts slots, then asks for the building,
    /// media, location or confirmation, whichever comes first.
    async fn after_area(
        &self,
        session: IntakeSession,
        mut draft: ReportDraft,
        options: OptionCatalog,
        mut messages: Vec<String>,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();

        match self.areas.field_schema(&draft.area.id).await {
            Ok(fields) => draft.area.fields = fields,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), area = %draft.area.id, error = %err, "field schema lookup failed, using listed schema");
            }
        }

        let extractor = self.slot_extractor(&session, options);
        match extractor.extract(&draft.problem, &draft.area).await {
            Ok(slots) => {
                // A cleaned description still has to meet the minimum length.
                match validate_description(&slots.description, &settings.thresholds) {
                    Ok(description) => draft.description = description,
                    Err(short) => {
                        tracing::debug!(
                            session_id = %session.id(),
                            actual = short.actual,
                            "extracted description too short, keeping the problem text"
                        );
                    }
                }
                draft.location = slots
                    .location
                    .and_then(|raw| validate_location(&raw, &settings.thresholds).ok())
                    .map(Location::freeform);
                draft.detection = draft.detection.take().map(|d| d.with_urgency(slots.urgency));
                draft.extras = slots.extras;
            }
            Err(err) => {
                tracing::warn!(session_id = %session.id(), error = %err, "slot extraction failed, using defaults");
                draft.description = self
                    .assistant
                    .improve_description(session.id(), &settings, &draft.problem)
                    .await;
            }
        }

        if draft.location.is_none() {
            let buildings = self.buildings(&session).await;
            if !buildings.is_empty() {
                messages.push(building_menu(&settings, &buildings));
                let session = session.advance(Stage::AwaitingBuilding { draft, buildings })?;
                return Ok(reply(session, messages));
            }
        } else {
            tracing::debug!(session_id = %session.id(), "location extracted from problem text");
        }

        self.start_media(session, draft, messages)
    }

    // ----- building and room -----

    async fn on_building_choice(
        &self,
        session: IntakeSession,
        mut draft: ReportDraft,
        mut buildings: Vec<Building>,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        // The last menu entry is "other place".
        let entries = buildings.len() + 1;
        let index = match parse_menu_choice(text, entries) {
            Ok(index) => index,
            Err(_) => {
                let message = out_of_range(&settings, entries);
                return self.reject(session, message).await;
            }
        };

        if index == buildings.len() {
            tracing::debug!(session_id = %session.id(), "other location chosen");
            return self.start_media(session, draft, Vec::new());
        }

        let building = buildings.swap_remove(index);
        let rooms = match self.locations.list_rooms(&building.id).await {
            Ok(rooms) => rooms,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), building = %building.id, error = %err, "room lookup failed");
                Vec::new()
            }
        };

        if rooms.is_empty() {
            draft.location = Some(Location::Site {
                building,
                room: None,
            });
            return self.start_media(session, draft, Vec::new());
        }

        let menu = room_menu(&settings, &building, &rooms);
        let session = session.advance(Stage::AwaitingRoom {
            draft,
            building,
            rooms,
        })?;
        Ok(reply(session, vec![menu]))
    }

    async fn on_room_choice(
        &self,
        session: IntakeSession,
        mut draft: ReportDraft,
        building: Building,
        mut rooms: Vec<Room>,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let index = match parse_menu_choice(text, rooms.len()) {
            Ok(index) => index,
            Err(_) => {
                let message = out_of_range(&settings, rooms.len());
                return self.reject(session, message).await;
            }
        };

        let room = rooms.swap_remove(index);
        draft.location = Some(Location::Site {
            building,
            room: Some(room),
        });
        self.start_media(session, draft, Vec::new())
    }

    // ----- media -----

    fn start_media(
        &self,
        session: IntakeSession,
        draft: ReportDraft,
        mut messages: Vec<String>,
    ) -> Result<TurnOutcome, IntakeError> {
        let slots = draft.area.image_slots();
        if slots.is_empty() {
            return self.finish_media(session, draft, Vec::new(), messages);
        }

        let progress = MediaProgress::new(slots);
        if let Some(slot) = progress.current() {
            messages.push(media_prompt(session.settings(), slot));
        }
        let session = session.advance(Stage::AwaitingMedia {
            draft,
            media: progress,
        })?;
        Ok(reply(session, messages))
    }

    async fn on_media(
        &self,
        session: IntakeSession,
        draft: ReportDraft,
        mut progress: MediaProgress,
        utterance: Utterance,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let slot = match progress.current() {
            Some(slot) => slot.clone(),
            None => return self.finish_media(session, draft, progress.into_slots(), Vec::new()),
        };
        let invalid = || render(&settings.messages.media_invalid, &[("label", &slot.label)]);

        let accepted = match utterance {
            Utterance::Image(upload) => {
                if let Err(message) = check_upload(&settings, &upload, &slot) {
                    return self.reject(session, message).await;
                }
                let folder = format!(
                    "{}/{}",
                    settings.media_folder.trim_end_matches('/'),
                    draft.area.id
                );
                match self.media.upload(&upload.bytes, &folder, &upload.file_name).await {
                    Ok(url) => {
                        tracing::info!(session_id = %session.id(), slot = %slot.key, size = upload.len(), "media uploaded");
                        progress.collect(url).map_err(|_| invalid())
                    }
                    Err(err) => {
                        tracing::warn!(session_id = %session.id(), slot = %slot.key, error = %err, "media upload failed");
                        let message = settings.messages.media_upload_failed.clone();
                        return Ok(reply(session, vec![message]));
                    }
                }
            }
            Utterance::Text(text) if is_media_url(&text) => {
                tracing::info!(session_id = %session.id(), slot = %slot.key, "media linked");
                progress.collect(text.trim()).map_err(|_| invalid())
            }
            Utterance::Text(text) if is_skip(&text, &settings.messages) => {
                progress.skip().map_err(|err| match err {
                    MediaError::Required => {
                        render(&settings.messages.media_required, &[("label", &slot.label)])
                    }
                    MediaError::Finished => invalid(),
                })
            }
            Utterance::Text(_) => Err(invalid()),
        };

        if let Err(message) = accepted {
            return self.reject(session, message).await;
        }

        if progress.is_complete() {
            return self.finish_media(session, draft, progress.into_slots(), Vec::new());
        }
        let prompt = progress
            .current()
            .map(|next| media_prompt(&settings, next))
            .into_iter()
            .collect();
        let session = session.advance(Stage::AwaitingMedia {
            draft,
            media: progress,
        })?;
        Ok(reply(session, prompt))
    }

    /// Confirmation when the location is known, otherwise ask for it.
    fn finish_media(
        &self,
        session: IntakeSession,
        draft: ReportDraft,
        media: Vec<MediaSlot>,
        mut messages: Vec<String>,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        if draft.location.is_some() {
            let report = draft.ready(media)?;
            messages.push(summary(&settings, &report));
            let session = session.advance(Stage::AwaitingConfirmation { report })?;
            return Ok(reply(session, messages));
        }

        messages.push(settings.messages.ask_location.clone());
        let session = session.advance(Stage::AwaitingLocation { draft, media })?;
        Ok(reply(session, messages))
    }

    // ----- location -----

    async fn on_location(
        &self,
        session: IntakeSession,
        mut draft: ReportDraft,
        media: Vec<MediaSlot>,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let location = match validate_location(text, &settings.thresholds) {
            Ok(location) => location,
            Err(short) => {
                let message = render(
                    &settings.messages.location_too_short,
                    &[("min", &short.min.to_string())],
                );
                return self.reject(session, message).await;
            }
        };

        let location = self
            .assistant
            .suggest_location(session.id(), &settings, &location)
            .await;
        draft.location = Some(Location::freeform(location));
        let report = draft.ready(media)?;
        let message = summary(&settings, &report);
        let session = session.advance(Stage::AwaitingConfirmation { report })?;
        Ok(reply(session, vec![message]))
    }

    // ----- confirmation -----

    async fn on_confirmation(
        &self,
        session: IntakeSession,
        report: ReadyReport,
        text: &str,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        match classify_confirmation(text, &settings.messages) {
            ConfirmationReply::Affirmative => self.submit(session, report).await,
            ConfirmationReply::Negative => {
                tracing::info!(session_id = %session.id(), "report rejected at confirmation");
                let session = session.restart_problem()?;
                Ok(reply(session, vec![settings.messages.confirmation_rejected.clone()]))
            }
            ConfirmationReply::Unrecognized => {
                let message = settings.messages.confirmation_reprompt.clone();
                self.reject(session, message).await
            }
        }
    }

    async fn submit(
        &self,
        session: IntakeSession,
        report: ReadyReport,
    ) -> Result<TurnOutcome, IntakeError> {
        let settings = session.settings().clone();
        let record = SubmissionRecord::assemble(&report)?;

        let submission_id = match self.submissions.insert(&record).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    session_id = %session.id(),
                    area = %record.area_id,
                    error = %err,
                    "failed to persist submission"
                );
                return Ok(reply(session, vec![settings.messages.submission_failed.clone()]));
            }
        };

        let completed = session.advance(Stage::Completed { submission_id })?;
        tracing::info!(
            session_id = %completed.id(),
            %submission_id,
            area = %record.area_id,
            reporter_kind = record.reporter.kind(),
            media = collected(&record.media).count(),
            "submission created"
        );

        let fresh = IntakeSession::awaiting_identity(self.settings.snapshot().await);
        let message = render(
            &settings.messages.submission_created,
            &[("id", &submission_id.to_string())],
        );
        Ok(TurnOutcome {
            session: fresh,
            messages: vec![message],
            submission_id: Some(submission_id),
        })
    }

    // ----- shared -----

    /// Counts an invalid reply and applies the retry policy.
    async fn reject(
        &self,
        session: IntakeSession,
        message: String,
    ) -> Result<TurnOutcome, IntakeError> {
        let session = session.record_invalid();
        if !session.retries_exhausted() {
            return Ok(reply(session, vec![message]));
        }

        tracing::info!(
            session_id = %session.id(),
            step = %session.step(),
            attempts = session.attempts(),
            "retry limit reached"
        );
        let settings = session.settings().clone();
        let mut messages = vec![settings.messages.retries_exhausted.clone()];

        if !session.step().is_identified() {
            let fresh = IntakeSession::awaiting_identity(self.settings.snapshot().await);
            messages.push(fresh.settings().messages.ask_identity.clone());
            return Ok(reply(fresh, messages));
        }

        let session = session.restart_problem()?;
        let name = session
            .reporter()
            .map(|r| r.first_name().to_string())
            .unwrap_or_default();
        messages.push(render(&settings.messages.greet_reporter, &[("name", &name)]));
        Ok(reply(session, messages))
    }

    async fn option_catalog(&self) -> OptionCatalog {
        match self.areas.option_catalog().await {
            Ok(options) => options,
            Err(err) => {
                tracing::warn!(error = %err, "option catalog unavailable, continuing without vocabulary");
                OptionCatalog::default()
            }
        }
    }

    async fn buildings(&self, session: &IntakeSession) -> Vec<Building> {
        match self.locations.list_buildings().await {
            Ok(buildings) => buildings,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), error = %err, "building lookup failed, asking for free-text location");
                Vec::new()
            }
        }
    }

    fn classifier_chain(&self, session: &IntakeSession) -> ClassifierChain {
        let settings = session.settings();
        let threshold = settings.thresholds.confidence_threshold;
        match &self.ai {
            Some(provider) => ClassifierChain::assisted(
                Box::new(ModelAreaClassifier::new(
                    provider.clone(),
                    settings.prompts.classify.clone(),
                    session.id(),
                )),
                threshold,
            ),
            None => ClassifierChain::manual(threshold),
        }
    }

    fn slot_extractor(
        &self,
        session: &IntakeSession,
        options: OptionCatalog,
    ) -> Box<dyn SlotExtractor> {
        match &self.ai {
            Some(provider) => Box::new(ModelSlotExtractor::new(
                provider.clone(),
                session.settings().prompts.extract.clone(),
                options,
                session.id(),
            )),
            None => Box::new(DefaultSlotExtractor),
        }
    }
}

fn leave_greeting(session: IntakeSession) -> Result<IntakeSession, IntakeError> {
    if session.step() == Step::Greeting {
        Ok(session.advance(Stage::AwaitingIdentity)?)
    } else {
        Ok(session)
    }
}

fn check_upload(
    settings: &IntakeSettings,
    upload: &ImageUpload,
    slot: &MediaSlot,
) -> Result<(), String> {
    if !upload.is_image() || upload.is_empty() {
        return Err(render(&settings.messages.media_invalid, &[("label", &slot.label)]));
    }
    if upload.len() > settings.max_media_bytes {
        return Err(render(
            &settings.messages.media_too_large,
            &[("max", &settings.max_media_bytes.to_string())],
        ));
    }
    Ok(())
}

// ----- rendering -----

fn numbered<'a>(intro: &str, entries: impl Iterator<Item = &'a str>) -> String {
    let mut out = intro.to_string();
    for (i, entry) in entries.enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, entry));
    }
    out
}

fn area_menu(settings: &IntakeSettings, areas: &[Area]) -> String {
    numbered(
        &settings.messages.area_menu_intro,
        areas.iter().map(|a| a.name.as_str()),
    )
}

fn building_menu(settings: &IntakeSettings, buildings: &[Building]) -> String {
    numbered(
        &settings.messages.building_menu_intro,
        buildings
            .iter()
            .map(|b| b.name.as_str())
            .chain(std::iter::once(settings.messages.other_location_option.as_str())),
    )
}

fn room_menu(settings: &IntakeSettings, building: &Building, rooms: &[Room]) -> String {
    let intro = render(&settings.messages.room_menu_intro, &[("building", &building.name)]);
    numbered(&intro, rooms.iter().map(|r| r.name.as_str()))
}

fn out_of_range(settings: &IntakeSettings, max: usize) -> String {
    render(&settings.messages.menu_out_of_range, &[("max", &max.to_string())])
}

fn media_prompt(settings: &IntakeSettings, slot: &MediaSlot) -> String {
    let mut prompt = render(&settings.messages.media_request, &[("label", &slot.label)]);
    if !slot.required {
        prompt.push_str(&settings.messages.media_optional_hint);
    }
    prompt
}

fn summary(settings: &IntakeSettings, report: &ReadyReport) -> String {
    let media: String = collected(&report.media)
        .map(|slot| format!("- {}: adjunta\n", slot.label))
        .collect();
    render(
        &settings.messages.confirmation_summary,
        &[
            ("area", &report.area.name),
            ("description", &report.description),
            ("location", &report.location.to_string()),
            ("media", &media),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AreaId, BuildingId, RoomId};

    fn settings() -> IntakeSettings {
        IntakeSettings::default()
    }

    fn slot(label: &str, required: bool) -> MediaSlot {
        MediaSlot {
            key: "foto".into(),
            label: label.into(),
            required,
            url: None,
        }
    }

    #[test]
    fn building_menu_ends_with_other_place() {
        let buildings = vec![
            Building {
                id: BuildingId::new("a").unwrap(),
                name: "Pabellón A".into(),
            },
            Building {
                id: BuildingId::new("b").unwrap(),
                name: "Pabellón B".into(),
            },
        ];
        let menu = building_menu(&settings(), &buildings);
        assert!(menu.ends_with("\n1. Pabellón A\n2. Pabellón B\n3. Otro lugar"));
    }

    #[test]
    fn room_menu_names_the_building() {
        let building = Building {
            id: BuildingId::new("a").unwrap(),
            name: "Pabellón A".into(),
        };
        let rooms = vec![Room {
            id: RoomId::new("a-101").unwrap(),
            building_id: building.id.clone(),
            name: "Aula 101".into(),
        }];
        let menu = room_menu(&settings(), &building, &rooms);
        assert!(menu.contains("Pabellón A"));
        assert!(menu.ends_with("\n1. Aula 101"));
    }

    #[test]
    fn optional_media_prompt_mentions_skip() {
        let settings = settings();
        assert_eq!(media_prompt(&settings, &slot("Foto del equipo", true)), "Envía una foto: Foto del equipo.");
        assert!(media_prompt(&settings, &slot("Foto del ambiente", false)).contains("omitir"));
    }

    #[test]
    fn summary_lists_attached_media_only() {
        let mut attached = slot("Foto del equipo", true);
        attached.url = Some("https://cdn/x.jpg".into());
        let report = ReadyReport {
            reporter: Reporter::Staff(crate::domain::directory::Staff {
                dni: "73788334".into(),
                name: "Carlos Rojas".into(),
            }),
            area: Area {
                id: AreaId::new("tic").unwrap(),
                name: "Soporte TIC".into(),
                description: String::new(),
                fields: vec![],
            },
            description: "El proyector no enciende".into(),
            location: Location::freeform("Aula 201"),
            media: vec![attached, slot("Foto del ambiente", false)],
            detection: None,
            extras: Default::default(),
        };

        let text = summary(&settings(), &report);
        assert!(text.contains("- Área: Soporte TIC"));
        assert!(text.contains("- Ubicación: Aula 201"));
        assert!(text.contains("- Foto del equipo: adjunta"));
        assert!(!text.contains("Foto del ambiente"));
    }

    #[test]
    fn uploads_must_be_non_empty_images_within_limit() {
        let mut settings = settings();
        settings.max_media_bytes = 4;
        let slot = slot("Foto", true);

        assert!(check_upload(&settings, &ImageUpload::new("a.jpg", "image/jpeg", vec![1, 2]), &slot).is_ok());
        assert!(check_upload(&settings, &ImageUpload::new("a.pdf", "application/pdf", vec![1]), &slot).is_err());
        assert!(check_upload(&settings, &ImageUpload::new("a.jpg", "image/jpeg", vec![]), &slot).is_err());
        let too_large = check_upload(&settings, &ImageUpload::new("a.jpg", "image/jpeg", vec![0; 5]), &slot);
        assert!(too_large.unwrap_err().contains("4 bytes"));
    }
}
