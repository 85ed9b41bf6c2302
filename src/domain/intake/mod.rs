//! Intake dialogue domain.
//!
//! Steps and the tagged session state, turn-local validators, the media
//! slot pipeline, submission assembly and the classifier/extractor seams.

mod classifier;
mod detection;
mod media;
pub mod policy;
pub mod response_parser;
mod services;
mod session;
mod settings;
mod step;
mod submission;
mod utterance;

pub use classifier::KeywordAreaClassifier;
pub use detection::{Detection, DetectionSource, Urgency};
pub use media::{collected, MediaError, MediaProgress, MediaSlot};
pub use policy::{
    AbstainReason, AreaCandidate, ClassificationOutcome, ConfirmationReply, IdentityInput,
    MenuError, TooShort,
};
pub use services::{
    AreaClassifier, AreaProfile, ClassificationError, DefaultSlotExtractor, ExtractedSlots,
    ExtractionError, SlotExtractor,
};
pub use session::{Extras, IntakeSession, ReadyReport, ReportDraft, Stage};
pub use settings::{render, IntakeSettings, MessageCatalog, PromptCatalog, RetryPolicy, Thresholds};
pub use step::Step;
pub use submission::{SubmissionRecord, SubmissionStatus};
pub use utterance::{ImageUpload, Utterance};
