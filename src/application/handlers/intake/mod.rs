//! Intake conversation handlers.
//!
//! The controller drives one turn at a time; the registry keeps live
//! conversations. Model-backed collaborators degrade to the manual path
//! whenever the provider is missing or fails.

mod area_classifier;
mod assistant;
mod controller;
mod identity_resolver;
mod registry;
mod settings_provider;
mod slot_extractor;

pub use area_classifier::{ClassifierChain, GatedClassification, ModelAreaClassifier};
pub use assistant::ConversationAssistant;
pub use controller::{IntakeController, IntakeError, TurnOutcome};
pub use identity_resolver::{IdentityResolution, IdentityResolver};
pub use registry::{ConversationRegistry, ConversationTurn, ConversationView, RegistryError};
pub use settings_provider::SettingsProvider;
pub use slot_extractor::ModelSlotExtractor;
