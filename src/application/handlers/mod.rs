//! Application handlers.

pub mod intake;

pub use intake::{
    ConversationRegistry, ConversationTurn, ConversationView, IntakeController, IntakeError,
    RegistryError, SettingsProvider, TurnOutcome,
};
