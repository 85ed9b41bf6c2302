//! Application layer.
//!
//! Orchestrates the intake domain over the ports: one controller per
//! process, one registry of live conversations.

pub mod handlers;

pub use handlers::{
    ConversationRegistry, ConversationTurn, ConversationView, IntakeController, IntakeError,
    RegistryError, SettingsProvider, TurnOutcome,
};
