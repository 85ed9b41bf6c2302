//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types, the state machine trait
//! and text normalization used across the intake domain.

mod errors;
mod ids;
mod state_machine;
pub mod text;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AreaId, BuildingId, ConversationId, RoomId, SessionId, SubmissionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
