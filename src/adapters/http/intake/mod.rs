//! Intake HTTP API.
//!
//! Conversations under `/api/intake/conversations` and the runtime settings
//! overlay under `/api/intake/settings`.

mod dto;
mod handlers;
mod routes;

pub use dto::{ConversationResponse, ErrorResponse, SendMessageRequest, TurnResponse};
pub use handlers::IntakeAppState;
pub use routes::intake_router;
