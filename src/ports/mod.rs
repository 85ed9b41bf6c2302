//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the intake domain and the outside world. Adapters implement these ports.
//!
//! ## Read-only catalogs
//!
//! - `ReporterDirectory` - Student and staff lookups
//! - `AreaCatalog` - Service areas, field schemas, shared option groups
//! - `LocationCatalog` - Buildings and their rooms
//!
//! ## Collaborators with side effects
//!
//! - `AIProvider` - Language-model completions
//! - `MediaStore` - Evidence uploads
//! - `SubmissionStore` - Finished reports
//! - `SettingsOverlayStore` - Runtime message/prompt overrides

mod ai_provider;
mod area_catalog;
mod location_catalog;
mod media_store;
mod reporter_directory;
mod settings_overlay;
mod submission_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseFormat, TokenUsage,
};
pub use area_catalog::AreaCatalog;
pub use location_catalog::LocationCatalog;
pub use media_store::MediaStore;
pub use reporter_directory::ReporterDirectory;
pub use settings_overlay::SettingsOverlayStore;
pub use submission_store::SubmissionStore;
