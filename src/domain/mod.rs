//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, text helpers)
//! - `directory` - Reporters (students and staff)
//! - `catalog` - Service areas, option groups, buildings and rooms
//! - `intake` - The intake dialogue: steps, session state, validators, media, submissions

pub mod catalog;
pub mod directory;
pub mod foundation;
pub mod intake;
