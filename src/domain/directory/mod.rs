//! Reporter directory domain.
//!
//! The people who may file reports. Directory entries are owned by an
//! external system and are never mutated here.

mod reporter;

pub use reporter::{Reporter, ReporterRef, Staff, Student};
