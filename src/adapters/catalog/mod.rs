//! Catalog Adapters
//!
//! The reporter directory, area catalog and building/room catalog are
//! served from a YAML campus seed held in memory.

mod in_memory;
mod seed;

pub use in_memory::InMemoryCampusDirectory;
pub use seed::CampusSeed;
