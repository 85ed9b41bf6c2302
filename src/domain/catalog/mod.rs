//! Read-only campus catalogs: service areas, option vocabularies,
//! buildings and rooms.

mod area;
mod location;

pub use area::{image_slots_of, Area, Field, FieldKind, ImageSlotSpec, OptionCatalog, OptionSource};
pub use location::{Building, Location, Room};
