//! Buildings, rooms and the resolved location of a report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{BuildingId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub building_id: BuildingId,
    pub name: String,
}

/// Where the problem is, either typed freely or picked from the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Freeform { text: String },
    Site { building: Building, room: Option<Room> },
}

impl Location {
    pub fn freeform(text: impl Into<String>) -> Self {
        Location::Freeform { text: text.into() }
    }

    /// True when there is nothing meaningful to show.
    pub fn is_blank(&self) -> bool {
        match self {
            Location::Freeform { text } => text.trim().is_empty(),
            Location::Site { building, .. } => building.name.trim().is_empty(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Freeform { text } => write!(f, "{}", text.trim()),
            Location::Site {
                building,
                room: Some(room),
            } => write!(f, "{} - {}", building.name, room.name),
            Location::Site {
                building,
                room: None,
            } => write!(f, "{}", building.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building() -> Building {
        Building {
            id: BuildingId::new("pab-a").unwrap(),
            name: "Pabellón A".to_string(),
        }
    }

    #[test]
    fn site_with_room_displays_both_names() {
        let loc = Location::Site {
            building: building(),
            room: Some(Room {
                id: RoomId::new("a-101").unwrap(),
                building_id: BuildingId::new("pab-a").unwrap(),
                name: "Aula 101".to_string(),
            }),
        };
        assert_eq!(loc.to_string(), "Pabellón A - Aula 101");
    }

    #[test]
    fn site_without_room_displays_building() {
        let loc = Location::Site {
            building: building(),
            room: None,
        };
        assert_eq!(loc.to_string(), "Pabellón A");
    }

    #[test]
    fn blank_freeform_is_detected() {
        assert!(Location::freeform("  ").is_blank());
        assert!(!Location::freeform("biblioteca").is_blank());
    }
}
