//! YAML campus seed.
//!
//! One document carries everything the read-only catalogs serve:
//!
//! ```yaml
//! students:
//!   - { code: "201422107", dni: "72345678", name: "Ana Torres" }
//! staff:
//!   - { dni: "73788334", name: "Carlos Rojas" }
//! option_groups:
//!   equipos: [Proyector, Computadora, Impresora]
//! areas:
//!   - id: tic
//!     name: Soporte TIC
//!     fields:
//!       - { key: equipo, label: Equipo, type: select, options: { group: equipos } }
//!       - { key: foto, label: Foto del equipo, type: image, required: true }
//! buildings:
//!   - { id: pab-a, name: Pabellón A }
//! rooms:
//!   - { id: a-101, building_id: pab-a, name: Aula 101 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::domain::catalog::{Area, Building, Room};
use crate::domain::directory::{Staff, Student};
use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampusSeed {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub option_groups: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl CampusSeed {
    /// Reads and validates a seed file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::new(
                ErrorCode::StorageError,
                format!("Failed to read seed {}: {}", path.display(), e),
            )
        })?;
        let seed = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            students = seed.students.len(),
            staff = seed.staff.len(),
            areas = seed.areas.len(),
            buildings = seed.buildings.len(),
            "loaded campus seed"
        );
        Ok(seed)
    }

    pub fn from_yaml(content: &str) -> Result<Self, DomainError> {
        let seed: Self = serde_yaml::from_str(content).map_err(|e| {
            DomainError::new(ErrorCode::StorageError, format!("Invalid seed: {}", e))
        })?;
        seed.validate()?;
        Ok(seed)
    }

    /// Rejects duplicate ids and rooms pointing at unknown buildings.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut area_ids = HashSet::new();
        for area in &self.areas {
            if !area_ids.insert(area.id.as_str()) {
                return Err(invalid_seed(format!("duplicate area id '{}'", area.id)));
            }
        }

        let mut building_ids = HashSet::new();
        for building in &self.buildings {
            if !building_ids.insert(building.id.as_str()) {
                return Err(invalid_seed(format!("duplicate building id '{}'", building.id)));
            }
        }

        for room in &self.rooms {
            if !building_ids.contains(room.building_id.as_str()) {
                return Err(invalid_seed(format!(
                    "room '{}' references unknown building '{}'",
                    room.id, room.building_id
                )));
            }
        }
        Ok(())
    }
}

fn invalid_seed(message: String) -> DomainError {
    DomainError::new(ErrorCode::ValidationFailed, format!("Invalid seed: {}", message))
}
