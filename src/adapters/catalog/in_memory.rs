//! In-memory campus directory serving all three read-only catalogs.

use async_trait::async_trait;
use std::sync::Arc;

use super::seed::CampusSeed;
use crate::domain::catalog::{Area, Building, Field, OptionCatalog, Room};
use crate::domain::directory::{Staff, Student};
use crate::domain::foundation::{AreaId, BuildingId, DomainError, ErrorCode};
use crate::ports::{AreaCatalog, LocationCatalog, ReporterDirectory};

/// Read-only snapshot of the campus seed.
///
/// Cloning is cheap; all clones share the same data.
#[derive(Debug, Clone)]
pub struct InMemoryCampusDirectory {
    seed: Arc<CampusSeed>,
}

impl InMemoryCampusDirectory {
    pub fn new(mut seed: CampusSeed) -> Self {
        seed.areas.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Self {
            seed: Arc::new(seed),
        }
    }

    pub fn empty() -> Self {
        Self::new(CampusSeed::default())
    }

    pub fn seed(&self) -> &CampusSeed {
        &self.seed
    }
}

#[async_trait]
impl ReporterDirectory for InMemoryCampusDirectory {
    async fn find_student_by_code(&self, code: &str) -> Result<Option<Student>, DomainError> {
        let code = code.trim();
        Ok(self.seed.students.iter().find(|s| s.code == code).cloned())
    }

    async fn find_staff_by_national_id(&self, dni: &str) -> Result<Option<Staff>, DomainError> {
        let dni = dni.trim();
        Ok(self.seed.staff.iter().find(|s| s.dni == dni).cloned())
    }
}

#[async_trait]
impl AreaCatalog for InMemoryCampusDirectory {
    async fn list_areas(&self) -> Result<Vec<Area>, DomainError> {
        Ok(self.seed.areas.clone())
    }

    async fn field_schema(&self, area_id: &AreaId) -> Result<Vec<Field>, DomainError> {
        self.seed
            .areas
            .iter()
            .find(|area| &area.id == area_id)
            .map(|area| area.fields.clone())
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AreaNotFound, format!("Unknown area '{}'", area_id))
                    .with_detail("area_id", area_id.as_str())
            })
    }

    async fn option_catalog(&self) -> Result<OptionCatalog, DomainError> {
        Ok(OptionCatalog::new(self.seed.option_groups.clone()))
    }
}

#[async_trait]
impl LocationCatalog for InMemoryCampusDirectory {
    async fn list_buildings(&self) -> Result<Vec<Building>, DomainError> {
        Ok(self.seed.buildings.clone())
    }

    async fn list_rooms(&self, building_id: &BuildingId) -> Result<Vec<Room>, DomainError> {
        Ok(self
            .seed
            .rooms
            .iter()
            .filter(|room| &room.building_id == building_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryCampusDirectory {
        let seed = CampusSeed::from_yaml(
            r#"
students:
  - { code: "201422107", dni: "72345678", name: "Ana Torres" }
staff:
  - { dni: "73788334", name: "Carlos Rojas" }
areas:
  - { id: tic, name: Soporte TIC }
  - { id: limpieza, name: Limpieza }
  - { id: mantenimiento, name: mantenimiento }
buildings:
  - { id: pab-a, name: Pabellón A }
  - { id: pab-b, name: Pabellón B }
rooms:
  - { id: a-101, building_id: pab-a, name: Aula 101 }
  - { id: a-102, building_id: pab-a, name: Aula 102 }
"#,
        )
        .unwrap();
        InMemoryCampusDirectory::new(seed)
    }

    mod reporters {
        use super::*;

        #[tokio::test]
        async fn finds_student_by_code() {
            let student = directory().find_student_by_code(" 201422107 ").await.unwrap();
            assert_eq!(student.unwrap().name, "Ana Torres");
        }

        #[tokio::test]
        async fn student_lookup_does_not_match_dni() {
            let found = directory().find_student_by_code("72345678").await.unwrap();
            assert!(found.is_none());
        }

        #[tokio::test]
        async fn finds_staff_by_national_id() {
            let staff = directory().find_staff_by_national_id("73788334").await.unwrap();
            assert_eq!(staff.unwrap().name, "Carlos Rojas");
        }
    }

    mod areas {
        use super::*;

        #[tokio::test]
        async fn areas_are_ordered_by_name_case_insensitively() {
            let names: Vec<_> = directory()
                .list_areas()
                .await
                .unwrap()
                .into_iter()
                .map(|a| a.name)
                .collect();
            assert_eq!(names, vec!["Limpieza", "mantenimiento", "Soporte TIC"]);
        }

        #[tokio::test]
        async fn unknown_area_schema_is_not_found() {
            let err = directory()
                .field_schema(&AreaId::new("nope").unwrap())
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::AreaNotFound);
        }
    }

    mod locations {
        use super::*;

        #[tokio::test]
        async fn rooms_are_filtered_by_building() {
            let dir = directory();
            let rooms = dir.list_rooms(&BuildingId::new("pab-a").unwrap()).await.unwrap();
            assert_eq!(rooms.len(), 2);
            let none = dir.list_rooms(&BuildingId::new("pab-b").unwrap()).await.unwrap();
            assert!(none.is_empty());
        }

        #[tokio::test]
        async fn empty_directory_has_no_buildings() {
            assert!(InMemoryCampusDirectory::empty().list_buildings().await.unwrap().is_empty());
        }
    }
}
