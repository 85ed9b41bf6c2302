//! Building/room catalog port.

use async_trait::async_trait;

use crate::domain::catalog::{Building, Room};
use crate::domain::foundation::{BuildingId, DomainError};

#[async_trait]
pub trait LocationCatalog: Send + Sync {
    async fn list_buildings(&self) -> Result<Vec<Building>, DomainError>;

    /// Rooms of one building. An unknown building yields an empty list.
    async fn list_rooms(&self, building_id: &BuildingId) -> Result<Vec<Room>, DomainError>;
}
