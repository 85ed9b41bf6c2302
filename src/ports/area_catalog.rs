//! Area catalog port.

use async_trait::async_trait;

use crate::domain::catalog::{Area, Field, OptionCatalog};
use crate::domain::foundation::{AreaId, DomainError};

/// Read access to service areas and their field schemas.
#[async_trait]
pub trait AreaCatalog: Send + Sync {
    /// All areas, ordered by name.
    async fn list_areas(&self) -> Result<Vec<Area>, DomainError>;

    /// The field schema of one area, image slots in order.
    ///
    /// Returns `AreaNotFound` for unknown ids.
    async fn field_schema(&self, area_id: &AreaId) -> Result<Vec<Field>, DomainError>;

    /// Shared named option groups referenced by select fields.
    async fn option_catalog(&self) -> Result<OptionCatalog, DomainError>;
}
