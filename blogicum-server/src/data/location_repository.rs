use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::location::{Location, LocationForm};

#[async_trait]
pub(crate) trait LocationRepository: Send + Sync {
    async fn create_location(&self, input: LocationForm) -> Result<Location, DomainError>;
    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError>;
    async fn update_location(
        &self,
        id: i64,
        input: LocationForm,
    ) -> Result<Option<Location>, DomainError>;
    /// Detaches the location from its posts, then removes it.
    async fn delete_location(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_locations(&self) -> Result<Vec<Location>, DomainError>;
}
