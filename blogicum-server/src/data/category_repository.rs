use async_trait::async_trait;

use crate::domain::category::{Category, CategoryForm};
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: CategoryForm) -> Result<Category, DomainError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn update_category(
        &self,
        id: i64,
        input: CategoryForm,
    ) -> Result<Option<Category>, DomainError>;
    /// Detaches the category from its posts, then removes it.
    async fn delete_category(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
}
