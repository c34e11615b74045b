use tracing::info;

use crate::data::category_repository::CategoryRepository;
use crate::data::location_repository::LocationRepository;
use crate::domain::category::{Category, CategoryForm};
use crate::domain::error::DomainError;
use crate::domain::identity::Actor;
use crate::domain::location::{Location, LocationForm};
use crate::domain::publication::Publishable;

/// Categories and locations. Reads of published entries are public,
/// everything else is staff only.
pub(crate) struct CatalogService<K: CategoryRepository, L: LocationRepository> {
    categories: K,
    locations: L,
}

impl<K: CategoryRepository, L: LocationRepository> CatalogService<K, L> {
    pub(crate) fn new(categories: K, locations: L) -> Self {
        Self {
            categories,
            locations,
        }
    }

    pub(crate) async fn published_category(&self, slug: &str) -> Result<Category, DomainError> {
        self.categories
            .get_by_slug(slug)
            .await?
            .filter(Publishable::is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    pub(crate) async fn published_location(&self, id: i64) -> Result<Location, DomainError> {
        self.locations
            .get_location(id)
            .await?
            .filter(Publishable::is_published)
            .ok_or_else(|| DomainError::not_found("location", id))
    }

    pub(crate) async fn list_categories(&self, actor: &Actor) -> Result<Vec<Category>, DomainError> {
        actor.ensure_staff()?;
        self.categories.list_categories().await
    }

    pub(crate) async fn get_category(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<Category, DomainError> {
        actor.ensure_staff()?;
        self.categories
            .get_category(id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub(crate) async fn create_category(
        &self,
        actor: &Actor,
        form: CategoryForm,
    ) -> Result<Category, DomainError> {
        actor.ensure_staff()?;
        let category = self.categories.create_category(form.validate()?).await?;
        info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub(crate) async fn update_category(
        &self,
        actor: &Actor,
        id: i64,
        form: CategoryForm,
    ) -> Result<Category, DomainError> {
        actor.ensure_staff()?;
        self.categories
            .update_category(id, form.validate()?)
            .await?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub(crate) async fn delete_category(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        actor.ensure_staff()?;
        if !self.categories.delete_category(id).await? {
            return Err(DomainError::not_found("category", id));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }

    pub(crate) async fn list_locations(&self, actor: &Actor) -> Result<Vec<Location>, DomainError> {
        actor.ensure_staff()?;
        self.locations.list_locations().await
    }

    pub(crate) async fn get_location(
        &self,
        actor: &Actor,
        id: i64,
    ) -> Result<Location, DomainError> {
        actor.ensure_staff()?;
        self.locations
            .get_location(id)
            .await?
            .ok_or_else(|| DomainError::not_found("location", id))
    }

    pub(crate) async fn create_location(
        &self,
        actor: &Actor,
        form: LocationForm,
    ) -> Result<Location, DomainError> {
        actor.ensure_staff()?;
        let location = self.locations.create_location(form.validate()?).await?;
        info!(location_id = location.id, "location created");
        Ok(location)
    }

    pub(crate) async fn update_location(
        &self,
        actor: &Actor,
        id: i64,
        form: LocationForm,
    ) -> Result<Location, DomainError> {
        actor.ensure_staff()?;
        self.locations
            .update_location(id, form.validate()?)
            .await?
            .ok_or_else(|| DomainError::not_found("location", id))
    }

    pub(crate) async fn delete_location(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        actor.ensure_staff()?;
        if !self.locations.delete_location(id).await? {
            return Err(DomainError::not_found("location", id));
        }
        info!(location_id = id, "location deleted");
        Ok(())
    }
}
