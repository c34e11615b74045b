use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::PostScope;
use crate::domain::category::Category;
use crate::domain::location::Location;
use crate::domain::publication::Publishable;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::{ListPostsResponseDto, PageQuery};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            is_published: category.is_published(),
            created_at: category.created_at(),
            title: category.title,
            description: category.description,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            is_published: location.is_published(),
            created_at: location.created_at(),
            name: location.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPostsDto {
    pub(crate) category: CategoryDto,
    #[serde(flatten)]
    pub(crate) listing: ListPostsResponseDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationPostsDto {
    pub(crate) location: LocationDto,
    #[serde(flatten)]
    pub(crate) listing: ListPostsResponseDto,
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    tag = "catalog",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Posts of the category", body = CategoryPostsDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Category not found or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CategoryPostsDto>> {
    query.validate()?;
    let category = state.catalog_service.published_category(&slug).await?;

    let viewer = auth.map(|user| user.actor());
    let listing = state
        .blog_service
        .list_posts(
            viewer.as_ref(),
            PostScope::Category(category.id),
            query.number(),
            state.posts_per_page,
        )
        .await?;

    Ok(Json(CategoryPostsDto {
        category: category.into(),
        listing: listing.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}/posts",
    tag = "catalog",
    params(
        ("id" = i64, Path, description = "Location id"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Posts at the location", body = LocationPostsDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Location not found or unpublished"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn location_posts(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LocationPostsDto>> {
    query.validate()?;
    let location = state.catalog_service.published_location(id).await?;

    let viewer = auth.map(|user| user.actor());
    let listing = state
        .blog_service
        .list_posts(
            viewer.as_ref(),
            PostScope::Location(location.id),
            query.number(),
            state.posts_per_page,
        )
        .await?;

    Ok(Json(LocationPostsDto {
        location: location.into(),
        listing: listing.into(),
    }))
}
